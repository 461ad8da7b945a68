//! # Scalar autograd engine
//!
//! Every scalar computation is recorded as a node on a [`Tape`]. Operations on
//! [`Value`] handles allocate new nodes that remember their operands and the
//! [`Op`] that produced them. [`Value::backward`] orders the nodes reachable from
//! an output topologically and runs each node's local-gradient rule once, in
//! reverse order, accumulating into the gradients of its predecessors.

pub mod grad_check;
pub(crate) mod graph;
pub mod op;
pub mod tape;
pub mod value;

// Re-export key items
pub use op::Op;
pub use tape::{NodeId, Tape, TapeMark};
pub use value::{Operand, Value};
