//! Minimal reverse-mode automatic differentiation over scalars, plus the
//! neuron / layer / MLP modules built on top of it.

pub mod autograd;
pub mod error;
pub mod nn;
pub mod types;
pub mod utils;

// Re-export the engine types so they are reachable as `scalargrad_core::Value` etc.
pub use autograd::{Op, Operand, Tape, TapeMark, Value};
pub use error::ScalargradError;
pub use types::Scalar;
// Re-export traits required by public functions/structs
pub use num_traits;
