// src/autograd/tape.rs

use crate::autograd::op::Op;
use crate::autograd::value::Value;
use crate::error::ScalargradError;
use crate::types::Scalar;
use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

thread_local! {
    // One shared tape per element type, handed out by `Tape::thread_default`
    static THREAD_TAPES: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Stable index of a node inside its [`Tape`].
///
/// Ids are handed out in allocation order, so a node's predecessors always
/// have strictly smaller ids than the node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One scalar node: forward value, accumulated gradient and the operation that produced it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node<T> {
    pub(crate) data: T,
    pub(crate) grad: T,
    pub(crate) op: Op<T>,
    /// Truncation epoch the node was recorded in.
    pub(crate) epoch: u64,
}

/// Node storage shared by every handle of a tape.
///
/// Nodes are appended at the end and only ever removed from the end, by `Tape::truncate`.
#[derive(Debug)]
pub(crate) struct Graph<T> {
    pub(crate) nodes: Vec<Node<T>>,
    /// Bumped by every truncation that discards nodes.
    pub(crate) epoch: u64,
}

/// Position on a [`Tape`] returned by [`Tape::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeMark {
    len: usize,
}

impl TapeMark {
    /// Number of nodes the tape held when the mark was taken.
    pub fn position(self) -> usize {
        self.len
    }
}

/// Arena holding every node of a computation graph.
///
/// Handles ([`Value`]) refer to nodes by [`NodeId`]. Cloning a `Tape` is shallow:
/// all clones record into the same arena.
///
/// The arena grows with every operation. A training loop keeps it bounded by
/// taking a [`mark`](Tape::mark) once the parameters exist and calling
/// [`truncate`](Tape::truncate) after each step:
///
/// ```
/// use scalargrad_core::Tape;
///
/// let tape = Tape::<f64>::new();
/// let w = tape.leaf(0.5);
/// let mark = tape.mark();
/// for step in 0..3 {
///     let loss = (&w * step as f64 - 1.0).pow(2.0);
///     loss.backward().unwrap();
///     tape.truncate(mark).unwrap();
/// }
/// assert_eq!(tape.len(), 1);
/// ```
pub struct Tape<T = f64> {
    inner: Rc<RefCell<Graph<T>>>,
}

impl<T: Scalar> Tape<T> {
    /// Creates an empty tape.
    pub fn new() -> Self {
        Tape {
            inner: Rc::new(RefCell::new(Graph {
                nodes: Vec::new(),
                epoch: 0,
            })),
        }
    }

    /// The tape used by [`Value::new`] on the current thread.
    ///
    /// Every call on one thread returns a handle to the same arena, so values
    /// created without an explicit tape can always be combined.
    pub fn thread_default() -> Self {
        THREAD_TAPES.with(|tapes| {
            let mut tapes = tapes.borrow_mut();
            let entry = tapes
                .entry(TypeId::of::<T>())
                .or_insert_with(|| Box::new(Tape::<T>::new()) as Box<dyn Any>);
            if let Some(tape) = (**entry).downcast_ref::<Tape<T>>() {
                return tape.clone();
            }
            let tape = Tape::new();
            *entry = Box::new(tape.clone());
            tape
        })
    }

    /// Records a leaf node holding `data` with a zero gradient.
    pub fn leaf(&self, data: T) -> Value<T> {
        self.push(data, Op::Leaf)
    }

    /// Records one leaf per element of `data`, preserving order.
    pub fn leaves(&self, data: &[T]) -> Vec<Value<T>> {
        data.iter().map(|&x| self.leaf(x)).collect()
    }

    /// Number of nodes recorded so far.
    pub fn len(&self) -> usize {
        self.graph().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resets the gradient of every node on the tape to zero.
    pub fn zero_grad(&self) {
        for node in self.graph_mut().nodes.iter_mut() {
            node.grad = T::zero();
        }
    }

    /// Remembers the current end of the tape for a later [`Tape::truncate`].
    pub fn mark(&self) -> TapeMark {
        TapeMark { len: self.len() }
    }

    /// Discards every node recorded after `mark`.
    ///
    /// Values recorded before the mark (typically the parameters) keep working.
    /// Handles to discarded nodes become stale: reading them panics and
    /// [`Value::backward`] on them returns `ScalargradError::StaleValue`.
    ///
    /// # Errors
    /// `ScalargradError::InvalidMark` if the tape is already shorter than `mark`.
    pub fn truncate(&self, mark: TapeMark) -> Result<(), ScalargradError> {
        let mut graph = self.graph_mut();
        let len = graph.nodes.len();
        if mark.len > len {
            return Err(ScalargradError::InvalidMark { mark: mark.len, len });
        }
        if mark.len < len {
            graph.nodes.truncate(mark.len);
            graph.epoch += 1;
            log::debug!("truncated tape from {} to {} nodes", len, mark.len);
        }
        Ok(())
    }

    /// Returns `true` if both handles refer to the same arena.
    pub fn same_tape(&self, other: &Tape<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn push(&self, data: T, op: Op<T>) -> Value<T> {
        let mut graph = self.graph_mut();
        let id = NodeId(graph.nodes.len());
        let epoch = graph.epoch;
        graph.nodes.push(Node {
            data,
            grad: T::zero(),
            op,
            epoch,
        });
        log::trace!("recorded node {} ({:?}) = {}", id, op, data);
        drop(graph);
        Value::from_parts(self.clone(), id, epoch)
    }

    /// The node behind a handle, or `None` if it was discarded by a truncation.
    pub(crate) fn live_node(&self, id: NodeId, epoch: u64) -> Option<Node<T>> {
        self.graph()
            .nodes
            .get(id.0)
            .filter(|node| node.epoch == epoch)
            .copied()
    }
}

impl<T> Tape<T> {
    pub(crate) fn graph(&self) -> Ref<'_, Graph<T>> {
        self.inner.borrow()
    }

    pub(crate) fn graph_mut(&self) -> RefMut<'_, Graph<T>> {
        self.inner.borrow_mut()
    }
}

impl<T: Scalar> Default for Tape<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual implementation so cloning does not require `T: Clone` on the arena
impl<T> Clone for Tape<T> {
    fn clone(&self) -> Self {
        Tape {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Tape<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(graph) => f.debug_struct("Tape").field("nodes", &graph.nodes.len()).finish(),
            Err(_) => f.write_str("Tape { <borrowed> }"),
        }
    }
}

#[cfg(test)]
#[path = "tape_test.rs"]
mod tests;
