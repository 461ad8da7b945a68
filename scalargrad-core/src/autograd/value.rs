// src/autograd/value.rs

use crate::autograd::graph;
use crate::autograd::op::Op;
use crate::autograd::tape::{Node, NodeId, Tape};
use crate::error::ScalargradError;
use crate::types::Scalar;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Handle to a scalar node recorded on a [`Tape`].
///
/// A `Value` is cheap to clone: it holds a shared reference to the tape and the
/// node's id. The node itself (data, gradient, producing operation) lives in the tape.
///
/// Graphs are built with the usual operators. The right-hand side (and, for
/// `f32`/`f64`, the left-hand side) may be a plain number, which is recorded as a
/// fresh leaf:
///
/// ```
/// use scalargrad_core::Tape;
///
/// let tape = Tape::<f64>::new();
/// let x = tape.leaf(3.0);
/// let y = (&x * &x + 2.0 * &x).relu();
/// y.backward().unwrap();
/// assert_eq!(y.data(), 15.0);
/// assert_eq!(x.grad(), 8.0);
/// ```
///
/// [`Value::new`] records on the thread's default tape, so values created that
/// way always combine with each other.
///
/// # Panics
/// Combining two values recorded on different tapes panics, as does reading a
/// value whose node was discarded by [`Tape::truncate`].
pub struct Value<T = f64> {
    tape: Tape<T>,
    id: NodeId,
    epoch: u64,
}

/// Right-hand side of a graph-building operation: either a raw number or an existing node.
#[derive(Debug, Clone)]
pub enum Operand<T> {
    Constant(T),
    Value(Value<T>),
}

impl<T: Scalar> From<T> for Operand<T> {
    fn from(value: T) -> Self {
        Operand::Constant(value)
    }
}

impl<T> From<Value<T>> for Operand<T> {
    fn from(value: Value<T>) -> Self {
        Operand::Value(value)
    }
}

impl<T> From<&Value<T>> for Operand<T> {
    fn from(value: &Value<T>) -> Self {
        Operand::Value(value.clone())
    }
}

impl<T: Scalar> Operand<T> {
    /// Resolves the operand to a node on `tape`, recording constants as new leaves.
    fn into_value(self, tape: &Tape<T>, operation: &str) -> Value<T> {
        match self {
            Operand::Constant(x) => tape.leaf(x),
            Operand::Value(v) => {
                assert!(
                    tape.same_tape(&v.tape),
                    "{}",
                    ScalargradError::TapeMismatch {
                        operation: operation.to_string()
                    }
                );
                v
            }
        }
    }
}

impl<T: Scalar> Value<T> {
    /// Records a leaf on [`Tape::thread_default`].
    pub fn new(data: T) -> Self {
        Tape::thread_default().leaf(data)
    }

    pub(crate) fn from_parts(tape: Tape<T>, id: NodeId, epoch: u64) -> Self {
        Value { tape, id, epoch }
    }

    fn node(&self) -> Node<T> {
        match self.tape.live_node(self.id, self.epoch) {
            Some(node) => node,
            None => panic!("{}", ScalargradError::StaleValue { node: self.id.0 }),
        }
    }

    /// `false` once the node has been discarded by [`Tape::truncate`].
    pub fn is_live(&self) -> bool {
        self.tape.live_node(self.id, self.epoch).is_some()
    }

    /// Forward value, fixed when the node was recorded.
    pub fn data(&self) -> T {
        self.node().data
    }

    /// Gradient accumulated by the last backward pass(es).
    pub fn grad(&self) -> T {
        self.node().grad
    }

    pub fn set_grad(&self, grad: T) {
        let mut graph = self.tape.graph_mut();
        match graph.nodes.get_mut(self.id.0) {
            Some(node) if node.epoch == self.epoch => node.grad = grad,
            _ => panic!("{}", ScalargradError::StaleValue { node: self.id.0 }),
        }
    }

    pub fn zero_grad(&self) {
        self.set_grad(T::zero());
    }

    /// Operation that produced this node (diagnostics only).
    pub fn op(&self) -> Op<T> {
        self.node().op
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tape(&self) -> &Tape<T> {
        &self.tape
    }

    pub fn is_leaf(&self) -> bool {
        self.op().is_leaf()
    }

    /// Distinct nodes that directly produced this one.
    pub fn predecessors(&self) -> Vec<Value<T>> {
        let preds = self.op().predecessors();
        let graph = self.tape.graph();
        // Predecessors are older than a live node, so a truncation never removes them first
        preds
            .into_iter()
            .map(|id| Value::from_parts(self.tape.clone(), id, graph.nodes[id.0].epoch))
            .collect()
    }

    /// Raises this value to a constant power.
    pub fn pow(&self, exponent: T) -> Value<T> {
        let data = self.data().powf(exponent);
        self.tape.push(data, Op::Pow(self.id, exponent))
    }

    /// Rectified linear unit: `max(0, self)`. NaN passes through unchanged.
    pub fn relu(&self) -> Value<T> {
        let x = self.data();
        let data = if x < T::zero() { T::zero() } else { x };
        self.tape.push(data, Op::Relu(self.id))
    }

    /// Computes the gradient of this value with respect to every node it depends on.
    ///
    /// The gradient of `self` is set to one and contributions are *added* to the
    /// gradients of all other reachable nodes. Gradients left over from a previous
    /// pass are therefore summed with the new ones; reset them first
    /// (see [`Tape::zero_grad`] or [`crate::nn::zero_grad`]) when that is not wanted.
    ///
    /// # Errors
    /// `ScalargradError::StaleValue` if this node was discarded by [`Tape::truncate`].
    pub fn backward(&self) -> Result<(), ScalargradError> {
        if !self.is_live() {
            return Err(ScalargradError::StaleValue { node: self.id.0 });
        }
        let mut graph = self.tape.graph_mut();
        graph::backward(&mut graph, self.id)
    }

    fn binary(
        &self,
        rhs: Operand<T>,
        operation: &str,
        make_op: fn(NodeId, NodeId) -> Op<T>,
        forward: fn(T, T) -> T,
    ) -> Value<T> {
        let rhs = rhs.into_value(&self.tape, operation);
        let data = forward(self.data(), rhs.data());
        self.tape.push(data, make_op(self.id, rhs.id))
    }
}

// Manual implementation: cloning a handle never clones the node
impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Value {
            tape: self.tape.clone(),
            id: self.id,
            epoch: self.epoch,
        }
    }
}

impl<T: Scalar> fmt::Display for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value(data={}, grad={})", self.data(), self.grad())
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tape.graph().nodes.get(self.id.0) {
            Some(node) if node.epoch == self.epoch => f
                .debug_struct("Value")
                .field("id", &self.id)
                .field("data", &node.data)
                .field("grad", &node.grad)
                .field("op", &node.op)
                .finish(),
            _ => f
                .debug_struct("Value")
                .field("id", &self.id)
                .field("stale", &true)
                .finish(),
        }
    }
}

// --- Operators ---

impl<T: Scalar, R: Into<Operand<T>>> Add<R> for &Value<T> {
    type Output = Value<T>;

    fn add(self, rhs: R) -> Value<T> {
        self.binary(rhs.into(), "add", Op::Add, |a, b| a + b)
    }
}

impl<T: Scalar, R: Into<Operand<T>>> Mul<R> for &Value<T> {
    type Output = Value<T>;

    fn mul(self, rhs: R) -> Value<T> {
        self.binary(rhs.into(), "mul", Op::Mul, |a, b| a * b)
    }
}

impl<T: Scalar, R: Into<Operand<T>>> Sub<R> for &Value<T> {
    type Output = Value<T>;

    /// `self + rhs * -1`
    fn sub(self, rhs: R) -> Value<T> {
        let rhs: Operand<T> = rhs.into();
        let rhs = rhs.into_value(&self.tape, "sub");
        self + (&rhs * -T::one())
    }
}

impl<T: Scalar, R: Into<Operand<T>>> Div<R> for &Value<T> {
    type Output = Value<T>;

    /// `self * rhs ** -1`; a zero divisor yields infinities as in plain float division.
    fn div(self, rhs: R) -> Value<T> {
        let rhs: Operand<T> = rhs.into();
        let rhs = rhs.into_value(&self.tape, "div");
        self * rhs.pow(-T::one())
    }
}

impl<T: Scalar> Neg for &Value<T> {
    type Output = Value<T>;

    fn neg(self) -> Value<T> {
        self * -T::one()
    }
}

impl<T: Scalar, R: Into<Operand<T>>> Add<R> for Value<T> {
    type Output = Value<T>;

    fn add(self, rhs: R) -> Value<T> {
        &self + rhs
    }
}

impl<T: Scalar, R: Into<Operand<T>>> Mul<R> for Value<T> {
    type Output = Value<T>;

    fn mul(self, rhs: R) -> Value<T> {
        &self * rhs
    }
}

impl<T: Scalar, R: Into<Operand<T>>> Sub<R> for Value<T> {
    type Output = Value<T>;

    fn sub(self, rhs: R) -> Value<T> {
        &self - rhs
    }
}

impl<T: Scalar, R: Into<Operand<T>>> Div<R> for Value<T> {
    type Output = Value<T>;

    fn div(self, rhs: R) -> Value<T> {
        &self / rhs
    }
}

impl<T: Scalar> Neg for Value<T> {
    type Output = Value<T>;

    fn neg(self) -> Value<T> {
        -&self
    }
}

// Number on the left-hand side: `2.0 * &x`, `1.0 - x`, ...
macro_rules! impl_scalar_lhs_op {
    ($scalar:ty, $trait:ident, $method:ident) => {
        impl $trait<Value<$scalar>> for $scalar {
            type Output = Value<$scalar>;

            fn $method(self, rhs: Value<$scalar>) -> Value<$scalar> {
                $trait::$method(rhs.tape.leaf(self), rhs)
            }
        }

        impl $trait<&Value<$scalar>> for $scalar {
            type Output = Value<$scalar>;

            fn $method(self, rhs: &Value<$scalar>) -> Value<$scalar> {
                $trait::$method(rhs.tape.leaf(self), rhs)
            }
        }
    };
}

macro_rules! impl_scalar_lhs {
    ($($scalar:ty),*) => {
        $(
            impl_scalar_lhs_op!($scalar, Add, add);
            impl_scalar_lhs_op!($scalar, Sub, sub);
            impl_scalar_lhs_op!($scalar, Mul, mul);
            impl_scalar_lhs_op!($scalar, Div, div);
        )*
    };
}

impl_scalar_lhs!(f32, f64);

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
