// src/autograd/op.rs

use crate::autograd::tape::{Node, NodeId};
use crate::types::Scalar;
use std::fmt;

/// Operation that produced a node, together with the ids of its operands.
///
/// Subtraction, division and negation are not listed: they are built from
/// `Add`, `Mul` and `Pow` and have no rule of their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op<T> {
    /// Created directly from a number.
    Leaf,
    Add(NodeId, NodeId),
    Mul(NodeId, NodeId),
    /// Raise to a constant exponent.
    Pow(NodeId, T),
    Relu(NodeId),
}

impl<T: Scalar> Op<T> {
    /// Distinct nodes feeding this operation, in operand order.
    ///
    /// `x + x` yields a single entry even though the rule in [`propagate`]
    /// applies its contribution once per operand.
    pub fn predecessors(&self) -> Vec<NodeId> {
        match *self {
            Op::Leaf => Vec::new(),
            Op::Add(a, b) | Op::Mul(a, b) if a == b => vec![a],
            Op::Add(a, b) | Op::Mul(a, b) => vec![a, b],
            Op::Pow(a, _) | Op::Relu(a) => vec![a],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Op::Leaf)
    }
}

impl<T: Scalar> fmt::Display for Op<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Leaf => Ok(()),
            Op::Add(..) => f.write_str("+"),
            Op::Mul(..) => f.write_str("*"),
            Op::Pow(_, k) => write!(f, "**{}", k),
            Op::Relu(_) => f.write_str("ReLU"),
        }
    }
}

/// Distributes the gradient of node `id` to its operands.
///
/// Contributions are always added, never assigned, so a node consumed by
/// several downstream nodes ends up with the sum over all paths.
/// The ReLU derivative is taken as 0 whenever the output is `<= 0`.
pub(crate) fn propagate<T: Scalar>(nodes: &mut [Node<T>], id: NodeId) {
    let out = nodes[id.0];
    let upstream = out.grad;
    match out.op {
        Op::Leaf => {}
        Op::Add(a, b) => {
            nodes[a.0].grad += upstream;
            nodes[b.0].grad += upstream;
        }
        Op::Mul(a, b) => {
            let (a_data, b_data) = (nodes[a.0].data, nodes[b.0].data);
            nodes[a.0].grad += b_data * upstream;
            nodes[b.0].grad += a_data * upstream;
        }
        Op::Pow(a, k) => {
            let base = nodes[a.0].data;
            nodes[a.0].grad += k * base.powf(k - T::one()) * upstream;
        }
        Op::Relu(a) => {
            if out.data > T::zero() {
                nodes[a.0].grad += upstream;
            }
        }
    }
}
