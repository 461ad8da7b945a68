use crate::autograd::op::propagate;
use crate::autograd::tape::{Graph, Node, NodeId};
use crate::error::ScalargradError;
use crate::types::Scalar;
use std::collections::HashSet;

/// Builds a topological sort of every node reachable from `root`.
///
/// Each node is placed after all of its predecessors (depth-first post-order).
/// The traversal uses an explicit stack so deep graphs cannot overflow the
/// call stack. Visited nodes are tracked by `NodeId`.
pub(crate) fn topological_order<T: Scalar>(
    nodes: &[Node<T>],
    root: NodeId,
) -> Result<Vec<NodeId>, ScalargradError> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut sorted_list = Vec::new();
    // (node, children already scheduled)
    let mut stack = vec![(root, false)];

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            sorted_list.push(id);
            continue;
        }
        if !visited.insert(id) {
            continue;
        }
        stack.push((id, true));
        // Reverse so predecessors are visited in operand order
        for pred in nodes[id.0].op.predecessors().into_iter().rev() {
            // Nodes only ever reference older nodes; anything else is a corrupted graph
            if pred >= id {
                return Err(ScalargradError::CycleDetected { node: id.0 });
            }
            if !visited.contains(&pred) {
                stack.push((pred, false));
            }
        }
    }
    Ok(sorted_list)
}

/// Seeds `root` with a gradient of one and runs every local-gradient rule
/// once, in reverse topological order.
pub(crate) fn backward<T: Scalar>(graph: &mut Graph<T>, root: NodeId) -> Result<(), ScalargradError> {
    let order = topological_order(&graph.nodes, root)?;
    log::debug!(
        "backward() from node {} visiting {} of {} recorded nodes",
        root,
        order.len(),
        graph.nodes.len()
    );

    graph.nodes[root.0].grad = T::one();
    for &id in order.iter().rev() {
        propagate(&mut graph.nodes, id);
    }
    Ok(())
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
