use crate::tensor::Tensor;
use std::collections::HashSet;

/// Builds a reverse topological ordering of the graph reachable from `root`:
/// every node appears before all of its inputs.
///
/// Iterative post-order DFS, keyed by the identity of the shared storage so
/// that a tensor reused by several operations is visited once.
pub(crate) fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut visited: HashSet<usize> = HashSet::new();
    let mut post_order: Vec<Tensor> = Vec::new();
    // (node, inputs already expanded)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            post_order.push(node);
            continue;
        }
        if !visited.insert(node.node_id()) {
            continue;
        }
        let grad_fn = node.grad_fn();
        stack.push((node, true));
        if let Some(op) = grad_fn {
            for input in op.inputs() {
                if input.requires_grad() && !visited.contains(&input.node_id()) {
                    stack.push((input, false));
                }
            }
        }
    }

    post_order.reverse();
    post_order
}
