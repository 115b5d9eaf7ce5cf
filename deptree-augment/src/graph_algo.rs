//! Tree traversal helpers.

use deptree::graph::DependencyTree;

/// Collect `start` and all of its transitive dependents.
///
/// Iterative depth-first traversal, so arbitrarily deep trees cannot
/// exhaust the call stack. The returned addresses are unsorted.
pub(crate) fn subtree_addresses(tree: &DependencyTree, start: usize) -> Vec<usize> {
    let mut stack = vec![start];
    let mut addresses = Vec::new();

    while let Some(address) = stack.pop() {
        addresses.push(address);
        for triple in tree.dep_graph().dependents(address) {
            stack.push(triple.dependent());
        }
    }

    addresses
}

#[cfg(test)]
mod tests {
    use super::subtree_addresses;
    use crate::tests::five_token_tree;

    #[test]
    fn subtree_of_inner_node() {
        let tree = five_token_tree();

        let mut subtree = subtree_addresses(&tree, 2);
        subtree.sort_unstable();
        assert_eq!(subtree, vec![2, 3]);
    }

    #[test]
    fn subtree_of_root_spans_sentence() {
        let tree = five_token_tree();

        let mut subtree = subtree_addresses(&tree, 4);
        subtree.sort_unstable();
        assert_eq!(subtree, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn subtree_of_leaf_is_singleton() {
        let tree = five_token_tree();
        assert_eq!(subtree_addresses(&tree, 5), vec![5]);
    }
}
