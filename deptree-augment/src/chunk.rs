//! Chunk extraction.
//!
//! A chunk is an immediate dependent of the syntactic root together
//! with all of its transitive dependents. The root's own chunk holds
//! only the root address: every other address of the sentence is
//! claimed by the subtree of some direct root dependent, so the chunks
//! partition the token addresses of a tree exactly.

use deptree::graph::DependencyTree;

use crate::error::AugmentError;
use crate::subtree_addresses;

/// A read-only view of one chunk of a sentence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chunk {
    head: usize,
    indices: Vec<usize>,
    projective: bool,
}

#[allow(clippy::len_without_is_empty)]
impl Chunk {
    fn new(tree: &DependencyTree, head: usize, is_root: bool) -> Self {
        let mut indices = if is_root {
            vec![head]
        } else {
            subtree_addresses(tree, head)
        };
        indices.sort_unstable();

        // A chunk is projective iff its members form the unbroken
        // address run min..=max.
        let projective = indices
            .iter()
            .zip(indices[0]..)
            .all(|(&address, expected)| address == expected);

        Chunk {
            head,
            indices,
            projective,
        }
    }

    /// The address of the chunk head.
    pub fn head(&self) -> usize {
        self.head
    }

    /// The member addresses, in ascending order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Whether the chunk occupies a contiguous span in linear order.
    pub fn projective(&self) -> bool {
        self.projective
    }

    /// The number of member addresses.
    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

/// Partition a tree into chunks, ordered by chunk head address.
///
/// Fails when no token carries the `root` relation.
pub fn chunks(tree: &DependencyTree) -> Result<Vec<Chunk>, AugmentError> {
    let root = tree
        .syntactic_root()
        .ok_or(AugmentError::MissingRoot {
            node_count: tree.len(),
        })?;

    let mut heads: Vec<usize> = tree
        .dep_graph()
        .dependents(root)
        .map(|triple| triple.dependent())
        .collect();
    heads.push(root);
    heads.sort_unstable();

    Ok(heads
        .into_iter()
        .map(|head| Chunk::new(tree, head, head == root))
        .collect())
}

#[cfg(test)]
mod tests {
    use deptree::graph::{DepTriple, DependencyTree};
    use deptree::token::Token;

    use super::chunks;
    use crate::error::AugmentError;
    use crate::tests::five_token_tree;

    #[test]
    fn chunks_partition_token_addresses() {
        let tree = five_token_tree();
        let tree_chunks = chunks(&tree).unwrap();

        assert_eq!(tree_chunks.len(), 4);
        assert_eq!(tree_chunks[0].indices(), &[1]);
        assert_eq!(tree_chunks[1].indices(), &[2, 3]);
        assert_eq!(tree_chunks[2].indices(), &[4]);
        assert_eq!(tree_chunks[3].indices(), &[5]);

        // Exactly once: no overlap, no omission.
        let mut all: Vec<usize> = tree_chunks
            .iter()
            .flat_map(|chunk| chunk.indices().iter().copied())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (1..tree.len()).collect::<Vec<_>>());
    }

    #[test]
    fn interleaved_chunk_is_nonprojective() {
        // Root at 2 with dependents 1 and 4; 3 attaches to 1, so the
        // chunk {1, 3} has a gap at 2.
        let mut tree = DependencyTree::new();
        for form in &["w1", "w2", "w3", "w4"] {
            tree.push(Token::new(*form));
        }
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(0, Some("root"), 2))
            .unwrap();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(2, Some("nsubj"), 1))
            .unwrap();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(1, Some("acl"), 3))
            .unwrap();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(2, Some("obl"), 4))
            .unwrap();

        let tree_chunks = chunks(&tree).unwrap();
        assert_eq!(tree_chunks[0].indices(), &[1, 3]);
        assert!(!tree_chunks[0].projective());
        assert!(tree_chunks[1].projective());
        assert!(tree_chunks[2].projective());
    }

    #[test]
    fn missing_root_is_an_error() {
        let mut tree = DependencyTree::new();
        tree.push(Token::new("stray"));

        assert_eq!(
            chunks(&tree),
            Err(AugmentError::MissingRoot { node_count: 2 })
        );
    }
}
