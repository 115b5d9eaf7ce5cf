//! Per-relation pools of observed lexical material.

use std::collections::{HashMap, HashSet};

use deptree::graph::{DependencyTree, Node};

use crate::transform::LexicalUpdate;

/// Form/lemma/tag/feature bundles observed across a corpus, keyed by
/// the dependency relation of the token they were taken from.
///
/// Built once per corpus and read-only afterward. Bundles keep their
/// first-observed order so that seeded sampling is reproducible.
#[derive(Clone, Debug, Default)]
pub struct NoncePool {
    bundles: HashMap<String, Vec<LexicalUpdate>>,
}

impl NoncePool {
    /// Collect one deduplicated bundle pool per relation label.
    pub fn from_corpus(corpus: &[DependencyTree]) -> Self {
        let mut bundles: HashMap<String, Vec<LexicalUpdate>> = HashMap::new();
        let mut seen: HashSet<(String, LexicalUpdate)> = HashSet::new();

        for tree in corpus {
            for address in 1..tree.len() {
                let token = match tree[address] {
                    Node::Token(ref token) => token,
                    Node::Anchor => continue,
                };
                let rel = match tree
                    .dep_graph()
                    .head(address)
                    .and_then(|triple| triple.relation().map(ToOwned::to_owned))
                {
                    Some(rel) => rel,
                    None => continue,
                };

                let update = LexicalUpdate::from(token);
                if seen.insert((rel.clone(), update.clone())) {
                    bundles.entry(rel).or_default().push(update);
                }
            }
        }

        NoncePool { bundles }
    }

    /// The bundles observed under `relation`, if any.
    pub fn bundles(&self, relation: &str) -> Option<&[LexicalUpdate]> {
        self.bundles.get(relation).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::NoncePool;
    use crate::tests::five_token_tree;

    #[test]
    fn pools_are_keyed_by_relation() {
        let corpus = vec![five_token_tree()];
        let pool = NoncePool::from_corpus(&corpus);

        let subjects = pool.bundles("nsubj").unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].form, "B");

        assert!(pool.bundles("ccomp").is_none());
    }

    #[test]
    fn duplicate_bundles_are_collapsed() {
        let corpus = vec![five_token_tree(), five_token_tree()];
        let pool = NoncePool::from_corpus(&corpus);

        assert_eq!(pool.bundles("nsubj").unwrap().len(), 1);
        assert_eq!(pool.bundles("root").unwrap().len(), 1);
    }
}
