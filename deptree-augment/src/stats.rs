//! Corpus-level placement statistics.

use std::collections::HashMap;

use deptree::graph::DependencyTree;

/// Normalized left/right placement of a dependent relative to its head.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub left: f64,
    pub right: f64,
}

/// Empirical placement frequencies of dependency relations.
///
/// For every pair of a parent relation label and a child relation
/// label, the statistics record how often a dependent attached with
/// the child relation appeared to the left or right of a head that is
/// itself attached with the parent relation, normalized to
/// probabilities per pair. Built once per corpus and read-only
/// afterward.
#[derive(Clone, Debug, Default)]
pub struct PositionStatistics {
    placements: HashMap<String, HashMap<String, Placement>>,
}

impl PositionStatistics {
    /// Accumulate placement statistics over a corpus.
    pub fn from_corpus(corpus: &[DependencyTree]) -> Self {
        let mut counts: HashMap<String, HashMap<String, (usize, usize)>> = HashMap::new();

        for tree in corpus {
            for address in 1..tree.len() {
                let parent_rel = match tree
                    .dep_graph()
                    .head(address)
                    .and_then(|triple| triple.relation().map(ToOwned::to_owned))
                {
                    Some(rel) => rel,
                    None => continue,
                };

                for triple in tree.dep_graph().dependents(address) {
                    let child_rel = match triple.relation() {
                        Some(rel) => rel,
                        None => continue,
                    };

                    let (left, right) = counts
                        .entry(parent_rel.clone())
                        .or_default()
                        .entry(child_rel.to_owned())
                        .or_insert((0, 0));
                    if triple.dependent() < address {
                        *left += 1;
                    } else {
                        *right += 1;
                    }
                }
            }
        }

        // Normalize each counter pair; pairs only exist once a count
        // has been observed, so the total is never zero.
        let placements = counts
            .into_iter()
            .map(|(parent_rel, children)| {
                let children = children
                    .into_iter()
                    .map(|(child_rel, (left, right))| {
                        let total = (left + right) as f64;
                        (
                            child_rel,
                            Placement {
                                left: left as f64 / total,
                                right: right as f64 / total,
                            },
                        )
                    })
                    .collect();
                (parent_rel, children)
            })
            .collect();

        PositionStatistics { placements }
    }

    /// Placement of `child_rel` dependents under heads attached with
    /// `parent_rel`, if the pair was observed.
    pub fn placement(&self, parent_rel: &str, child_rel: &str) -> Option<Placement> {
        self.placements
            .get(parent_rel)
            .and_then(|children| children.get(child_rel))
            .copied()
    }
}
