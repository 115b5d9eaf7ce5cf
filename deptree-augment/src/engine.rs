//! Variant generation.

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;

use deptree::graph::{DepTriple, DependencyTree, ROOT_RELATION};

use crate::chunk::{chunks, Chunk};
use crate::config::{CropConfig, ExperimentConfig, NonceConfig, RotateConfig};
use crate::error::AugmentError;
use crate::nonce::NoncePool;
use crate::stats::PositionStatistics;
use crate::transform::{crop, reorder, replace, LexicalUpdate};

/// Relations whose chunks may move during rotation.
pub const FLEXIBLE: &[&str] = &[
    "nsubj", "obj", "advmod", "iobj", "obl", "xcomp", "acl", "advcl", "ccomp", "case",
];

/// Generates rotation, crop, and nonce variants of single sentences.
///
/// The placement statistics and nonce pools are derived from the
/// corpus once at construction time and shared read-only across all
/// sentences afterward. All randomness is drawn from the generator the
/// caller passes in, so a fixed seed gives a fully reproducible run.
pub struct Augmenter {
    stats: PositionStatistics,
    pool: NoncePool,
}

impl Augmenter {
    /// Build the corpus-level statistics and pools.
    pub fn new(corpus: &[DependencyTree]) -> Self {
        Augmenter {
            stats: PositionStatistics::from_corpus(corpus),
            pool: NoncePool::from_corpus(corpus),
        }
    }

    /// The placement statistics of the corpus.
    pub fn stats(&self) -> &PositionStatistics {
        &self.stats
    }

    /// Generate all configured variant families for one sentence.
    ///
    /// The result is deduplicated structurally and never contains the
    /// input sentence itself; with one chunk (or none of the families
    /// configured) it is simply empty.
    pub fn augment<R: Rng>(
        &self,
        tree: &DependencyTree,
        config: &ExperimentConfig,
        rng: &mut R,
    ) -> Result<Vec<DependencyTree>, AugmentError> {
        let mut candidates = Vec::new();
        if let Some(rotate_config) = &config.rotate {
            candidates.extend(self.rotations(tree, rotate_config, rng)?);
        }
        if let Some(crop_config) = &config.crop {
            candidates.extend(self.crops(tree, crop_config, rng)?);
        }
        if let Some(nonce_config) = &config.nonce {
            candidates.extend(self.nonces(tree, nonce_config, rng)?);
        }

        let mut variants: Vec<DependencyTree> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if &candidate != tree && !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }

        Ok(variants)
    }

    /// Random restricted reorderings of the sentence's chunks.
    ///
    /// Draws up to `min(chunks!, max_rotations)` candidate orders in
    /// which only chunks attached with a flexible relation change
    /// places, then keeps `n` of them: a uniform sample, or, in
    /// informed mode, the `n` orders with the *lowest* positional
    /// plausibility under the corpus statistics.
    pub fn rotations<R: Rng>(
        &self,
        tree: &DependencyTree,
        config: &RotateConfig,
        rng: &mut R,
    ) -> Result<Vec<DependencyTree>, AugmentError> {
        let tree_chunks = chunks(tree)?;
        if tree_chunks.len() <= 1 {
            return Ok(Vec::new());
        }

        let flexible: Vec<&str> = match &config.flexible {
            Some(labels) => labels.iter().map(String::as_str).collect(),
            None => FLEXIBLE.to_vec(),
        };

        let n_candidates =
            saturating_factorial(tree_chunks.len()).min(config.max_rotations as u64) as usize;
        let mut candidates = Vec::with_capacity(n_candidates);
        for _ in 0..n_candidates {
            candidates.push(rotate_once(tree, &tree_chunks, &flexible, rng));
        }

        if config.informed {
            let mut scored = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                let score = self.order_probability(&candidate)?;
                scored.push((score, candidate));
            }
            scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            Ok(scored
                .into_iter()
                .take(config.n)
                .map(|(_, candidate)| candidate)
                .collect())
        } else {
            let n = config.n.min(candidates.len());
            Ok(candidates.choose_multiple(rng, n).cloned().collect())
        }
    }

    /// Subtree deletions, one variant per triggered draw.
    pub fn crops<R: Rng>(
        &self,
        tree: &DependencyTree,
        config: &CropConfig,
        rng: &mut R,
    ) -> Result<Vec<DependencyTree>, AugmentError> {
        let tree_chunks = chunks(tree)?;
        let root = tree.syntactic_root().ok_or(AugmentError::MissingRoot {
            node_count: tree.len(),
        })?;

        let mut cropped = Vec::new();
        for chunk in &tree_chunks {
            if chunk.head() == root {
                continue;
            }

            if let Some(relations) = &config.relations {
                let rel = match head_relation(tree, chunk.head()) {
                    Some(rel) => rel,
                    None => continue,
                };
                if !relations.iter().any(|allowed| allowed == rel) {
                    continue;
                }
            }

            if rng.gen::<f64>() <= config.p {
                cropped.push(crop(tree, chunk.head())?);
            }
        }

        Ok(cropped)
    }

    /// Lexical substitutions drawn from the corpus-wide nonce pools.
    pub fn nonces<R: Rng>(
        &self,
        tree: &DependencyTree,
        config: &NonceConfig,
        rng: &mut R,
    ) -> Result<Vec<DependencyTree>, AugmentError> {
        let tree_chunks = chunks(tree)?;

        let mut substituted = Vec::new();
        for chunk in &tree_chunks {
            if rng.gen::<f64>() > config.p {
                continue;
            }

            let rel = match head_relation(tree, chunk.head()) {
                Some(rel) => rel,
                None => continue,
            };
            let bundles = match self.pool.bundles(rel) {
                Some(bundles) => bundles,
                None => continue,
            };

            let picked = if config.strict {
                let original_xpos = tree[chunk.head()]
                    .token()
                    .and_then(|token| token.xpos().map(ToOwned::to_owned));
                let matching: Vec<&LexicalUpdate> = bundles
                    .iter()
                    .filter(|bundle| bundle.xpos.as_deref() == original_xpos.as_deref())
                    .collect();
                matching.choose(rng).map(|bundle| (*bundle).clone())
            } else {
                bundles.choose(rng).cloned()
            };

            if let Some(update) = picked {
                substituted.push(replace(tree, chunk.head(), &update)?);
            }
        }

        Ok(substituted)
    }

    /// Product of root-relative placement probabilities over the
    /// chunks of a candidate order. Relations without statistics
    /// contribute a neutral factor of 1.
    fn order_probability(&self, tree: &DependencyTree) -> Result<f64, AugmentError> {
        let tree_chunks = chunks(tree)?;
        let root = tree.syntactic_root().ok_or(AugmentError::MissingRoot {
            node_count: tree.len(),
        })?;

        let mut p = 1.0;
        for chunk in &tree_chunks {
            let rel = match head_relation(tree, chunk.head()) {
                Some(rel) => rel,
                None => continue,
            };
            let placement = match self.stats.placement(ROOT_RELATION, rel) {
                Some(placement) => placement,
                None => continue,
            };
            if chunk.head() < root {
                p *= placement.left;
            } else if chunk.head() > root {
                p *= placement.right;
            }
        }

        Ok(p)
    }
}

/// One random restricted permutation: flexible chunks trade places
/// among themselves, every other chunk keeps its slot.
fn rotate_once<R: Rng>(
    tree: &DependencyTree,
    tree_chunks: &[Chunk],
    flexible: &[&str],
    rng: &mut R,
) -> DependencyTree {
    // Relation subtypes after `:` do not affect flexibility.
    let movable: Vec<usize> = tree_chunks
        .iter()
        .enumerate()
        .filter(|(_, chunk)| {
            head_relation(tree, chunk.head())
                .map(|rel| {
                    let base = rel.split(':').next().unwrap_or(rel);
                    flexible.contains(&base)
                })
                .unwrap_or(false)
        })
        .map(|(slot, _)| slot)
        .collect();

    let mut targets = movable.clone();
    targets.shuffle(rng);

    let mut order: Vec<Chunk> = tree_chunks.to_vec();
    for (&slot, &target) in movable.iter().zip(&targets) {
        order[target] = tree_chunks[slot].clone();
    }

    reorder(tree, &order)
}

fn head_relation(tree: &DependencyTree, address: usize) -> Option<&str> {
    tree.dep_graph()
        .head(address)
        .and_then(DepTriple::into_relation)
}

fn saturating_factorial(n: usize) -> u64 {
    (2..=n as u64).fold(1, u64::saturating_mul)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use deptree::graph::{DepTriple, DependencyTree};
    use deptree::token::TokenBuilder;

    use super::{saturating_factorial, Augmenter};
    use crate::chunk::chunks;
    use crate::config::{CropConfig, ExperimentConfig, NonceConfig, RotateConfig};
    use crate::tests::{assert_valid_tree, five_token_tree, forms};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1704)
    }

    /// A two-token corpus sentence: "Y X", X the root, Y its subject.
    fn pool_tree() -> DependencyTree {
        let mut tree = DependencyTree::new();
        tree.push(
            TokenBuilder::new("Y")
                .lemma("y")
                .upos("PRON")
                .xpos("PP")
                .into(),
        );
        tree.push(
            TokenBuilder::new("X")
                .lemma("x")
                .upos("VERB")
                .xpos("VV")
                .into(),
        );
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(0, Some("root"), 2))
            .unwrap();
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(2, Some("nsubj"), 1))
            .unwrap();
        tree
    }

    #[test]
    fn factorial_saturates() {
        assert_eq!(saturating_factorial(0), 1);
        assert_eq!(saturating_factorial(4), 24);
        assert_eq!(saturating_factorial(100), u64::MAX);
    }

    #[test]
    fn rotations_are_valid_and_bounded() {
        let tree = five_token_tree();
        let augmenter = Augmenter::new(&[tree.clone()]);

        let config = RotateConfig {
            n: 3,
            ..RotateConfig::default()
        };
        let rotations = augmenter.rotations(&tree, &config, &mut rng()).unwrap();

        assert!(rotations.len() <= 3);
        for rotation in &rotations {
            assert_valid_tree(rotation);
            assert_eq!(rotation.len(), tree.len());

            // C travels with B, in B-C order.
            let rotated_forms = forms(rotation);
            let b = rotated_forms.iter().position(|f| f == "B").unwrap();
            assert_eq!(rotated_forms[b + 1], "C");
        }
    }

    #[test]
    fn non_flexible_chunks_keep_their_slot() {
        let tree = five_token_tree();
        let augmenter = Augmenter::new(&[tree.clone()]);

        // The root chunk is never flexible; it sits at slot 2 of the
        // four chunks and must stay there in every candidate.
        let config = RotateConfig {
            n: 10,
            max_rotations: 20,
            ..RotateConfig::default()
        };
        let rotations = augmenter.rotations(&tree, &config, &mut rng()).unwrap();
        assert!(!rotations.is_empty());

        for rotation in &rotations {
            let rotated_chunks = chunks(rotation).unwrap();
            let root = rotation.syntactic_root().unwrap();
            let slot = rotated_chunks
                .iter()
                .position(|chunk| chunk.head() == root)
                .unwrap();
            assert_eq!(slot, 2);
        }
    }

    #[test]
    fn single_chunk_has_no_rotations() {
        let mut tree = DependencyTree::new();
        tree.push(TokenBuilder::new("lone").into());
        tree.dep_graph_mut()
            .add_deprel(DepTriple::new(0, Some("root"), 1))
            .unwrap();

        let augmenter = Augmenter::new(&[tree.clone()]);
        let rotations = augmenter
            .rotations(&tree, &RotateConfig::default(), &mut rng())
            .unwrap();
        assert!(rotations.is_empty());
    }

    #[test]
    fn informed_rotations_prefer_implausible_orders() {
        let tree = five_token_tree();
        let augmenter = Augmenter::new(&[tree.clone()]);

        // In the corpus, nsubj is always left of the root and obl
        // always right; the least-likely candidates put them on the
        // opposite side.
        let config = RotateConfig {
            n: 1,
            informed: true,
            max_rotations: 50,
            flexible: None,
        };
        let picked = augmenter.rotations(&tree, &config, &mut rng()).unwrap();
        assert_eq!(picked.len(), 1);
        let kept = &picked[0];
        assert_valid_tree(kept);

        let root = kept.syntactic_root().unwrap();
        let kept_forms = forms(kept);
        let b = kept_forms.iter().position(|f| f == "B").unwrap() + 1;
        let d = kept_forms.iter().position(|f| f == "D").unwrap() + 1;
        // With a probability-1 corpus, any candidate with B and D
        // swapped across the root scores 0 and is ranked first.
        assert!(b > root || d < root);
    }

    #[test]
    fn crops_respect_probability_and_allow_list() {
        let tree = five_token_tree();
        let augmenter = Augmenter::new(&[tree.clone()]);

        let never = CropConfig {
            relations: None,
            p: 0.0,
        };
        assert!(augmenter.crops(&tree, &never, &mut rng()).unwrap().is_empty());

        let always = CropConfig {
            relations: None,
            p: 1.0,
        };
        let all = augmenter.crops(&tree, &always, &mut rng()).unwrap();
        // One variant per non-root chunk.
        assert_eq!(all.len(), 3);
        for variant in &all {
            assert_valid_tree(variant);
            assert!(variant.len() < tree.len());
        }

        let only_subjects = CropConfig {
            relations: Some(vec!["nsubj".to_string()]),
            p: 1.0,
        };
        let subjects = augmenter.crops(&tree, &only_subjects, &mut rng()).unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(forms(&subjects[0]), vec!["A", "root", "D"]);
    }

    #[test]
    fn crop_example_five_tokens() {
        // Cropping the chunk headed by B with p = 1 always yields the
        // 3-token tree {A, root, D} with contiguous addresses.
        let tree = five_token_tree();
        let augmenter = Augmenter::new(&[tree.clone()]);

        let config = CropConfig {
            relations: Some(vec!["nsubj".to_string()]),
            p: 1.0,
        };
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let variants = augmenter.crops(&tree, &config, &mut rng).unwrap();
            assert_eq!(variants.len(), 1);
            assert_eq!(forms(&variants[0]), vec!["A", "root", "D"]);
            assert_valid_tree(&variants[0]);
        }
    }

    #[test]
    fn nonce_with_singleton_pool_is_deterministic() {
        let target = five_token_tree();
        // The pool corpus has exactly one bundle each for `root` and
        // `nsubj`.
        let augmenter = Augmenter::new(&[pool_tree()]);

        let config = NonceConfig {
            p: 1.0,
            strict: false,
        };
        let variants = augmenter.nonces(&target, &config, &mut rng()).unwrap();

        // Chunk heads with rels advmod/obl have no pool; B (nsubj) and
        // root are replaced, each in its own variant.
        assert_eq!(variants.len(), 2);
        assert_eq!(forms(&variants[0]), vec!["A", "Y", "C", "root", "D"]);
        assert_eq!(forms(&variants[1]), vec!["A", "B", "C", "X", "D"]);
        for variant in &variants {
            assert_valid_tree(variant);
        }
    }

    #[test]
    fn strict_nonce_requires_matching_tag() {
        let target = five_token_tree();
        let augmenter = Augmenter::new(&[pool_tree()]);

        // No token of the target shares an xpos with the pool bundles.
        let config = NonceConfig {
            p: 1.0,
            strict: true,
        };
        let variants = augmenter.nonces(&target, &config, &mut rng()).unwrap();
        assert!(variants.is_empty());
    }

    #[test]
    fn augment_dedups_and_excludes_the_original() {
        let tree = five_token_tree();
        let augmenter = Augmenter::new(&[tree.clone()]);

        let config = ExperimentConfig {
            rotate: Some(RotateConfig {
                n: 10,
                max_rotations: 20,
                ..RotateConfig::default()
            }),
            crop: Some(CropConfig {
                relations: None,
                p: 1.0,
            }),
            nonce: None,
        };

        let variants = augmenter.augment(&tree, &config, &mut rng()).unwrap();
        assert!(!variants.is_empty());
        for (i, variant) in variants.iter().enumerate() {
            assert_ne!(variant, &tree);
            for other in &variants[i + 1..] {
                assert_ne!(variant, other);
            }
        }
    }

    #[test]
    fn augment_with_empty_config_yields_nothing() {
        let tree = five_token_tree();
        let augmenter = Augmenter::new(&[tree.clone()]);

        let variants = augmenter
            .augment(&tree, &ExperimentConfig::default(), &mut rng())
            .unwrap();
        assert!(variants.is_empty());
    }
}
