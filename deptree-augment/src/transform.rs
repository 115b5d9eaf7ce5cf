//! Address-consistent tree transformations.
//!
//! Every operation leaves its input untouched and returns a fresh tree
//! whose addresses form a contiguous `0..M` range again: the new
//! layout is fixed first, then every head and dependent reference is
//! rewritten through an old-to-new address redirect table. The
//! anchor always redirects to address 0.

use std::collections::{HashMap, HashSet};

use deptree::graph::{DepTriple, DependencyTree, Node};
use deptree::token::{Features, Token};

use crate::chunk::Chunk;
use crate::error::AugmentError;
use crate::subtree_addresses;

/// Replacement payload for the descriptive fields of a token.
///
/// Addresses, head references, and relation labels are deliberately
/// absent: replacement may never alter the structure of a tree.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct LexicalUpdate {
    pub form: String,
    pub lemma: Option<String>,
    pub upos: Option<String>,
    pub xpos: Option<String>,
    pub features: Features,
}

impl From<&Token> for LexicalUpdate {
    fn from(token: &Token) -> Self {
        LexicalUpdate {
            form: token.form().to_owned(),
            lemma: token.lemma().map(ToOwned::to_owned),
            upos: token.upos().map(ToOwned::to_owned),
            xpos: token.xpos().map(ToOwned::to_owned),
            features: token.features().clone(),
        }
    }
}

/// Lay the tree out again with its chunks in `order`.
///
/// `order` must be a permutation of the chunks of the tree. New
/// addresses are assigned by walking the chunks left to right; within
/// a chunk the original relative token order is preserved. The result
/// has the same edges and labels as the input, in a different linear
/// order.
pub fn reorder(tree: &DependencyTree, order: &[Chunk]) -> DependencyTree {
    let mut redirects = HashMap::new();
    redirects.insert(0, 0);

    let mut layout = Vec::with_capacity(tree.len() - 1);
    for chunk in order {
        for &address in chunk.indices() {
            redirects.insert(address, layout.len() + 1);
            layout.push(address);
        }
    }

    rebuild(tree, &layout, &redirects)
}

/// Remove the subtree rooted at `head_address`.
///
/// The subtree head and all of its transitive dependents disappear;
/// the surviving addresses are renumbered preserving their original
/// relative order. Removing the syntactic root is rejected, since that
/// would leave no tree.
pub fn crop(tree: &DependencyTree, head_address: usize) -> Result<DependencyTree, AugmentError> {
    let root = tree.syntactic_root().ok_or(AugmentError::MissingRoot {
        node_count: tree.len(),
    })?;
    if head_address == root {
        return Err(AugmentError::CannotRemoveRoot {
            address: head_address,
        });
    }
    if head_address == 0 || head_address >= tree.len() {
        return Err(AugmentError::NotAToken {
            address: head_address,
            node_count: tree.len(),
        });
    }

    let removed: HashSet<usize> = subtree_addresses(tree, head_address).into_iter().collect();

    let mut redirects = HashMap::new();
    redirects.insert(0, 0);
    let mut layout = Vec::with_capacity(tree.len() - 1 - removed.len());
    for address in 1..tree.len() {
        if !removed.contains(&address) {
            redirects.insert(address, layout.len() + 1);
            layout.push(address);
        }
    }

    Ok(rebuild(tree, &layout, &redirects))
}

/// Overwrite the descriptive fields of the token at `address`.
///
/// Only form, lemma, tags, and morphological features change; every
/// address, head reference, and relation label stays as it was, so no
/// renumbering is needed.
pub fn replace(
    tree: &DependencyTree,
    address: usize,
    update: &LexicalUpdate,
) -> Result<DependencyTree, AugmentError> {
    if address == 0 || address >= tree.len() {
        return Err(AugmentError::NotAToken {
            address,
            node_count: tree.len(),
        });
    }

    let mut replaced = tree.clone();
    match replaced[address] {
        Node::Token(ref mut token) => {
            token.set_form(update.form.as_str());
            token.set_lemma(update.lemma.clone());
            token.set_upos(update.upos.clone());
            token.set_xpos(update.xpos.clone());
            token.set_features(update.features.clone());
        }
        Node::Anchor => unreachable!("anchor outside address 0"),
    }

    Ok(replaced)
}

/// Rebuild a tree from the old addresses in `layout`, rewriting every
/// head and dependent reference through `redirects`.
fn rebuild(
    tree: &DependencyTree,
    layout: &[usize],
    redirects: &HashMap<usize, usize>,
) -> DependencyTree {
    let mut rebuilt = DependencyTree::new();

    for &address in layout {
        match tree[address] {
            Node::Token(ref token) => {
                rebuilt.push(token.clone());
            }
            Node::Anchor => unreachable!("anchor in token layout"),
        }
    }

    for &address in layout {
        let triple = match tree.dep_graph().head(address) {
            Some(triple) => triple,
            None => continue,
        };

        // References into a removed subtree are dropped rather than
        // redirected.
        let head = match redirects.get(&triple.head()) {
            Some(&head) => head,
            None => continue,
        };

        rebuilt
            .dep_graph_mut()
            .add_deprel(DepTriple::new(
                head,
                triple.relation().map(ToOwned::to_owned),
                redirects[&address],
            ))
            .expect("redirected relation out of bounds");
    }

    rebuilt
}
