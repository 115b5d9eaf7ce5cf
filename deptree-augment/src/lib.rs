//! Structure-preserving augmentation of dependency treebanks.
//!
//! Given a corpus of dependency trees, this crate generates
//! structurally-valid variant trees per sentence: chunk reorderings
//! ("rotations"), subtree deletions ("crops"), and lexical
//! substitutions ("nonces"). All variants keep the dependency
//! relations of the source sentence intact.

mod error;
pub use crate::error::AugmentError;

pub mod chunk;

pub mod config;

pub mod engine;

pub mod nonce;

pub mod stats;

pub mod transform;

mod graph_algo;
pub(crate) use crate::graph_algo::subtree_addresses;
