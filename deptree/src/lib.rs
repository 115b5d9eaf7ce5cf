//! Dependency trees for treebank augmentation.
//!
//! A [`DependencyTree`](graph::DependencyTree) stores one sentence as a
//! labeled head-to-dependent graph. Address 0 is a synthetic anchor
//! without a word of its own; the tokens of the sentence occupy the
//! addresses `1..N` in linear order.

mod error;
pub use crate::error::GraphError;

pub mod graph;

pub mod token;
