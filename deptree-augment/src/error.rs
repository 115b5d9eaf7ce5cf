use thiserror::Error;

/// Augmentation errors.
///
/// A structural error is fatal for the affected sentence only; callers
/// processing a corpus are expected to skip the sentence and continue.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum AugmentError {
    /// No token carries the `root` relation.
    #[error("no token with the root relation in a tree with {node_count:?} nodes")]
    MissingRoot { node_count: usize },

    /// Removing the subtree of the syntactic root would leave no tree.
    #[error("cannot remove the subtree of the syntactic root at {address:?}")]
    CannotRemoveRoot { address: usize },

    /// The address does not identify a token.
    #[error("address {address:?} is not a token in a tree with {node_count:?} nodes")]
    NotAToken { address: usize, node_count: usize },
}
