use thiserror::Error;

/// Tree construction error.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("dependent {dependent:?} is out of bounds for a tree with {node_count:?} nodes")]
    DependentOutOfBounds { dependent: usize, node_count: usize },

    #[error("head {head:?} is out of bounds for a tree with {node_count:?} nodes")]
    HeadOutOfBounds { head: usize, node_count: usize },
}
