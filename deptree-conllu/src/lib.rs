//! Reading and writing of dependency trees in the CoNLL-U tabular format.

mod error;
pub use crate::error::{IOError, ParseError};

pub mod io;
