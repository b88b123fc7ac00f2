//! Per-handle error taxonomy.
//!
//! None of these abort a batch: the pipeline records the message against
//! the offending URL and moves on.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::models::HandleKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// URL matched no known pattern
    #[error("invalid URL")]
    InvalidUrl,

    /// Catalog reports the identifier does not exist
    #[error("{0} not found")]
    NotFound(HandleKind),

    /// Transport, quota or decode failure; carries the underlying message
    #[error("API error: {0}")]
    Api(String),
}

impl From<CatalogError> for FetchError {
    fn from(err: CatalogError) -> Self {
        FetchError::Api(err.to_string())
    }
}
