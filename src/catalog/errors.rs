//! Catalog operation errors.
//!
//! Every error is a synchronous failure of a single operation. The state is
//! left exactly as it was before the call.

use super::address::Address;
use super::proposals::{ProposalId, ProposalStatus};

/// Errors returned by catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Caller lacks the identity or capability the operation requires.
    #[error("unauthorized: {caller} may not {action}")]
    Unauthorized { caller: Address, action: String },

    /// Proposal is not in the status the operation requires.
    #[error("proposal {id} is {actual}, expected {expected}")]
    InvalidState {
        id: ProposalId,
        actual: ProposalStatus,
        expected: ProposalStatus,
    },

    /// Lookup or removal target is absent.
    #[error("{0} not found")]
    NotFound(String),

    /// Target already exists (duplicate proxy setup).
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Metadata is missing a required field.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
}

impl CatalogError {
    pub(crate) fn unauthorized(caller: &Address, action: &str) -> Self {
        Self::Unauthorized {
            caller: *caller,
            action: action.to_string(),
        }
    }
}

/// Catalog result type.
pub type CatalogResult<T> = Result<T, CatalogError>;
