//! Trait abstractions for ledger operations.
//!
//! The ledger stores opaque contract state and commits replacements
//! atomically. Each commit names the version it was computed from, so a
//! writer working from stale state is refused instead of overwriting a
//! newer commit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Contract identifier (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId([u8; 32]);

impl ContractId {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an identifier from the deploying code label and initial state.
    pub fn derive(code: &[u8], initial_state: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(code);
        hasher.update(initial_state);
        Self(hasher.finalize().into())
    }

    /// Get bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ContractId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|e| LedgerError::Other(format!("invalid contract id: {}", e)))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            LedgerError::Other(format!("contract id must be 32 bytes, got {}", b.len()))
        })?;
        Ok(Self(bytes))
    }
}

/// Committed contract state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    /// Incremented by every commit. A deployed contract starts at 0.
    pub version: u64,
    pub data: Vec<u8>,
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger operation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Contract not found: {0}")]
    ContractNotFound(ContractId),

    #[error("Contract already deployed: {0}")]
    AlreadyDeployed(ContractId),

    /// The contract moved past the version the commit was computed from.
    #[error("Commit conflict: expected version {expected}, ledger at {actual}")]
    Conflict { expected: u64, actual: u64 },

    #[error("Ledger I/O error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

/// Trait abstraction for the hosting ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Deploy a new contract with its initial state.
    async fn deploy_contract(&self, code: &[u8], initial_state: &[u8])
        -> LedgerResult<ContractId>;

    /// Get current state of a contract.
    async fn get_state(&self, contract: &ContractId) -> LedgerResult<ContractState>;

    /// Replace the state, provided it is still at `expected_version`.
    ///
    /// All-or-nothing: on error the stored state is unchanged.
    /// Returns the new version.
    async fn commit(
        &self,
        contract: &ContractId,
        expected_version: u64,
        data: Vec<u8>,
    ) -> LedgerResult<u64>;
}
