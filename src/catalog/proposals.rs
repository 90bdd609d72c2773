//! Proposal records and the proposal store.
//!
//! IDs come from a counter that only moves forward. Deleting a record never
//! frees its ID.

use super::address::Address;
use super::entries::CatalogMetadata;
use super::errors::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Proposal identifier.
pub type ProposalId = u64;

/// First ID handed out by a fresh store.
pub const FIRST_PROPOSAL_ID: ProposalId = 1;

/// Review status of a retained proposal.
///
/// Withdrawn and removed proposals are deleted rather than given a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    InReview,
    Approved,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InReview => "IN_REVIEW",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Terminal statuses cannot transition again.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::InReview)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown proposal status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for ProposalStatus {
    type Err = ParseStatusError;

    /// Case-insensitive; accepts `in_review` as well as `IN_REVIEW`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN_REVIEW" => Ok(Self::InReview),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A request to admit a collection into the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub metadata: CatalogMetadata,
    pub proposer: Address,
    /// Free-text justification from the proposer.
    pub message: String,
    pub status: ProposalStatus,
    /// Unix timestamp (seconds) of creation.
    #[serde(default)]
    pub created_at: u64,
}

/// Proposal ID -> record, plus the ID counter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalStore {
    proposals: BTreeMap<ProposalId, Proposal>,
    next_id: ProposalId,
}

impl Default for ProposalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalStore {
    pub fn new() -> Self {
        Self {
            proposals: BTreeMap::new(),
            next_id: FIRST_PROPOSAL_ID,
        }
    }

    /// Create an `IN_REVIEW` record under the next unused ID.
    pub fn create(
        &mut self,
        proposer: Address,
        metadata: CatalogMetadata,
        message: String,
        created_at: u64,
    ) -> ProposalId {
        let id = self.next_id;
        self.next_id += 1;

        self.proposals.insert(
            id,
            Proposal {
                id,
                metadata,
                proposer,
                message,
                status: ProposalStatus::InReview,
                created_at,
            },
        );

        id
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    /// Fetch a record that must currently be `IN_REVIEW`.
    pub fn get_in_review(&self, id: ProposalId) -> CatalogResult<&Proposal> {
        let proposal = self
            .proposals
            .get(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("proposal {}", id)))?;

        if proposal.status != ProposalStatus::InReview {
            return Err(CatalogError::InvalidState {
                id,
                actual: proposal.status,
                expected: ProposalStatus::InReview,
            });
        }

        Ok(proposal)
    }

    /// Move an `IN_REVIEW` record to a terminal status.
    pub fn resolve(&mut self, id: ProposalId, status: ProposalStatus) -> CatalogResult<&Proposal> {
        self.get_in_review(id)?;
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("proposal {}", id)))?;
        proposal.status = status;
        Ok(proposal)
    }

    /// Delete a record. Callers check status first.
    pub fn delete(&mut self, id: ProposalId) -> CatalogResult<Proposal> {
        self.proposals
            .remove(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("proposal {}", id)))
    }

    /// ID the next `create` will assign.
    pub fn next_id(&self) -> ProposalId {
        self.next_id
    }

    /// Retained records in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn with_status(&self, status: ProposalStatus) -> Vec<&Proposal> {
        self.proposals
            .values()
            .filter(|p| p.status == status)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entries::test_support::example_metadata;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("in_review".parse(), Ok(ProposalStatus::InReview));
        assert_eq!("APPROVED".parse(), Ok(ProposalStatus::Approved));
        assert!("pending".parse::<ProposalStatus>().is_err());
    }

    fn bob() -> Address {
        Address::from(0x179b6b1cb6755e31)
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut store = ProposalStore::new();
        let first = store.create(bob(), example_metadata("A"), "first".into(), 0);
        let second = store.create(bob(), example_metadata("B"), "second".into(), 0);
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut store = ProposalStore::new();
        store.create(bob(), example_metadata("A"), String::new(), 0);
        store.create(bob(), example_metadata("B"), String::new(), 0);
        store.delete(1).unwrap();

        let third = store.create(bob(), example_metadata("C"), String::new(), 0);
        assert_eq!(third, 3);
        assert!(store.get(1).is_none());
    }

    #[test]
    fn test_new_proposal_is_in_review() {
        let mut store = ProposalStore::new();
        let id = store.create(bob(), example_metadata("A"), "please".into(), 42);
        let proposal = store.get(id).unwrap();

        assert_eq!(proposal.status, ProposalStatus::InReview);
        assert_eq!(proposal.proposer, bob());
        assert_eq!(proposal.message, "please");
        assert_eq!(proposal.created_at, 42);
    }

    #[test]
    fn test_resolve_twice_is_invalid_state() {
        let mut store = ProposalStore::new();
        let id = store.create(bob(), example_metadata("A"), String::new(), 0);

        store.resolve(id, ProposalStatus::Rejected).unwrap();
        let err = store.resolve(id, ProposalStatus::Approved).unwrap_err();

        assert_eq!(
            err,
            CatalogError::InvalidState {
                id,
                actual: ProposalStatus::Rejected,
                expected: ProposalStatus::InReview,
            }
        );
    }

    #[test]
    fn test_with_status() {
        let mut store = ProposalStore::new();
        let a = store.create(bob(), example_metadata("A"), String::new(), 0);
        store.create(bob(), example_metadata("B"), String::new(), 0);
        store.resolve(a, ProposalStatus::Approved).unwrap();

        let approved = store.with_status(ProposalStatus::Approved);
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, a);
        assert_eq!(store.with_status(ProposalStatus::InReview).len(), 1);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProposalStatus::InReview).unwrap(),
            "\"IN_REVIEW\""
        );
        assert_eq!(ProposalStatus::Approved.to_string(), "APPROVED");
        assert!(ProposalStatus::Rejected.is_resolved());
        assert!(!ProposalStatus::InReview.is_resolved());
    }
}
