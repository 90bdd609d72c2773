//! Structured notifications for catalog state changes.
//!
//! Exactly one event is produced per successful operation. Failed operations
//! produce none.

use super::address::Address;
use super::delegation::CapabilityId;
use super::proposals::{ProposalId, ProposalStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    EntryAdded,
    EntryRemoved,
    ProposalCreated,
    ProposalApproved,
    ProposalRejected,
    ProposalRemoved,
    ProposalWithdrawn,
    ProxyInstalled,
    CapabilityGranted,
    CapabilityReceived,
    CapabilityRevoked,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        Self::EntryAdded,
        Self::EntryRemoved,
        Self::ProposalCreated,
        Self::ProposalApproved,
        Self::ProposalRejected,
        Self::ProposalRemoved,
        Self::ProposalWithdrawn,
        Self::ProxyInstalled,
        Self::CapabilityGranted,
        Self::CapabilityReceived,
        Self::CapabilityRevoked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntryAdded => "entry_added",
            Self::EntryRemoved => "entry_removed",
            Self::ProposalCreated => "proposal_created",
            Self::ProposalApproved => "proposal_approved",
            Self::ProposalRejected => "proposal_rejected",
            Self::ProposalRemoved => "proposal_removed",
            Self::ProposalWithdrawn => "proposal_withdrawn",
            Self::ProxyInstalled => "proxy_installed",
            Self::CapabilityGranted => "capability_granted",
            Self::CapabilityReceived => "capability_received",
            Self::CapabilityRevoked => "capability_revoked",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind: {0}")]
pub struct ParseEventKindError(String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseEventKindError(s.to_string()))
    }
}

/// Key of the record the event is about.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKey {
    Entry(String),
    Proposal(ProposalId),
    Account(Address),
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(name) => write!(f, "entry '{}'", name),
            Self::Proposal(id) => write!(f, "proposal {}", id),
            Self::Account(address) => write!(f, "account {}", address),
        }
    }
}

/// A committed state change.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEvent {
    pub kind: EventKind,
    pub key: EventKey,
    /// Resulting proposal status. `None` for deleted proposals and non-proposal events.
    pub status: Option<ProposalStatus>,
    /// Account that performed the operation.
    pub actor: Address,
    /// Collection the change concerns, when there is one.
    #[serde(default)]
    pub collection: Option<String>,
    /// Capability involved in delegation events.
    #[serde(default)]
    pub capability: Option<CapabilityId>,
}

impl CatalogEvent {
    pub fn new(kind: EventKind, key: EventKey, actor: Address) -> Self {
        Self {
            kind,
            key,
            status: None,
            actor,
            collection: None,
            capability: None,
        }
    }

    pub fn with_status(mut self, status: ProposalStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    pub fn with_capability(mut self, capability: CapabilityId) -> Self {
        self.capability = Some(capability);
        self
    }
}

impl fmt::Display for CatalogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} by {}", self.kind, self.key, self.actor)?;
        if let Some(status) = self.status {
            write!(f, " -> {}", status)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_from_display_form() {
        for kind in EventKind::ALL {
            assert_eq!(kind.to_string().parse(), Ok(kind));
        }
        assert!("entry-added".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_display() {
        let event = CatalogEvent::new(
            EventKind::ProposalApproved,
            EventKey::Proposal(1),
            Address::from(1),
        )
        .with_status(ProposalStatus::Approved)
        .with_collection("ExampleNFT");

        assert_eq!(
            event.to_string(),
            "proposal_approved proposal 1 by 0x0000000000000001 -> APPROVED"
        );
        assert_eq!(event.collection.as_deref(), Some("ExampleNFT"));
    }
}
