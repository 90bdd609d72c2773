//! Catalog contract state and the proposal workflow.
//!
//! `CatalogState` is the whole contract: entries, proposals, delegation and
//! the audit log. Every mutating method validates authorization and current
//! status before touching anything, then applies its change and appends
//! exactly one audit entry. A returned error means nothing changed.
//!
//! Proposal lifecycle:
//!
//! ```text
//!  (none) --propose--> IN_REVIEW --approve--> APPROVED (+ catalog entry)
//!                          |------reject----> REJECTED
//!                          |------remove----> (none)   [admin]
//!                          '------withdraw--> (none)   [proposer]
//! ```

use super::address::Address;
use super::audit_trail::{query_audit_log, unix_now, AuditEntry, AuditQuery};
use super::delegation::{AdminAuthority, AdminProxy};
use super::entries::{CatalogMetadata, CatalogStore};
use super::errors::{CatalogError, CatalogResult};
use super::events::{CatalogEvent, EventKey, EventKind};
use super::proposals::{Proposal, ProposalId, ProposalStatus, ProposalStore};
use crate::serialization::{from_cbor, to_cbor, SerializationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Current state schema.
pub const SCHEMA_VERSION: u64 = 1;

/// One state-changing request, carrying the authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogOperation {
    AddEntry {
        caller: Address,
        metadata: CatalogMetadata,
    },
    RemoveEntry {
        caller: Address,
        name: String,
    },
    Propose {
        proposer: Address,
        metadata: CatalogMetadata,
        message: String,
    },
    Approve {
        caller: Address,
        id: ProposalId,
    },
    Reject {
        caller: Address,
        id: ProposalId,
    },
    RemoveProposal {
        caller: Address,
        id: ProposalId,
    },
    Withdraw {
        caller: Address,
        id: ProposalId,
    },
    SetupProxy {
        account: Address,
    },
    GrantCapability {
        caller: Address,
        target: Address,
    },
    ReceiveCapability {
        account: Address,
    },
    RevokeCapability {
        caller: Address,
        target: Address,
    },
}

/// Catalog contract state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogState {
    /// Schema version for evolution.
    pub schema_version: u64,

    authority: AdminAuthority,

    entries: CatalogStore,

    proposals: ProposalStore,

    /// Append-only record of committed events.
    #[serde(default)]
    audit_log: Vec<AuditEntry>,
}

impl CatalogState {
    /// Fresh catalog administered by `root`.
    pub fn new(root: Address) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            authority: AdminAuthority::new(root),
            entries: CatalogStore::new(),
            proposals: ProposalStore::new(),
            audit_log: Vec::new(),
        }
    }

    /// Serialize to CBOR bytes for ledger storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        to_cbor(self)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        from_cbor(bytes)
    }

    // ---- reads -----------------------------------------------------------

    pub fn root(&self) -> Address {
        self.authority.root()
    }

    pub fn is_admin(&self, caller: &Address) -> bool {
        self.authority.is_admin(caller)
    }

    pub fn proxy(&self, account: &Address) -> Option<&AdminProxy> {
        self.authority.proxy(account)
    }

    pub fn authority(&self) -> &AdminAuthority {
        &self.authority
    }

    pub fn get_entry(&self, name: &str) -> Option<&CatalogMetadata> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> &CatalogStore {
        &self.entries
    }

    pub fn get_proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(id)
    }

    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    pub fn query_audit(&self, query: &AuditQuery) -> Vec<AuditEntry> {
        query_audit_log(&self.audit_log, query)
    }

    // ---- dispatch --------------------------------------------------------

    /// Apply one operation.
    pub fn apply(&mut self, operation: CatalogOperation) -> CatalogResult<CatalogEvent> {
        match operation {
            CatalogOperation::AddEntry { caller, metadata } => self.add_entry(&caller, metadata),
            CatalogOperation::RemoveEntry { caller, name } => self.remove_entry(&caller, &name),
            CatalogOperation::Propose {
                proposer,
                metadata,
                message,
            } => self
                .propose(&proposer, metadata, message)
                .map(|(_, event)| event),
            CatalogOperation::Approve { caller, id } => self.approve(&caller, id),
            CatalogOperation::Reject { caller, id } => self.reject(&caller, id),
            CatalogOperation::RemoveProposal { caller, id } => self.remove_proposal(&caller, id),
            CatalogOperation::Withdraw { caller, id } => self.withdraw(&caller, id),
            CatalogOperation::SetupProxy { account } => self.setup_proxy(account),
            CatalogOperation::GrantCapability { caller, target } => {
                self.grant_admin_capability(&caller, target)
            }
            CatalogOperation::ReceiveCapability { account } => self.receive_capability(&account),
            CatalogOperation::RevokeCapability { caller, target } => {
                self.revoke_admin_capability(&caller, &target)
            }
        }
    }

    // ---- catalog entries -------------------------------------------------

    /// Admit or overwrite an entry. Admin only.
    pub fn add_entry(
        &mut self,
        caller: &Address,
        metadata: CatalogMetadata,
    ) -> CatalogResult<CatalogEvent> {
        let admin = self.authority.authorize(caller, "add catalog entries")?;
        metadata.validate()?;

        let name = metadata.collection_name.clone();
        if self.entries.insert(metadata).is_some() {
            debug!(collection = %name, "catalog entry overwritten");
        }

        Ok(self.record(
            CatalogEvent::new(EventKind::EntryAdded, EventKey::Entry(name.clone()), admin.actor())
                .with_collection(name),
        ))
    }

    /// Delete an entry. Admin only.
    pub fn remove_entry(&mut self, caller: &Address, name: &str) -> CatalogResult<CatalogEvent> {
        let admin = self.authority.authorize(caller, "remove catalog entries")?;
        self.entries.remove(name)?;

        Ok(self.record(
            CatalogEvent::new(
                EventKind::EntryRemoved,
                EventKey::Entry(name.to_string()),
                admin.actor(),
            )
            .with_collection(name),
        ))
    }

    // ---- proposals -------------------------------------------------------

    /// Submit metadata for review. Open to any account.
    pub fn propose(
        &mut self,
        proposer: &Address,
        metadata: CatalogMetadata,
        message: String,
    ) -> CatalogResult<(ProposalId, CatalogEvent)> {
        metadata.validate()?;

        let name = metadata.collection_name.clone();
        let id = self.proposals.create(*proposer, metadata, message, unix_now());

        let event = self.record(
            CatalogEvent::new(EventKind::ProposalCreated, EventKey::Proposal(id), *proposer)
                .with_status(ProposalStatus::InReview)
                .with_collection(name),
        );
        Ok((id, event))
    }

    /// Approve a proposal and promote its metadata into the catalog.
    pub fn approve(&mut self, caller: &Address, id: ProposalId) -> CatalogResult<CatalogEvent> {
        let admin = self.authority.authorize(caller, "approve proposals")?;
        let metadata = self.proposals.get_in_review(id)?.metadata.clone();

        // Both writes happen after every check has passed.
        let name = metadata.collection_name.clone();
        self.proposals.resolve(id, ProposalStatus::Approved)?;
        if self.entries.insert(metadata).is_some() {
            debug!(collection = %name, proposal = id, "catalog entry overwritten by approval");
        }

        Ok(self.record(
            CatalogEvent::new(EventKind::ProposalApproved, EventKey::Proposal(id), admin.actor())
                .with_status(ProposalStatus::Approved)
                .with_collection(name),
        ))
    }

    /// Reject a proposal. The record is kept with status `REJECTED`.
    pub fn reject(&mut self, caller: &Address, id: ProposalId) -> CatalogResult<CatalogEvent> {
        let admin = self.authority.authorize(caller, "reject proposals")?;
        let name = self
            .proposals
            .resolve(id, ProposalStatus::Rejected)?
            .metadata
            .collection_name
            .clone();

        Ok(self.record(
            CatalogEvent::new(EventKind::ProposalRejected, EventKey::Proposal(id), admin.actor())
                .with_status(ProposalStatus::Rejected)
                .with_collection(name),
        ))
    }

    /// Delete an `IN_REVIEW` proposal. Admin only.
    pub fn remove_proposal(
        &mut self,
        caller: &Address,
        id: ProposalId,
    ) -> CatalogResult<CatalogEvent> {
        let admin = self.authority.authorize(caller, "remove proposals")?;
        self.proposals.get_in_review(id)?;
        let removed = self.proposals.delete(id)?;

        Ok(self.record(
            CatalogEvent::new(EventKind::ProposalRemoved, EventKey::Proposal(id), admin.actor())
                .with_collection(removed.metadata.collection_name),
        ))
    }

    /// Delete an `IN_REVIEW` proposal on behalf of its proposer.
    ///
    /// Any caller other than the proposer gets `Unauthorized`, including for
    /// IDs that do not exist, so the answer says nothing about existence.
    pub fn withdraw(&mut self, caller: &Address, id: ProposalId) -> CatalogResult<CatalogEvent> {
        let owned = self
            .proposals
            .get(id)
            .map(|p| p.proposer == *caller)
            .unwrap_or(false);
        if !owned {
            return Err(CatalogError::unauthorized(caller, "withdraw this proposal"));
        }

        self.proposals.get_in_review(id)?;
        let removed = self.proposals.delete(id)?;

        Ok(self.record(
            CatalogEvent::new(EventKind::ProposalWithdrawn, EventKey::Proposal(id), *caller)
                .with_collection(removed.metadata.collection_name),
        ))
    }

    // ---- delegation ------------------------------------------------------

    /// Install an empty admin proxy for `account`.
    pub fn setup_proxy(&mut self, account: Address) -> CatalogResult<CatalogEvent> {
        self.authority.setup_proxy(account)?;

        Ok(self.record(CatalogEvent::new(
            EventKind::ProxyInstalled,
            EventKey::Account(account),
            account,
        )))
    }

    /// Publish an admin capability for `target`. Root only.
    pub fn grant_admin_capability(
        &mut self,
        caller: &Address,
        target: Address,
    ) -> CatalogResult<CatalogEvent> {
        let root = self
            .authority
            .authorize_root(caller, "grant admin capabilities")?;
        let capability = self.authority.grant(&root, target);

        Ok(self.record(
            CatalogEvent::new(
                EventKind::CapabilityGranted,
                EventKey::Account(target),
                root.address(),
            )
            .with_capability(capability),
        ))
    }

    /// Pull the offered capability into `account`'s proxy.
    pub fn receive_capability(&mut self, account: &Address) -> CatalogResult<CatalogEvent> {
        let capability = self.authority.receive(account)?;

        Ok(self.record(
            CatalogEvent::new(
                EventKind::CapabilityReceived,
                EventKey::Account(*account),
                *account,
            )
            .with_capability(capability),
        ))
    }

    /// Unpublish every capability held by or offered to `target`. Root only.
    pub fn revoke_admin_capability(
        &mut self,
        caller: &Address,
        target: &Address,
    ) -> CatalogResult<CatalogEvent> {
        let root = self
            .authority
            .authorize_root(caller, "revoke admin capabilities")?;
        let revoked = self.authority.revoke(&root, target)?;

        let mut event = CatalogEvent::new(
            EventKind::CapabilityRevoked,
            EventKey::Account(*target),
            root.address(),
        );
        if let [only] = revoked.as_slice() {
            event = event.with_capability(*only);
        }
        Ok(self.record(event))
    }

    fn record(&mut self, event: CatalogEvent) -> CatalogEvent {
        self.audit_log.push(AuditEntry::new(event.clone(), unix_now()));
        event
    }
}
