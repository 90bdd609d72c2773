//! Transactional façade over the catalog contract.
//!
//! Each mutating call is one transaction:
//! 1. Take the writer lock
//! 2. Load and decode the committed state
//! 3. Apply the operation to a working copy (authorization + status checks)
//! 4. Validate metadata against the oracle, if one is configured
//! 5. Commit the encoded copy against the loaded version
//! 6. Broadcast the event
//!
//! A failure at any step returns before the commit, so the ledger never
//! holds a half-applied change. Nothing is retried here; a `Conflict` goes
//! back to the caller.

use crate::catalog::{
    Address, AdminProxy, AuditEntry, AuditQuery, CatalogError, CatalogEvent, CatalogMetadata,
    CatalogOperation, CatalogResult, CatalogState, Proposal, ProposalId, ProposalStatus,
};
use crate::ledger::{ContractId, EventBroadcaster, EventStream, LedgerClient, LedgerError};
use crate::oracle::{validate_collection, CollectionOracle, OracleError};
use crate::serialization::SerializationError;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Code label the catalog contract is deployed under.
pub const CONTRACT_CODE: &[u8] = b"nft-catalog/v1";

/// Service errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("collection validation failed: {0}")]
    Oracle(#[from] OracleError),
}

/// Service result type.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Catalog contract bound to a ledger.
pub struct CatalogService<L: LedgerClient> {
    ledger: Arc<L>,
    contract: ContractId,
    oracle: Option<Arc<dyn CollectionOracle>>,
    write_lock: Mutex<()>,
    events: EventBroadcaster,
}

impl<L: LedgerClient> CatalogService<L> {
    /// Deploy a fresh catalog administered by `root`.
    pub async fn deploy(ledger: Arc<L>, root: Address) -> ServiceResult<Self> {
        let initial = CatalogState::new(root).to_bytes()?;
        let contract = ledger.deploy_contract(CONTRACT_CODE, &initial).await?;
        info!(contract = %contract, root = %root, "catalog deployed");
        Ok(Self::bind(ledger, contract))
    }

    /// Bind to an already deployed catalog.
    pub async fn open(ledger: Arc<L>, contract: ContractId) -> ServiceResult<Self> {
        let current = ledger.get_state(&contract).await?;
        CatalogState::from_bytes(&current.data)?;
        Ok(Self::bind(ledger, contract))
    }

    fn bind(ledger: Arc<L>, contract: ContractId) -> Self {
        Self {
            ledger,
            contract,
            oracle: None,
            write_lock: Mutex::new(()),
            events: EventBroadcaster::new(),
        }
    }

    /// Validate proposed and added metadata against `oracle`.
    pub fn with_oracle(mut self, oracle: Arc<dyn CollectionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn contract(&self) -> ContractId {
        self.contract
    }

    /// Subscribe to events committed from now on.
    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    // ---- reads -----------------------------------------------------------

    /// Latest committed state.
    pub async fn snapshot(&self) -> ServiceResult<CatalogState> {
        let current = self.ledger.get_state(&self.contract).await?;
        Ok(CatalogState::from_bytes(&current.data)?)
    }

    pub async fn get_entry(&self, name: &str) -> ServiceResult<Option<CatalogMetadata>> {
        Ok(self.snapshot().await?.get_entry(name).cloned())
    }

    pub async fn list_entries(&self) -> ServiceResult<Vec<CatalogMetadata>> {
        Ok(self.snapshot().await?.entries().iter().cloned().collect())
    }

    /// Collection names registered for an asset type.
    pub async fn entries_by_type(&self, nft_type: &str) -> ServiceResult<Vec<String>> {
        Ok(self.snapshot().await?.entries().names_for_type(nft_type))
    }

    pub async fn get_proposal(&self, id: ProposalId) -> ServiceResult<Option<Proposal>> {
        Ok(self.snapshot().await?.get_proposal(id).cloned())
    }

    /// Retained proposals in ID order, optionally filtered by status.
    pub async fn list_proposals(
        &self,
        status: Option<ProposalStatus>,
    ) -> ServiceResult<Vec<Proposal>> {
        let state = self.snapshot().await?;
        Ok(match status {
            Some(status) => state
                .proposals()
                .with_status(status)
                .into_iter()
                .cloned()
                .collect(),
            None => state.proposals().iter().cloned().collect(),
        })
    }

    pub async fn is_admin(&self, caller: &Address) -> ServiceResult<bool> {
        Ok(self.snapshot().await?.is_admin(caller))
    }

    pub async fn proxy(&self, account: &Address) -> ServiceResult<Option<AdminProxy>> {
        Ok(self.snapshot().await?.proxy(account).cloned())
    }

    pub async fn audit(&self, query: &AuditQuery) -> ServiceResult<Vec<AuditEntry>> {
        Ok(self.snapshot().await?.query_audit(query))
    }

    // ---- writes ----------------------------------------------------------

    /// Run one operation as a transaction.
    pub async fn execute(&self, operation: CatalogOperation) -> ServiceResult<CatalogEvent> {
        let metadata = match &operation {
            CatalogOperation::AddEntry { metadata, .. }
            | CatalogOperation::Propose { metadata, .. } => Some(metadata.clone()),
            _ => None,
        };

        let ((), event) = self
            .transact(metadata.as_ref(), |state| {
                state.apply(operation).map(|event| ((), event))
            })
            .await?;
        Ok(event)
    }

    pub async fn add_entry(
        &self,
        caller: &Address,
        metadata: CatalogMetadata,
    ) -> ServiceResult<CatalogEvent> {
        self.execute(CatalogOperation::AddEntry {
            caller: *caller,
            metadata,
        })
        .await
    }

    pub async fn remove_entry(&self, caller: &Address, name: &str) -> ServiceResult<CatalogEvent> {
        self.execute(CatalogOperation::RemoveEntry {
            caller: *caller,
            name: name.to_string(),
        })
        .await
    }

    /// Submit a proposal and return its ID.
    pub async fn propose(
        &self,
        proposer: &Address,
        metadata: CatalogMetadata,
        message: String,
    ) -> ServiceResult<ProposalId> {
        let validate = metadata.clone();
        let (id, _) = self
            .transact(Some(&validate), |state| {
                state.propose(proposer, metadata, message)
            })
            .await?;
        Ok(id)
    }

    pub async fn approve(&self, caller: &Address, id: ProposalId) -> ServiceResult<CatalogEvent> {
        self.execute(CatalogOperation::Approve {
            caller: *caller,
            id,
        })
        .await
    }

    pub async fn reject(&self, caller: &Address, id: ProposalId) -> ServiceResult<CatalogEvent> {
        self.execute(CatalogOperation::Reject {
            caller: *caller,
            id,
        })
        .await
    }

    pub async fn remove_proposal(
        &self,
        caller: &Address,
        id: ProposalId,
    ) -> ServiceResult<CatalogEvent> {
        self.execute(CatalogOperation::RemoveProposal {
            caller: *caller,
            id,
        })
        .await
    }

    pub async fn withdraw(&self, caller: &Address, id: ProposalId) -> ServiceResult<CatalogEvent> {
        self.execute(CatalogOperation::Withdraw {
            caller: *caller,
            id,
        })
        .await
    }

    pub async fn setup_proxy(&self, account: &Address) -> ServiceResult<CatalogEvent> {
        self.execute(CatalogOperation::SetupProxy { account: *account }).await
    }

    pub async fn grant_admin_capability(
        &self,
        root: &Address,
        target: &Address,
    ) -> ServiceResult<CatalogEvent> {
        self.execute(CatalogOperation::GrantCapability {
            caller: *root,
            target: *target,
        })
        .await
    }

    pub async fn receive_capability(&self, account: &Address) -> ServiceResult<CatalogEvent> {
        self.execute(CatalogOperation::ReceiveCapability { account: *account }).await
    }

    pub async fn revoke_admin_capability(
        &self,
        root: &Address,
        target: &Address,
    ) -> ServiceResult<CatalogEvent> {
        self.execute(CatalogOperation::RevokeCapability {
            caller: *root,
            target: *target,
        })
        .await
    }

    async fn transact<T, F>(
        &self,
        metadata: Option<&CatalogMetadata>,
        operation: F,
    ) -> ServiceResult<(T, CatalogEvent)>
    where
        F: FnOnce(&mut CatalogState) -> CatalogResult<(T, CatalogEvent)>,
    {
        let _guard = self.write_lock.lock().await;

        let current = self.ledger.get_state(&self.contract).await?;
        let mut working = CatalogState::from_bytes(&current.data)?;

        let (value, event) = operation(&mut working).map_err(|e| {
            warn!(error = %e, "catalog operation refused");
            e
        })?;

        if let (Some(oracle), Some(metadata)) = (&self.oracle, metadata) {
            validate_collection(oracle.as_ref(), metadata).map_err(|e| {
                warn!(
                    error = %e,
                    collection = %metadata.collection_name,
                    "collection validation failed"
                );
                e
            })?;
        }

        let version = self
            .ledger
            .commit(&self.contract, current.version, working.to_bytes()?)
            .await?;

        info!(
            kind = %event.kind,
            key = %event.key,
            actor = %event.actor,
            version,
            "catalog change committed"
        );
        self.events.publish(&event);

        Ok((value, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entries::test_support::example_metadata;
    use crate::catalog::EventKind;
    use crate::ledger::MemoryLedger;
    use crate::oracle::StaticOracle;
    use futures::StreamExt;

    fn root() -> Address {
        Address::from(0xf8d6e0586b0a20c7)
    }

    fn bob() -> Address {
        Address::from(0x179b6b1cb6755e31)
    }

    async fn deploy() -> (Arc<MemoryLedger>, CatalogService<MemoryLedger>) {
        let ledger = Arc::new(MemoryLedger::new());
        let service = CatalogService::deploy(ledger.clone(), root()).await.unwrap();
        (ledger, service)
    }

    #[tokio::test]
    async fn test_failed_operation_does_not_commit() {
        let (ledger, service) = deploy().await;
        let before = ledger.get_state(&service.contract()).await.unwrap();

        let result = service.approve(&bob(), 1).await;
        assert!(matches!(
            result,
            Err(ServiceError::Catalog(CatalogError::Unauthorized { .. }))
        ));

        let after = ledger.get_state(&service.contract()).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_each_success_commits_one_version() {
        let (ledger, service) = deploy().await;

        service
            .propose(&bob(), example_metadata("ExampleNFT"), "hi".into())
            .await
            .unwrap();
        service.approve(&root(), 1).await.unwrap();

        let state = ledger.get_state(&service.contract()).await.unwrap();
        assert_eq!(state.version, 2);
    }

    #[tokio::test]
    async fn test_events_broadcast_after_commit() {
        let (_ledger, service) = deploy().await;
        let mut events = service.subscribe();

        let id = service
            .propose(&bob(), example_metadata("ExampleNFT"), "hi".into())
            .await
            .unwrap();
        assert!(service.withdraw(&root(), id).await.is_err());
        service.approve(&root(), id).await.unwrap();

        let first = events.next().await.unwrap();
        let second = events.next().await.unwrap();
        assert_eq!(first.kind, EventKind::ProposalCreated);
        assert_eq!(second.kind, EventKind::ProposalApproved);
        assert_eq!(second.status, Some(ProposalStatus::Approved));
    }

    #[tokio::test]
    async fn test_oracle_rejects_unknown_collection() {
        let ledger = Arc::new(MemoryLedger::new());
        let service = CatalogService::deploy(ledger.clone(), root())
            .await
            .unwrap()
            .with_oracle(Arc::new(StaticOracle::new()));

        let result = service
            .propose(&bob(), example_metadata("ExampleNFT"), "hi".into())
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Oracle(OracleError::UnknownType(_)))
        ));
        assert!(service.get_proposal(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oracle_accepts_known_collection() {
        let meta = example_metadata("ExampleNFT");
        let oracle = StaticOracle::new()
            .with_type(meta.nft_type.clone())
            .with_collection(meta.address_with_nft, meta.public_path.clone());
        let ledger = Arc::new(MemoryLedger::new());
        let service = CatalogService::deploy(ledger, root())
            .await
            .unwrap()
            .with_oracle(Arc::new(oracle));

        service.add_entry(&root(), meta.clone()).await.unwrap();
        assert_eq!(service.get_entry("ExampleNFT").await.unwrap(), Some(meta));
    }

    #[tokio::test]
    async fn test_unauthorized_reported_before_oracle() {
        let ledger = Arc::new(MemoryLedger::new());
        let service = CatalogService::deploy(ledger, root())
            .await
            .unwrap()
            .with_oracle(Arc::new(StaticOracle::new()));

        let result = service
            .add_entry(&bob(), example_metadata("ExampleNFT"))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Catalog(CatalogError::Unauthorized { .. }))
        ));
    }

    #[tokio::test]
    async fn test_two_services_share_contract() {
        let (ledger, service) = deploy().await;
        let contract = service.contract();

        // A second writer binds to the same contract and commits first.
        let other = CatalogService::open(ledger.clone(), contract).await.unwrap();
        other
            .propose(&bob(), example_metadata("A"), String::new())
            .await
            .unwrap();

        // State is reloaded per transaction.
        let id = service
            .propose(&bob(), example_metadata("B"), String::new())
            .await
            .unwrap();
        assert_eq!(id, 2);
    }

    #[tokio::test]
    async fn test_open_unknown_contract() {
        let ledger = Arc::new(MemoryLedger::new());
        let result =
            CatalogService::open(ledger, ContractId::from_bytes([7u8; 32])).await;
        assert!(matches!(
            result,
            Err(ServiceError::Ledger(LedgerError::ContractNotFound(_)))
        ));
    }
}
