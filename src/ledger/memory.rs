//! In-memory ledger for tests and embedding.

use super::traits::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory ledger client.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    contracts: HashMap<ContractId, ContractState>,
}

impl MemoryLedger {
    /// Create new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Other("ledger lock poisoned".to_string()))
    }

    /// Put a contract state (for test setup).
    pub fn put_state(&self, contract: ContractId, state: ContractState) -> LedgerResult<()> {
        self.lock()?.contracts.insert(contract, state);
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn deploy_contract(
        &self,
        code: &[u8],
        initial_state: &[u8],
    ) -> LedgerResult<ContractId> {
        let id = ContractId::derive(code, initial_state);
        let mut state = self.lock()?;
        if state.contracts.contains_key(&id) {
            return Err(LedgerError::AlreadyDeployed(id));
        }

        state.contracts.insert(
            id,
            ContractState {
                version: 0,
                data: initial_state.to_vec(),
            },
        );
        Ok(id)
    }

    async fn get_state(&self, contract: &ContractId) -> LedgerResult<ContractState> {
        self.lock()?
            .contracts
            .get(contract)
            .cloned()
            .ok_or(LedgerError::ContractNotFound(*contract))
    }

    async fn commit(
        &self,
        contract: &ContractId,
        expected_version: u64,
        data: Vec<u8>,
    ) -> LedgerResult<u64> {
        let mut state = self.lock()?;
        let current = state
            .contracts
            .get_mut(contract)
            .ok_or(LedgerError::ContractNotFound(*contract))?;

        if current.version != expected_version {
            return Err(LedgerError::Conflict {
                expected: expected_version,
                actual: current.version,
            });
        }

        current.version += 1;
        current.data = data;
        Ok(current.version)
    }
}
