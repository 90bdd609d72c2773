//! File-backed ledger used by the operator CLI.
//!
//! Each contract is one CBOR-encoded [`ContractState`] at
//! `<data_dir>/<contract-id>.cbor`. Commits write a sibling temp file and
//! rename it into place, so a reader sees either the old or the new state.
//!
//! Deploys and commits hold an exclusive lock on `<data_dir>/.ledger.lock`
//! for the whole read-check-write, so ledgers opened on the same directory
//! from different processes (or twice in one process) never lose a commit.

use super::traits::*;
use crate::serialization::{from_cbor, to_cbor};
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

const LOCK_FILE: &str = ".ledger.lock";

/// Exclusive OS lock on a ledger directory, released on drop.
struct DirLock {
    file: File,
}

impl Drop for DirLock {
    fn drop(&mut self) {
        // Closing the handle releases the lock as well.
        let _ = FileExt::unlock(&self.file);
    }
}

/// Ledger client persisting contract state on the local filesystem.
pub struct FileLedger {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLedger {
    /// Open a ledger rooted at `data_dir`, creating the directory if needed.
    pub async fn open(data_dir: impl Into<PathBuf>) -> LedgerResult<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| io_error(&data_dir, e))?;

        Ok(Self {
            data_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Take the directory lock. Blocks on a worker thread while another
    /// ledger holds it.
    async fn lock_dir(&self) -> LedgerResult<DirLock> {
        let path = self.data_dir.join(LOCK_FILE);
        let lock_path = path.clone();

        let file = tokio::task::spawn_blocking(move || {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(&lock_path)?;
            file.lock_exclusive()?;
            Ok::<_, std::io::Error>(file)
        })
        .await
        .map_err(|e| LedgerError::Other(format!("ledger lock task failed: {}", e)))?
        .map_err(|e| io_error(&path, e))?;

        debug!(path = %path.display(), "ledger directory locked");
        Ok(DirLock { file })
    }

    fn contract_path(&self, contract: &ContractId) -> PathBuf {
        self.data_dir.join(format!("{}.cbor", contract))
    }

    async fn read(&self, contract: &ContractId) -> LedgerResult<ContractState> {
        let path = self.contract_path(contract);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LedgerError::ContractNotFound(*contract))
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        from_cbor(&bytes).map_err(|e| LedgerError::Other(format!("{}: {}", path.display(), e)))
    }

    async fn write(&self, contract: &ContractId, state: &ContractState) -> LedgerResult<()> {
        let path = self.contract_path(contract);
        let tmp = path.with_extension("cbor.tmp");
        let bytes = to_cbor(state).map_err(|e| LedgerError::Other(e.to_string()))?;

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        Ok(())
    }
}

fn io_error(path: &Path, e: std::io::Error) -> LedgerError {
    LedgerError::Io(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl LedgerClient for FileLedger {
    async fn deploy_contract(
        &self,
        code: &[u8],
        initial_state: &[u8],
    ) -> LedgerResult<ContractId> {
        let _guard = self.write_lock.lock().await;
        let _dir_lock = self.lock_dir().await?;
        let id = ContractId::derive(code, initial_state);

        let path = self.contract_path(&id);
        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| io_error(&path, e))?
        {
            return Err(LedgerError::AlreadyDeployed(id));
        }

        let state = ContractState {
            version: 0,
            data: initial_state.to_vec(),
        };
        self.write(&id, &state).await?;
        Ok(id)
    }

    async fn get_state(&self, contract: &ContractId) -> LedgerResult<ContractState> {
        self.read(contract).await
    }

    async fn commit(
        &self,
        contract: &ContractId,
        expected_version: u64,
        data: Vec<u8>,
    ) -> LedgerResult<u64> {
        let _guard = self.write_lock.lock().await;
        let _dir_lock = self.lock_dir().await?;
        let current = self.read(contract).await?;

        if current.version != expected_version {
            return Err(LedgerError::Conflict {
                expected: expected_version,
                actual: current.version,
            });
        }

        let next = ContractState {
            version: current.version + 1,
            data,
        };
        self.write(contract, &next).await?;
        Ok(next.version)
    }
}
