//! Ledger boundary for the catalog contract.
//!
//! - Opaque contract state with versioned, all-or-nothing commits
//! - In-memory and file-backed implementations
//! - Event fan-out for committed changes

pub mod event_stream;
pub mod file;
pub mod memory;
pub mod traits;

pub use event_stream::{EventBroadcaster, EventStream};
pub use file::FileLedger;
pub use memory::MemoryLedger;
pub use traits::{ContractId, ContractState, LedgerClient, LedgerError, LedgerResult};
