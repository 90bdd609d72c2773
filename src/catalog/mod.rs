//! Catalog contract: entries, proposals, delegation and audit trail.
//!
//! All state lives in one [`CatalogState`] value, constructed at deploy time
//! and passed by reference to every operation.

pub mod address;
pub mod audit_trail;
pub mod delegation;
pub mod entries;
pub mod errors;
pub mod events;
pub mod proposals;
pub mod state;

pub use address::Address;
pub use audit_trail::{AuditEntry, AuditQuery};
pub use delegation::{AdminAuthority, AdminProxy, CapabilityId};
pub use entries::{CatalogMetadata, CollectionDisplay};
pub use errors::{CatalogError, CatalogResult};
pub use events::{CatalogEvent, EventKey, EventKind};
pub use proposals::{Proposal, ProposalId, ProposalStatus};
pub use state::{CatalogOperation, CatalogState};
