//! nft-catalog - Curated NFT collection catalog
//!
//! A registry contract mapping collection names to collection metadata.
//! Anyone may propose an entry; only an admin may approve it into the
//! catalog. Admin power can be delegated through per-account proxies that
//! hold a revocable capability.
//!
//! Key principles:
//! - Every operation validates fully before mutating anything
//! - Proposal IDs only move forward and are never reused
//! - One event and one audit entry per successful change
//! - The ledger commits whole states or nothing

pub mod catalog;
pub mod ledger;
pub mod oracle;
pub mod serialization;
pub mod service;
