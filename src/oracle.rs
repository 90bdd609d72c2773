//! Asset-collection oracle.
//!
//! The catalog does not implement NFT collections. When validation is
//! enabled, metadata is checked against an oracle that can resolve type
//! identifiers and confirm a collection is published at the stated path.

use crate::catalog::{Address, CatalogMetadata};
use std::collections::{HashMap, HashSet};

/// Oracle validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("unknown asset type: {0}")]
    UnknownType(String),

    #[error("no collection published at {address}/{public_path}")]
    CollectionMissing {
        address: Address,
        public_path: String,
    },
}

/// External asset-collection subsystem.
pub trait CollectionOracle: Send + Sync {
    /// Resolve a type identifier to its canonical form.
    fn resolve_type(&self, identifier: &str) -> Option<String>;

    /// Whether a collection is published at `public_path` on `address`.
    fn collection_exists(&self, address: &Address, public_path: &str) -> bool;
}

/// Check metadata against the oracle.
pub fn validate_collection(
    oracle: &dyn CollectionOracle,
    metadata: &CatalogMetadata,
) -> Result<(), OracleError> {
    oracle
        .resolve_type(&metadata.nft_type)
        .ok_or_else(|| OracleError::UnknownType(metadata.nft_type.clone()))?;

    if !oracle.collection_exists(&metadata.address_with_nft, &metadata.public_path) {
        return Err(OracleError::CollectionMissing {
            address: metadata.address_with_nft,
            public_path: metadata.public_path.clone(),
        });
    }

    Ok(())
}

/// Oracle backed by a fixed registry of known types and collections.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    types: HashMap<String, String>,
    collections: HashSet<(Address, String)>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type identifier. It resolves to itself.
    pub fn with_type(mut self, identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        self.types.insert(identifier.clone(), identifier);
        self
    }

    /// Register a published collection.
    pub fn with_collection(mut self, address: Address, public_path: impl Into<String>) -> Self {
        self.collections.insert((address, public_path.into()));
        self
    }
}

impl CollectionOracle for StaticOracle {
    fn resolve_type(&self, identifier: &str) -> Option<String> {
        self.types.get(identifier).cloned()
    }

    fn collection_exists(&self, address: &Address, public_path: &str) -> bool {
        self.collections.contains(&(*address, public_path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entries::test_support::example_metadata;

    #[test]
    fn test_known_collection_validates() {
        let meta = example_metadata("ExampleNFT");
        let oracle = StaticOracle::new()
            .with_type(meta.nft_type.clone())
            .with_collection(meta.address_with_nft, meta.public_path.clone());

        assert!(validate_collection(&oracle, &meta).is_ok());
    }

    #[test]
    fn test_unknown_type() {
        let meta = example_metadata("ExampleNFT");
        let oracle = StaticOracle::new();

        assert_eq!(
            validate_collection(&oracle, &meta),
            Err(OracleError::UnknownType(meta.nft_type.clone()))
        );
    }

    #[test]
    fn test_missing_collection() {
        let meta = example_metadata("ExampleNFT");
        let oracle = StaticOracle::new().with_type(meta.nft_type.clone());

        assert!(matches!(
            validate_collection(&oracle, &meta),
            Err(OracleError::CollectionMissing { .. })
        ));
    }
}
