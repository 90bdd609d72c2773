//! Catalog entries: collection metadata keyed by collection name.

use super::address::Address;
use super::errors::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display information supplied by the collection owner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDisplay {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub external_url: String,
    /// Square image URI.
    pub square_image: String,
    /// Banner image URI.
    pub banner_image: String,
}

/// Metadata describing one NFT collection.
///
/// Entries and proposals share this shape; approval copies a proposal's
/// metadata into the catalog unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    /// Catalog key.
    pub collection_name: String,
    /// Contract defining the asset type.
    pub contract_name: String,
    /// Account the contract is deployed to.
    pub contract_address: Address,
    /// Fully-qualified asset type identifier, e.g. `A.f8d6e0586b0a20c7.ExampleNFT.NFT`.
    pub nft_type: String,
    pub collection_display: CollectionDisplay,
    /// Account holding a published collection of this type.
    pub address_with_nft: Address,
    /// Public path identifier of that collection.
    pub public_path: String,
    /// NFT count hint from the source account.
    #[serde(default)]
    pub nft_count_hint: u64,
}

impl CatalogMetadata {
    /// Check that required fields are present.
    ///
    /// Only presence is checked. Whether the collection is actually published
    /// is the oracle's concern.
    pub fn validate(&self) -> CatalogResult<()> {
        let required = [
            ("collection_name", &self.collection_name),
            ("contract_name", &self.contract_name),
            ("nft_type", &self.nft_type),
            ("public_path", &self.public_path),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CatalogError::InvalidMetadata(format!("{} is empty", field)));
            }
        }

        Ok(())
    }
}

/// Collection name -> admitted metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStore {
    entries: BTreeMap<String, CatalogMetadata>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry. Returns the replaced metadata, if any.
    pub fn insert(&mut self, metadata: CatalogMetadata) -> Option<CatalogMetadata> {
        self.entries.insert(metadata.collection_name.clone(), metadata)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogMetadata> {
        self.entries.get(name)
    }

    /// Remove an entry, failing if it is absent.
    pub fn remove(&mut self, name: &str) -> CatalogResult<CatalogMetadata> {
        self.entries
            .remove(name)
            .ok_or_else(|| CatalogError::NotFound(format!("catalog entry '{}'", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All entries in collection-name order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogMetadata> {
        self.entries.values()
    }

    /// Collection names registered for an asset type.
    pub fn names_for_type(&self, nft_type: &str) -> Vec<String> {
        self.entries
            .values()
            .filter(|m| m.nft_type == nft_type)
            .map(|m| m.collection_name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Metadata shaped like the example collection used throughout the tests.
    pub fn example_metadata(name: &str) -> CatalogMetadata {
        CatalogMetadata {
            collection_name: name.to_string(),
            contract_name: name.to_string(),
            contract_address: Address::from(0xf8d6e0586b0a20c7),
            nft_type: format!("A.f8d6e0586b0a20c7.{}.NFT", name),
            collection_display: CollectionDisplay {
                name: "Test Name".to_string(),
                description: "Test Description".to_string(),
                external_url: "https://flow.com/".to_string(),
                square_image: "https://flow.com/square.png".to_string(),
                banner_image: "https://flow.com/banner.png".to_string(),
            },
            address_with_nft: Address::from(0x01cf0e2f2f715450),
            public_path: "exampleNFTCollection".to_string(),
            nft_count_hint: 0,
        }
    }
}
