//! Shared plumbing for command handlers: config, logging, service, output.

use super::config::{default_config_path, CatalogConfig};
use super::logging;
use nft_catalog::catalog::{CatalogEvent, CatalogMetadata};
use nft_catalog::ledger::FileLedger;
use nft_catalog::service::CatalogService;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loaded operator configuration and where it came from.
pub struct Context {
    pub config_path: PathBuf,
    pub config: CatalogConfig,
}

impl Context {
    /// Resolve the config path, load (or create) it and start logging.
    pub fn load(config_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = config_path
            .map(PathBuf::from)
            .unwrap_or_else(default_config_path);
        let config = CatalogConfig::load_or_create(&config_path)?;
        logging::init(&config.logging)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    pub async fn ledger(&self) -> Result<Arc<FileLedger>, Box<dyn std::error::Error>> {
        Ok(Arc::new(FileLedger::open(&self.config.ledger.data_dir).await?))
    }

    /// Bind to the configured catalog contract.
    pub async fn service(
        &self,
    ) -> Result<CatalogService<FileLedger>, Box<dyn std::error::Error>> {
        let contract = self.config.contract_id()?;
        let service = CatalogService::open(self.ledger().await?, contract).await?;

        Ok(match self.config.oracle() {
            Some(oracle) => service.with_oracle(Arc::new(oracle)),
            None => service,
        })
    }
}

/// Read collection metadata from a JSON file.
pub fn read_metadata(path: &Path) -> Result<CatalogMetadata, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read metadata file '{}': {}", path.display(), e))?;
    let metadata = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse metadata file '{}': {}", path.display(), e))?;
    Ok(metadata)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn report(event: &CatalogEvent) {
    println!("✅ {}", event);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::super::config::CatalogConfig;
    use std::path::{Path, PathBuf};

    /// Write a config rooted in `dir` and return its path as a CLI argument.
    pub fn write_config(dir: &Path) -> Option<String> {
        let config_path = dir.join("config.toml");
        CatalogConfig::new(dir.join("ledger"))
            .save(&config_path)
            .unwrap();
        Some(config_path.display().to_string())
    }

    /// Write an example metadata JSON file and return its path.
    pub fn write_metadata(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(format!("{}.json", name));
        let json = serde_json::json!({
            "collection_name": name,
            "contract_name": name,
            "contract_address": "0xf8d6e0586b0a20c7",
            "nft_type": format!("A.f8d6e0586b0a20c7.{}.NFT", name),
            "collection_display": {
                "name": "The Example Collection",
                "description": "Example NFTs",
                "external_url": "https://example-nft.onflow.org",
                "square_image": "https://example.com/square.png",
                "banner_image": "https://example.com/banner.png"
            },
            "address_with_nft": "0x01cf0e2f2f715450",
            "public_path": "exampleNFTCollection"
        });
        std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
        path
    }
}
