//! Operator configuration file handling
//!
//! Provides default configuration generation and loading for the catalog
//! CLI. Configuration files are TOML and live under the user config
//! directory unless `--config` points elsewhere.
//!
//! ## Operator vs Catalog State
//!
//! This file holds OPERATOR settings only: where the ledger lives, which
//! contract to talk to, whether to validate collections, and logging.
//! Who is an admin, which entries exist, and proposal history live in the
//! contract state and change only through catalog operations.

use nft_catalog::catalog::Address;
use nft_catalog::ledger::ContractId;
use nft_catalog::oracle::StaticOracle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Catalog CLI configuration (OPERATOR settings only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Ledger location and deployed contract
    pub ledger: LedgerConfig,

    /// Collection validation
    #[serde(default)]
    pub catalog: ValidationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ledger-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Directory holding contract state files
    pub data_dir: PathBuf,

    /// Deployed catalog contract (hex). Set by `init`.
    pub contract: Option<String>,
}

/// Collection validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Check proposed and added metadata against `known_collections`
    #[serde(default)]
    pub validate_collections: bool,

    /// Collections the validator accepts
    #[serde(default)]
    pub known_collections: Vec<KnownCollection>,
}

/// A collection the operator has confirmed is published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownCollection {
    pub nft_type: String,
    pub address: Address,
    pub public_path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl CatalogConfig {
    /// Create a new configuration with the given ledger directory
    #[allow(dead_code)]
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            ledger: LedgerConfig {
                data_dir,
                contract: None,
            },
            catalog: ValidationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: CatalogConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Record the deployed contract and persist (called by `init`)
    ///
    /// Returns error if a contract is already set, so a second `init`
    /// cannot silently orphan the existing catalog.
    pub fn set_contract(
        &mut self,
        path: &Path,
        contract: ContractId,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(existing) = &self.ledger.contract {
            return Err(format!(
                "Contract already set to {}. Use a separate config for another catalog.",
                existing
            )
            .into());
        }

        self.ledger.contract = Some(contract.to_string());
        self.save(path)?;

        Ok(())
    }

    /// Deployed contract, or an error telling the operator to run `init`
    pub fn contract_id(&self) -> Result<ContractId, Box<dyn std::error::Error>> {
        let hex = self
            .ledger
            .contract
            .as_deref()
            .ok_or("No catalog deployed. Run `nft-catalog init --root <address>` first.")?;

        Ok(hex.parse()?)
    }

    /// Validator built from `known_collections`, if validation is enabled
    pub fn oracle(&self) -> Option<StaticOracle> {
        if !self.catalog.validate_collections {
            return None;
        }

        let oracle = self
            .catalog
            .known_collections
            .iter()
            .fold(StaticOracle::new(), |oracle, known| {
                oracle
                    .with_type(known.nft_type.clone())
                    .with_collection(known.address, known.public_path.clone())
            });
        Some(oracle)
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(data_dir: &Path) -> String {
        format!(
            r#"# NFT Catalog Configuration (Operator Settings)
#
# This file contains OPERATOR configuration only. Admins, entries and
# proposals live in the CONTRACT STATE and change only through catalog
# operations signed by the caller.

[ledger]
# Directory holding contract state files
data_dir = {data_dir}

# Contract is set AUTOMATICALLY by `nft-catalog init`
# contract = "..."

[catalog]
# Check metadata against known_collections before proposing or adding
validate_collections = false

# [[catalog.known_collections]]
# nft_type = "A.f8d6e0586b0a20c7.ExampleNFT.NFT"
# address = "0x01cf0e2f2f715450"
# public_path = "exampleNFTCollection"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/nft-catalog/catalog.log"
"#,
            // Rendered as a TOML string so quotes and backslashes stay escaped
            data_dir = toml::Value::String(data_dir.display().to_string())
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        data_dir: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(data_dir);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }

    /// Load `path`, creating a default file first if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            Self::create_default(path, &default_data_dir())?;
        }
        Self::load(path)
    }
}

/// Get the default config file path
///
/// - Config: ~/.config/nft-catalog/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nft-catalog")
        .join("config.toml")
}

/// Get the default ledger directory
///
/// - Ledger: ~/.local/share/nft-catalog/ledger/
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nft-catalog")
        .join("ledger")
}
