use clap::{Parser, Subcommand};
use nft_catalog::catalog::{Address, EventKind, ProposalId, ProposalStatus};
use std::path::PathBuf;

pub mod audit;
pub mod config;
pub mod context;
pub mod delegation;
pub mod entries;
pub mod init;
pub mod logging;
pub mod proposals;
pub mod version;

#[derive(Parser)]
#[command(name = "nft-catalog")]
#[command(author = "NFT Catalog Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator CLI for the curated NFT collection catalog", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/nft-catalog/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy a new catalog administered by the root account
    Init {
        /// Root admin account
        #[arg(long)]
        root: Address,

        /// Ledger directory (overrides the config file)
        #[arg(long)]
        data_dir: Option<String>,
    },

    /// Add or overwrite a catalog entry (admin)
    AddEntry {
        /// Calling account
        #[arg(long)]
        signer: Address,

        /// JSON file with the collection metadata
        #[arg(long)]
        metadata: PathBuf,
    },

    /// Remove a catalog entry (admin)
    RemoveEntry {
        #[arg(long)]
        signer: Address,

        /// Collection name
        name: String,
    },

    /// Propose a collection for inclusion
    Propose {
        #[arg(long)]
        signer: Address,

        /// JSON file with the collection metadata
        #[arg(long)]
        metadata: PathBuf,

        /// Note for the reviewers
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Approve an in-review proposal (admin)
    Approve {
        #[arg(long)]
        signer: Address,

        id: ProposalId,
    },

    /// Reject an in-review proposal (admin)
    Reject {
        #[arg(long)]
        signer: Address,

        id: ProposalId,
    },

    /// Delete an in-review proposal without a decision (admin)
    RemoveProposal {
        #[arg(long)]
        signer: Address,

        id: ProposalId,
    },

    /// Withdraw your own in-review proposal
    Withdraw {
        #[arg(long)]
        signer: Address,

        id: ProposalId,
    },

    /// Install an empty admin proxy for the signing account
    SetupProxy {
        #[arg(long)]
        signer: Address,
    },

    /// Offer admin capability to an account (root only)
    Grant {
        #[arg(long)]
        signer: Address,

        /// Account receiving the offer
        #[arg(long)]
        target: Address,
    },

    /// Claim a pending capability offer into the signer's proxy
    Receive {
        #[arg(long)]
        signer: Address,
    },

    /// Revoke every capability granted to an account (root only)
    Revoke {
        #[arg(long)]
        signer: Address,

        #[arg(long)]
        target: Address,
    },

    /// Show a catalog entry
    GetEntry {
        /// Collection name
        name: String,
    },

    /// Show a proposal
    GetProposal { id: ProposalId },

    /// List catalog entries
    ListEntries {
        /// Only list collection names registered for this asset type
        #[arg(long = "type")]
        nft_type: Option<String>,
    },

    /// List retained proposals
    ListProposals {
        /// Filter by status (IN_REVIEW, APPROVED, REJECTED)
        #[arg(long)]
        status: Option<ProposalStatus>,
    },

    /// Show whether an account can act as admin
    AdminStatus {
        #[arg(long)]
        address: Address,
    },

    /// Show the audit trail
    Audit {
        /// Filter by event kind (e.g. proposal_approved)
        #[arg(long)]
        kind: Option<EventKind>,

        /// Filter by acting account
        #[arg(long)]
        actor: Option<Address>,

        /// Maximum entries to show (most recent first)
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.config;

    match cli.command {
        Commands::Version => {
            version::execute();
            Ok(())
        }
        Commands::Init { root, data_dir } => init::execute(config, root, data_dir).await,
        Commands::AddEntry { signer, metadata } => entries::add(config, signer, metadata).await,
        Commands::RemoveEntry { signer, name } => entries::remove(config, signer, name).await,
        Commands::Propose {
            signer,
            metadata,
            message,
        } => proposals::propose(config, signer, metadata, message).await,
        Commands::Approve { signer, id } => proposals::approve(config, signer, id).await,
        Commands::Reject { signer, id } => proposals::reject(config, signer, id).await,
        Commands::RemoveProposal { signer, id } => proposals::remove(config, signer, id).await,
        Commands::Withdraw { signer, id } => proposals::withdraw(config, signer, id).await,
        Commands::SetupProxy { signer } => delegation::setup_proxy(config, signer).await,
        Commands::Grant { signer, target } => delegation::grant(config, signer, target).await,
        Commands::Receive { signer } => delegation::receive(config, signer).await,
        Commands::Revoke { signer, target } => delegation::revoke(config, signer, target).await,
        Commands::GetEntry { name } => entries::get(config, name).await,
        Commands::GetProposal { id } => proposals::get(config, id).await,
        Commands::ListEntries { nft_type } => entries::list(config, nft_type).await,
        Commands::ListProposals { status } => proposals::list(config, status).await,
        Commands::AdminStatus { address } => delegation::status(config, address).await,
        Commands::Audit { kind, actor, limit } => audit::execute(config, kind, actor, limit).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["nft-catalog", "init", "--root", "0xf8d6e0586b0a20c7"]);

        assert!(cli.config.is_none());
        match cli.command {
            Commands::Init { root, data_dir } => {
                assert_eq!(root, Address::from(0xf8d6e0586b0a20c7));
                assert!(data_dir.is_none());
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_parse_global_config_after_subcommand() {
        let cli = Cli::parse_from([
            "nft-catalog",
            "approve",
            "--signer",
            "0x1",
            "7",
            "--config",
            "/tmp/catalog.toml",
        ]);

        assert_eq!(cli.config, Some("/tmp/catalog.toml".to_string()));
        match cli.command {
            Commands::Approve { signer, id } => {
                assert_eq!(signer, Address::from(1));
                assert_eq!(id, 7);
            }
            _ => panic!("Expected Approve command"),
        }
    }

    #[test]
    fn test_cli_parse_propose_default_message() {
        let cli = Cli::parse_from([
            "nft-catalog",
            "propose",
            "--signer",
            "0x179b6b1cb6755e31",
            "--metadata",
            "example.json",
        ]);

        match cli.command {
            Commands::Propose {
                metadata, message, ..
            } => {
                assert_eq!(metadata, PathBuf::from("example.json"));
                assert_eq!(message, "");
            }
            _ => panic!("Expected Propose command"),
        }
    }

    #[test]
    fn test_cli_parse_list_proposals_status() {
        let cli = Cli::parse_from(["nft-catalog", "list-proposals", "--status", "in_review"]);

        match cli.command {
            Commands::ListProposals { status } => {
                assert_eq!(status, Some(ProposalStatus::InReview));
            }
            _ => panic!("Expected ListProposals command"),
        }
    }

    #[test]
    fn test_cli_parse_audit_defaults() {
        let cli = Cli::parse_from(["nft-catalog", "audit", "--kind", "entry_added"]);

        match cli.command {
            Commands::Audit { kind, actor, limit } => {
                assert_eq!(kind, Some(EventKind::EntryAdded));
                assert!(actor.is_none());
                assert_eq!(limit, 50);
            }
            _ => panic!("Expected Audit command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_signer() {
        let result = Cli::try_parse_from(["nft-catalog", "setup-proxy", "--signer", "0xnothex"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_signer_for_mutations() {
        let result = Cli::try_parse_from(["nft-catalog", "withdraw", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::parse_from(["nft-catalog", "version"]);
        assert!(matches!(cli.command, Commands::Version));
    }
}
