use super::context::Context;
use nft_catalog::catalog::Address;
use nft_catalog::service::CatalogService;
use std::path::PathBuf;

/// Deploy a new catalog contract
///
/// Creates the config file if it does not exist, deploys an empty catalog
/// administered by `root` into the ledger directory and records the
/// contract in the config. A config that already names a contract is left
/// untouched.
pub async fn execute(
    config_path: Option<String>,
    root: Address,
    data_dir: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::load(config_path)?;

    if let Some(contract) = &ctx.config.ledger.contract {
        return Err(format!(
            "Config '{}' already has catalog {}",
            ctx.config_path.display(),
            contract
        )
        .into());
    }

    if let Some(dir) = data_dir {
        ctx.config.ledger.data_dir = PathBuf::from(dir);
    }

    println!("Config: {}", ctx.config_path.display());
    println!("Ledger: {}", ctx.config.ledger.data_dir.display());

    let service = CatalogService::deploy(ctx.ledger().await?, root).await?;
    ctx.config.set_contract(&ctx.config_path, service.contract())?;

    println!();
    println!("✅ Catalog deployed");
    println!("   Contract: {}", service.contract());
    println!("   Root admin: {}", root);

    Ok(())
}
