use super::context::{print_json, read_metadata, report, Context};
use nft_catalog::catalog::Address;
use std::path::PathBuf;

/// Add or overwrite a catalog entry from a metadata file (admin)
pub async fn add(
    config_path: Option<String>,
    signer: Address,
    metadata: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let metadata = read_metadata(&metadata)?;
    let service = ctx.service().await?;

    let event = service.add_entry(&signer, metadata).await?;
    report(&event);
    Ok(())
}

/// Remove a catalog entry (admin)
pub async fn remove(
    config_path: Option<String>,
    signer: Address,
    name: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let service = ctx.service().await?;

    let event = service.remove_entry(&signer, &name).await?;
    report(&event);
    Ok(())
}

pub async fn get(
    config_path: Option<String>,
    name: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let service = ctx.service().await?;

    match service.get_entry(&name).await? {
        Some(entry) => print_json(&entry),
        None => Err(format!("No catalog entry named '{}'", name).into()),
    }
}

/// List entries, or with `--type` only the names registered for that type
pub async fn list(
    config_path: Option<String>,
    nft_type: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let service = ctx.service().await?;

    match nft_type {
        Some(nft_type) => print_json(&service.entries_by_type(&nft_type).await?),
        None => print_json(&service.list_entries().await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::context::test_support::{write_config, write_metadata};
    use crate::cli::init;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_add_get_remove_entry() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_config(temp_dir.path());
        let root = Address::from(1);
        init::execute(config.clone(), root, None).await.unwrap();

        let metadata = write_metadata(temp_dir.path(), "ExampleNFT");
        add(config.clone(), root, metadata).await.unwrap();
        get(config.clone(), "ExampleNFT".into()).await.unwrap();
        list(config.clone(), Some("A.f8d6e0586b0a20c7.ExampleNFT.NFT".into()))
            .await
            .unwrap();

        remove(config.clone(), root, "ExampleNFT".into())
            .await
            .unwrap();
        assert!(get(config, "ExampleNFT".into()).await.is_err());
    }

    #[tokio::test]
    async fn test_add_entry_as_non_admin_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_config(temp_dir.path());
        init::execute(config.clone(), Address::from(1), None)
            .await
            .unwrap();

        let metadata = write_metadata(temp_dir.path(), "ExampleNFT");
        let err = add(config, Address::from(2), metadata).await.unwrap_err();
        assert!(err.to_string().contains("unauthorized"));
    }
}
