use super::context::{print_json, read_metadata, report, Context};
use nft_catalog::catalog::{Address, ProposalId, ProposalStatus};
use std::path::PathBuf;

/// Submit a collection for review
pub async fn propose(
    config_path: Option<String>,
    signer: Address,
    metadata: PathBuf,
    message: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let metadata = read_metadata(&metadata)?;
    let service = ctx.service().await?;

    let id = service.propose(&signer, metadata, message).await?;
    println!("✅ Proposal {} submitted for review", id);
    Ok(())
}

pub async fn approve(
    config_path: Option<String>,
    signer: Address,
    id: ProposalId,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let event = ctx.service().await?.approve(&signer, id).await?;
    report(&event);
    Ok(())
}

pub async fn reject(
    config_path: Option<String>,
    signer: Address,
    id: ProposalId,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let event = ctx.service().await?.reject(&signer, id).await?;
    report(&event);
    Ok(())
}

pub async fn remove(
    config_path: Option<String>,
    signer: Address,
    id: ProposalId,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let event = ctx.service().await?.remove_proposal(&signer, id).await?;
    report(&event);
    Ok(())
}

pub async fn withdraw(
    config_path: Option<String>,
    signer: Address,
    id: ProposalId,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let event = ctx.service().await?.withdraw(&signer, id).await?;
    report(&event);
    Ok(())
}

pub async fn get(
    config_path: Option<String>,
    id: ProposalId,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;

    match ctx.service().await?.get_proposal(id).await? {
        Some(proposal) => print_json(&proposal),
        None => Err(format!("No proposal with id {}", id).into()),
    }
}

pub async fn list(
    config_path: Option<String>,
    status: Option<ProposalStatus>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    print_json(&ctx.service().await?.list_proposals(status).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::context::test_support::{write_config, write_metadata};
    use crate::cli::{entries, init};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_propose_then_approve_creates_entry() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_config(temp_dir.path());
        let root = Address::from(1);
        let bob = Address::from(2);
        init::execute(config.clone(), root, None).await.unwrap();

        let metadata = write_metadata(temp_dir.path(), "ExampleNFT");
        propose(config.clone(), bob, metadata, "please add".into())
            .await
            .unwrap();
        approve(config.clone(), root, 1).await.unwrap();

        entries::get(config.clone(), "ExampleNFT".into())
            .await
            .unwrap();
        list(config.clone(), Some(ProposalStatus::Approved))
            .await
            .unwrap();

        // Resolved proposals cannot be withdrawn.
        assert!(withdraw(config, bob, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_withdraw_deletes_proposal() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_config(temp_dir.path());
        let bob = Address::from(2);
        init::execute(config.clone(), Address::from(1), None)
            .await
            .unwrap();

        let metadata = write_metadata(temp_dir.path(), "ExampleNFT");
        propose(config.clone(), bob, metadata, String::new())
            .await
            .unwrap();
        withdraw(config.clone(), bob, 1).await.unwrap();

        assert!(get(config, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_reject_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_config(temp_dir.path());
        let root = Address::from(1);
        let bob = Address::from(2);
        init::execute(config.clone(), root, None).await.unwrap();

        let first = write_metadata(temp_dir.path(), "First");
        let second = write_metadata(temp_dir.path(), "Second");
        propose(config.clone(), bob, first, String::new())
            .await
            .unwrap();
        propose(config.clone(), bob, second, String::new())
            .await
            .unwrap();

        reject(config.clone(), root, 1).await.unwrap();
        remove(config.clone(), root, 2).await.unwrap();

        get(config.clone(), 1).await.unwrap();
        assert!(get(config.clone(), 2).await.is_err());
        assert!(entries::get(config, "First".into()).await.is_err());
    }
}
