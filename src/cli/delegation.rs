use super::context::{print_json, report, Context};
use nft_catalog::catalog::{Address, AdminProxy, CapabilityId};
use serde::Serialize;

/// Admin standing of one account.
#[derive(Debug, Serialize)]
struct AdminStatus {
    address: Address,
    is_admin: bool,
    is_root: bool,
    proxy: Option<AdminProxy>,
    pending_offer: Option<CapabilityId>,
}

/// Install an empty admin proxy for the signing account
pub async fn setup_proxy(
    config_path: Option<String>,
    signer: Address,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let event = ctx.service().await?.setup_proxy(&signer).await?;
    report(&event);
    Ok(())
}

/// Offer admin capability to `target` (root only)
///
/// The target must run `receive` before the offer takes effect.
pub async fn grant(
    config_path: Option<String>,
    signer: Address,
    target: Address,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let event = ctx
        .service()
        .await?
        .grant_admin_capability(&signer, &target)
        .await?;
    report(&event);
    println!("   {} can now run `receive` to claim it", target);
    Ok(())
}

pub async fn receive(
    config_path: Option<String>,
    signer: Address,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let event = ctx.service().await?.receive_capability(&signer).await?;
    report(&event);
    Ok(())
}

pub async fn revoke(
    config_path: Option<String>,
    signer: Address,
    target: Address,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let event = ctx
        .service()
        .await?
        .revoke_admin_capability(&signer, &target)
        .await?;
    report(&event);
    Ok(())
}

pub async fn status(
    config_path: Option<String>,
    address: Address,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let state = ctx.service().await?.snapshot().await?;

    print_json(&AdminStatus {
        address,
        is_admin: state.is_admin(&address),
        is_root: state.root() == address,
        proxy: state.proxy(&address).cloned(),
        pending_offer: state.authority().registry().pending_offer(&address),
    })
}
