use super::context::Context;
use nft_catalog::catalog::audit_trail::format_audit_log;
use nft_catalog::catalog::{Address, AuditQuery, EventKind};

/// Print the audit trail, most recent first
pub async fn execute(
    config_path: Option<String>,
    kind: Option<EventKind>,
    actor: Option<Address>,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config_path)?;
    let query = AuditQuery {
        kind,
        actor,
        limit: Some(limit),
        after_timestamp: None,
    };

    let entries = ctx.service().await?.audit(&query).await?;
    println!("{}", format_audit_log(&entries));
    Ok(())
}
