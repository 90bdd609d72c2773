//! Admin authority and per-account admin proxies.
//!
//! The root account owns the [`AdminAuthority`]. It publishes capability
//! grants for other accounts; each account installs an [`AdminProxy`] and
//! pulls the offered [`CapabilityId`] into it. A proxy holds only the
//! handle. Whether the handle still works is decided by the authority's
//! registry on every use, so unpublishing a grant revokes every stored copy
//! of it at once.
//!
//! Resolved rights are represented by [`Admin`] (catalog administration)
//! and [`RootAuthority`] (delegation). Only the root account can obtain a
//! `RootAuthority`, so a proxy holder can use admin powers but cannot hand
//! them on.

use super::address::Address;
use super::errors::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Handle to a published admin capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CapabilityId(pub u64);

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cap-{}", self.0)
    }
}

/// Per-account holder of a delegated admin capability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProxy {
    pub owner: Address,
    /// Received handle. `None` for a freshly installed proxy.
    pub capability: Option<CapabilityId>,
}

impl AdminProxy {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            capability: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.capability.is_none()
    }
}

/// Grants published by the authority.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRegistry {
    next_id: u64,
    /// Handle -> account allowed to use it.
    published: BTreeMap<CapabilityId, Address>,
    /// Published grants not yet received: grantee -> handle.
    offers: BTreeMap<Address, CapabilityId>,
}

impl CapabilityRegistry {
    /// Whether `handle` is published for `holder`.
    pub fn resolves(&self, holder: &Address, handle: &CapabilityId) -> bool {
        self.published.get(handle) == Some(holder)
    }

    pub fn pending_offer(&self, grantee: &Address) -> Option<CapabilityId> {
        self.offers.get(grantee).copied()
    }

    /// Handles currently published for `grantee`.
    pub fn published_for(&self, grantee: &Address) -> Vec<CapabilityId> {
        self.published
            .iter()
            .filter(|(_, holder)| *holder == grantee)
            .map(|(id, _)| *id)
            .collect()
    }

    fn publish(&mut self, grantee: Address) -> (CapabilityId, Option<CapabilityId>) {
        self.next_id += 1;
        let id = CapabilityId(self.next_id);
        self.published.insert(id, grantee);

        // An unreceived earlier offer is superseded and stops resolving.
        let superseded = self.offers.insert(grantee, id);
        if let Some(old) = superseded {
            self.published.remove(&old);
        }

        (id, superseded)
    }

    fn take_offer(&mut self, grantee: &Address) -> Option<CapabilityId> {
        self.offers.remove(grantee)
    }

    fn revoke_all(&mut self, grantee: &Address) -> Vec<CapabilityId> {
        let revoked = self.published_for(grantee);
        for id in &revoked {
            self.published.remove(id);
        }
        self.offers.remove(grantee);
        revoked
    }
}

/// Resolved catalog-admin rights for one operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admin {
    /// The root account itself.
    Root(Address),
    /// A proxy holder acting through a resolved capability.
    Delegated {
        holder: Address,
        capability: CapabilityId,
    },
}

impl Admin {
    /// Account performing the operation.
    pub fn actor(&self) -> Address {
        match self {
            Self::Root(address) => *address,
            Self::Delegated { holder, .. } => *holder,
        }
    }
}

/// Proof that the caller is the root account. Required for delegation.
#[derive(Debug)]
pub struct RootAuthority {
    root: Address,
}

impl RootAuthority {
    pub fn address(&self) -> Address {
        self.root
    }
}

/// Root-owned control over catalog administration and delegation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminAuthority {
    root: Address,
    registry: CapabilityRegistry,
    proxies: BTreeMap<Address, AdminProxy>,
}

impl AdminAuthority {
    pub fn new(root: Address) -> Self {
        Self {
            root,
            registry: CapabilityRegistry::default(),
            proxies: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> Address {
        self.root
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn proxy(&self, account: &Address) -> Option<&AdminProxy> {
        self.proxies.get(account)
    }

    /// Resolve the caller's admin rights.
    ///
    /// Root always resolves. Anyone else needs an installed proxy whose
    /// handle is still published for them.
    pub fn authorize(&self, caller: &Address, action: &str) -> CatalogResult<Admin> {
        if let Some(admin) = self.resolve(caller) {
            return Ok(admin);
        }

        if let Some(handle) = self.proxies.get(caller).and_then(|proxy| proxy.capability) {
            warn!(caller = %caller, capability = %handle, "stale admin capability refused");
        }
        Err(CatalogError::unauthorized(caller, action))
    }

    /// Whether `caller` currently resolves to admin rights. Never logs.
    pub fn is_admin(&self, caller: &Address) -> bool {
        self.resolve(caller).is_some()
    }

    fn resolve(&self, caller: &Address) -> Option<Admin> {
        if *caller == self.root {
            return Some(Admin::Root(*caller));
        }

        let handle = self.proxies.get(caller)?.capability?;
        self.registry.resolves(caller, &handle).then_some(Admin::Delegated {
            holder: *caller,
            capability: handle,
        })
    }

    /// Resolve root-only rights. Proxy holders are refused.
    pub fn authorize_root(&self, caller: &Address, action: &str) -> CatalogResult<RootAuthority> {
        if *caller != self.root {
            return Err(CatalogError::unauthorized(caller, action));
        }
        Ok(RootAuthority { root: self.root })
    }

    /// Install an empty proxy for `account`.
    pub fn setup_proxy(&mut self, account: Address) -> CatalogResult<()> {
        if self.proxies.contains_key(&account) {
            return Err(CatalogError::AlreadyExists(format!(
                "admin proxy for {}",
                account
            )));
        }
        self.proxies.insert(account, AdminProxy::new(account));
        Ok(())
    }

    /// Publish a fresh grant for `target` and offer it to its proxy.
    pub fn grant(&mut self, _root: &RootAuthority, target: Address) -> CapabilityId {
        let (id, superseded) = self.registry.publish(target);
        if let Some(old) = superseded {
            warn!(target = %target, superseded = %old, "unreceived capability offer replaced");
        }
        id
    }

    /// Move the offer for `account` into its proxy.
    pub fn receive(&mut self, account: &Address) -> CatalogResult<CapabilityId> {
        if !self.proxies.contains_key(account) {
            return Err(CatalogError::NotFound(format!("admin proxy for {}", account)));
        }
        // Checked before taking the offer so a failure leaves it in place.
        let id = self
            .registry
            .pending_offer(account)
            .ok_or_else(|| CatalogError::NotFound(format!("capability offer for {}", account)))?;

        self.registry.take_offer(account);
        if let Some(proxy) = self.proxies.get_mut(account) {
            proxy.capability = Some(id);
        }
        Ok(id)
    }

    /// Unpublish every grant held by or offered to `target`.
    pub fn revoke(
        &mut self,
        _root: &RootAuthority,
        target: &Address,
    ) -> CatalogResult<Vec<CapabilityId>> {
        let revoked = self.registry.revoke_all(target);
        if revoked.is_empty() {
            return Err(CatalogError::NotFound(format!(
                "published capability for {}",
                target
            )));
        }
        Ok(revoked)
    }
}
