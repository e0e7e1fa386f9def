//! External role registry seam.
//!
//! In the real platform this is the user-registry canister, reached with an
//! agent built from the federated principal. Only federated sign-ins consult
//! it; the local channels never do.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::models::Role;
use crate::services::error::ServiceError;

/// Authoritative principal-to-role mapping.
///
/// Once the registry holds a role for a principal, that role wins over any
/// locally requested one and is never overwritten by the shell.
#[async_trait]
pub trait RoleRegistry: Send + Sync {
    async fn get_my_role(&self, principal: &str) -> Result<Option<Role>, ServiceError>;

    /// Record the first role for `principal`. The shell only calls this
    /// when `get_my_role` just returned `None`.
    async fn set_my_role(&self, principal: &str, role: Role) -> Result<(), ServiceError>;
}

/// In-memory registry standing in for the canister, with an availability
/// switch for exercising outage behavior.
pub struct InMemoryRoleRegistry {
    roles: DashMap<String, Role>,
    writes: AtomicU64,
    available: AtomicBool,
}

impl InMemoryRoleRegistry {
    pub fn new() -> Self {
        Self {
            roles: DashMap::new(),
            writes: AtomicU64::new(0),
            available: AtomicBool::new(true),
        }
    }

    /// Pre-populate a mapping without counting it as a shell write.
    pub fn seed(&self, principal: &str, role: Role) {
        self.roles.insert(principal.to_string(), role);
    }

    /// Number of `set_my_role` calls that reached the registry.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), ServiceError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ServiceError::RegistryUnavailable(anyhow::anyhow!(
                "role registry offline"
            )))
        }
    }
}

impl Default for InMemoryRoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleRegistry for InMemoryRoleRegistry {
    async fn get_my_role(&self, principal: &str) -> Result<Option<Role>, ServiceError> {
        self.ensure_available()?;
        Ok(self.roles.get(principal).map(|entry| *entry.value()))
    }

    async fn set_my_role(&self, principal: &str, role: Role) -> Result<(), ServiceError> {
        self.ensure_available()?;
        self.roles.insert(principal.to_string(), role);
        self.writes.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(principal = %principal, role = %role, "Registry role recorded");
        Ok(())
    }
}
