//! Session model: the single persisted record tying an identity to its
//! selected role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Role, UserIdentity};

/// Persisted sign-in state. One record per storage area; saving replaces
/// any previous session wholesale.
///
/// `auth_token` is reserved for a future backend credential. The shell
/// round-trips it but never populates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub identity: UserIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(identity: UserIdentity, role: Option<Role>) -> Self {
        Self {
            identity,
            role,
            auth_token: None,
            updated_at: Utc::now(),
        }
    }

    /// A session without a role is valid but still awaiting selection;
    /// only a complete session counts as authenticated.
    pub fn is_complete(&self) -> bool {
        self.role.is_some()
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self.updated_at = Utc::now();
        self
    }
}
