//! User identity model: the opaque claim produced by a successful
//! credential check, before any role is attached to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Authentication channel an identity came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Email,
    Phone,
    Wallet,
    Sso,
    FederatedIdentity,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Email => "email",
            AuthMethod::Phone => "phone",
            AuthMethod::Wallet => "wallet",
            AuthMethod::Sso => "sso",
            AuthMethod::FederatedIdentity => "federated_identity",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Federated identity providers the shell can hand a sign-in to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FederatedProvider {
    InternetIdentity,
    Nfid,
    PlugWallet,
}

impl FederatedProvider {
    pub const ALL: [FederatedProvider; 3] = [
        FederatedProvider::InternetIdentity,
        FederatedProvider::Nfid,
        FederatedProvider::PlugWallet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FederatedProvider::InternetIdentity => "internet_identity",
            FederatedProvider::Nfid => "nfid",
            FederatedProvider::PlugWallet => "plug_wallet",
        }
    }

    /// Human-readable name, used as the display name of a freshly
    /// connected federated identity.
    pub fn label(&self) -> &'static str {
        match self {
            FederatedProvider::InternetIdentity => "Internet Identity",
            FederatedProvider::Nfid => "NFID",
            FederatedProvider::PlugWallet => "Plug Wallet",
        }
    }
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An authenticated user. Produced by the credential acquirer and treated
/// as immutable from then on.
///
/// For federated sign-ins `id` is the provider principal, which is also
/// the key the external role registry is queried with. For the local
/// channels it is a fabricated stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub display_name: String,
    pub auth_method: AuthMethod,
}

impl UserIdentity {
    pub fn new_email(email: &str) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            display_name: local_part(email),
            auth_method: AuthMethod::Email,
        }
    }

    pub fn new_phone(phone: &str) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            display_name: mask_phone(phone),
            auth_method: AuthMethod::Phone,
        }
    }

    pub fn new_wallet(address: &str) -> Self {
        Self {
            id: address.to_string(),
            display_name: elide_address(address),
            auth_method: AuthMethod::Wallet,
        }
    }

    pub fn new_sso(provider: &str) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            display_name: provider.to_string(),
            auth_method: AuthMethod::Sso,
        }
    }

    pub fn new_federated(provider: FederatedProvider, principal: &str) -> Self {
        Self {
            id: principal.to_string(),
            display_name: provider.label().to_string(),
            auth_method: AuthMethod::FederatedIdentity,
        }
    }

    pub fn is_federated(&self) -> bool {
        matches!(self.auth_method, AuthMethod::FederatedIdentity)
    }
}

/// Everything before the '@', the conventional short form shown in the
/// dashboard header.
fn local_part(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// Mask a phone number down to its last two digits, keeping a leading '+'.
fn mask_phone(phone: &str) -> String {
    let len = phone.chars().count();
    phone
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if c == '+' || i >= len.saturating_sub(2) {
                c
            } else {
                '*'
            }
        })
        .collect()
}

/// Shorten a wallet address to head and tail, wallet-UI style.
fn elide_address(address: &str) -> String {
    const HEAD: usize = 6;
    const TAIL: usize = 4;

    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= HEAD + TAIL {
        return address.to_string();
    }
    let head: String = chars[..HEAD].iter().collect();
    let tail: String = chars[chars.len() - TAIL..].iter().collect();
    format!("{}…{}", head, tail)
}
