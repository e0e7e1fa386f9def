//! Credential payloads for the five authentication channels.
//!
//! Validation here is shape-only (required fields). Whether a credential
//! is *correct* is the upstream verifier's concern, which the shell mocks.

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordCredentials {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OtpCredentials {
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    /// Must be exactly six digits; checked against the code pattern, not
    /// against any stored value.
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WalletCredentials {
    #[validate(length(min = 1, message = "Wallet address is required"))]
    pub address: String,
    /// Opaque signature blob. Verified externally in the real platform,
    /// carried through untouched here.
    pub signature: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SsoCredentials {
    #[validate(length(min = 1, message = "SSO provider is required"))]
    pub provider: String,
    #[validate(length(min = 1, message = "SSO token is required"))]
    pub token: String,
}

/// Admin sign-in payload: password credentials plus a six-digit second
/// factor. The second factor is checked before the password channel runs.
#[derive(Debug, Deserialize)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
    pub second_factor: String,
}
