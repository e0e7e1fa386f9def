use shell_core::error::AppError;
use thiserror::Error;

use crate::models::{AuthMethod, FederatedProvider};

/// Failures the sign-in flow can surface. Each maps to a distinct user
/// message; none are retried automatically by the shell.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("{0} is unavailable")]
    ProviderUnavailable(FederatedProvider),

    #[error("Wallet connection failed")]
    WalletConnectionFailed,

    #[error("SSO sign-in failed")]
    SsoFailed,

    #[error("Session storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),

    #[error("Role registry unavailable: {0}")]
    RegistryUnavailable(#[source] anyhow::Error),

    #[error("Sign-in already in progress on the {0} channel")]
    AuthInProgress(AuthMethod),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidCredentials => {
                AppError::AuthError(anyhow::anyhow!("Invalid email or password"))
            }
            ServiceError::InvalidCode => {
                AppError::AuthError(anyhow::anyhow!("Invalid verification code"))
            }
            ServiceError::InvalidPhone => {
                AppError::AuthError(anyhow::anyhow!("Invalid phone number"))
            }
            ServiceError::ProviderUnavailable(provider) => {
                AppError::AuthError(anyhow::anyhow!("{} is unavailable", provider))
            }
            ServiceError::WalletConnectionFailed => {
                AppError::AuthError(anyhow::anyhow!("Wallet connection failed"))
            }
            ServiceError::SsoFailed => AppError::AuthError(anyhow::anyhow!("SSO sign-in failed")),
            ServiceError::StorageUnavailable(e) => AppError::StorageError(e),
            ServiceError::RegistryUnavailable(e) => AppError::RegistryError(e),
            ServiceError::AuthInProgress(channel) => AppError::Conflict(anyhow::anyhow!(
                "Sign-in already in progress on the {} channel",
                channel
            )),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
