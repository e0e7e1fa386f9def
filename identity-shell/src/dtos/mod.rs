pub mod auth;

pub use auth::{
    AdminCredentials, OtpCredentials, PasswordCredentials, SsoCredentials, WalletCredentials,
};
