pub mod identity;
pub mod role;
pub mod session;

pub use identity::{AuthMethod, FederatedProvider, UserIdentity};
pub use role::{Role, ROLE_SELECT_PATH};
pub use session::Session;
