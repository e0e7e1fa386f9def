pub mod acquirer;
pub mod error;
pub mod flow;
pub mod providers;
pub mod registry;
pub mod resolver;
pub mod store;

pub use acquirer::{AcquirerSettings, CredentialAcquirer};
pub use error::ServiceError;
pub use flow::{AuthFlow, FlowState};
pub use providers::{FederatedActor, IdentityProvider, SimulatedIdentityProvider};
pub use registry::{InMemoryRoleRegistry, RoleRegistry};
pub use resolver::{Assignment, Resolution, RoleResolver};
pub use store::{
    FileSessionStore, MemorySessionStore, SessionEvents, SessionStore, StoreChange, StoreEvent,
};
