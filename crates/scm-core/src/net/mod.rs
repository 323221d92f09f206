//! Network collaborators: registry transport, GitHub REST, device-flow
//! auth, and the shared retry policy.

pub mod auth;
pub mod github;
pub mod registry;
pub mod retry;

pub use registry::RegistryClient;
pub use retry::with_retry;
