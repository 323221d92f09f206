pub mod ident;
pub mod registry;
pub mod reserved;
pub mod version;

// Re-exports
pub use ident::{ComponentId, ComponentSpec, IdentError};
pub use registry::{ComponentKind, CssVars, FileEntry, RegistryIndexEntry, RegistryItem};
pub use reserved::is_reserved;
pub use version::{ChangeType, VersionPlan};

/// The authoring manifest filename at a component's root.
pub const MANIFEST_FILE: &str = "registry.json";

/// Version sentinel meaning "whatever the registry considers newest".
pub const LATEST: &str = "latest";
