//! Domain-specific errors for component operations.

use scm_schema::ident::IdentError;
use scm_schema::registry::ManifestError;
use scm_schema::version::VersionError;
use thiserror::Error;

/// Unified error type for the scm engine.
///
/// Validation variants are always raised before any network or filesystem
/// mutation; bookkeeping failures (ledger, snapshot persistence) are never
/// represented here at all, they are logged and swallowed.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed identifier, spec, or manifest field.
    #[error(transparent)]
    Ident(#[from] IdentError),

    /// Manifest failed boundary validation.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Version bump arithmetic failed.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Remote metadata or file is absent (HTTP 404). Never retried.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, expired, or rejected credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A network operation failed after exhausting its retry budget.
    #[error("{op} failed after {attempts} attempt(s): {source}")]
    Network {
        /// The operation being attempted, for the user-facing message.
        op: &'static str,
        /// How many attempts were made.
        attempts: u32,
        /// The final underlying failure.
        #[source]
        source: reqwest::Error,
    },

    /// A constructed URL did not use HTTPS.
    #[error("Refusing non-HTTPS registry URL: {0}")]
    InsecureUrl(String),

    /// A circular registry dependency was detected during install.
    #[error("Circular dependency detected involving component: {0}")]
    Circular(String),

    /// The requested version could not be pinned to a concrete release.
    #[error("Could not resolve a concrete version for '{0}'")]
    Unresolved(String),

    /// General validation failure with a field-level message.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;
