//! One module per subcommand.

pub mod add;
pub mod create;
pub mod fork;
pub mod login;
pub mod logout;
pub mod preview;
pub mod publish;
pub mod search;
pub mod update;

use anyhow::Result;
use scm_core::Context;
use scm_core::cache::Cache;
use scm_core::config::Config;
use scm_core::net::RegistryClient;
use scm_core::net::registry::DEFAULT_REGISTRY_URL;

/// Build the shared per-invocation state from config and environment.
pub(crate) fn build_context(dry_run: bool, skip_deps: bool, force: bool) -> Result<Context> {
    let config = Config::load(&scm_core::config_path());
    let base_url = config
        .registry_url
        .as_deref()
        .unwrap_or(DEFAULT_REGISTRY_URL);

    Ok(Context {
        registry: RegistryClient::new(reqwest::Client::new(), base_url)?,
        cache: Cache::new(&scm_core::cache_path()),
        project_root: std::env::current_dir()?,
        vendor_command: vendor_command(),
        dry_run,
        skip_deps,
        force,
    })
}

/// Command prefix for the vendor's own component installer.
///
/// Overridable with `SCM_VENDOR_INSTALLER` (whitespace-separated), mainly
/// for tests and unusual setups.
fn vendor_command() -> Vec<String> {
    match std::env::var("SCM_VENDOR_INSTALLER") {
        Ok(raw) => raw.split_whitespace().map(str::to_string).collect(),
        Err(_) => vec![
            "npx".to_string(),
            "shadcn@latest".to_string(),
            "add".to_string(),
        ],
    }
}
