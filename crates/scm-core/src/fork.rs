//! Fork a published component into a locally-owned editable copy.
//!
//! The fork lands as a fresh component directory in the project: the
//! manifest is rewritten to the new name with provenance recorded, the
//! version restarts at 0.1.0, and every file is materialized on disk so
//! the copy can be edited and republished under the forker's namespace.

use std::fs;
use std::path::PathBuf;

use scm_schema::ident::validate_new_name;
use scm_schema::{ComponentSpec, MANIFEST_FILE};
use tracing::info;

use crate::error::{Error, Result};
use crate::install::Context;
use crate::resolver::{is_resolved, resolve_version};

/// Initial version for every fork.
const FORK_VERSION: &str = "0.1.0";

/// What a fork produced.
#[derive(Debug)]
pub struct ForkOutcome {
    /// The component that was forked, as `namespace/name@version`.
    pub source: String,
    /// Directory the fork was written into.
    pub dir: PathBuf,
    /// Number of files written (manifest included).
    pub files: usize,
}

/// Fork `spec` into a new local component named `new_name`.
pub async fn fork_component(
    ctx: &Context,
    spec: &ComponentSpec,
    new_name: &str,
) -> Result<ForkOutcome> {
    // Same naming rules as `create`: shape plus the reserved-name guard.
    validate_new_name(new_name)?;

    let dest = ctx.project_root.join(new_name);
    if dest.exists() {
        return Err(Error::Validation(format!(
            "directory '{new_name}' already exists"
        )));
    }

    let version = resolve_version(&ctx.registry, &spec.id, spec.requested_version()).await?;
    if !is_resolved(&version) {
        return Err(Error::Unresolved(spec.id.to_string()));
    }

    let mut item = ctx.registry.fetch_item(&spec.id, &version).await?;
    let source = format!("{}@{version}", spec.id);

    if ctx.dry_run {
        info!("[dry-run] would fork {source} into '{new_name}' ({} files)", item.files.len());
        return Ok(ForkOutcome {
            source,
            dir: dest,
            files: 0,
        });
    }

    fs::create_dir_all(&dest)?;

    let mut files = 0;
    for entry in &mut item.files {
        let content = match entry.content.take() {
            Some(inline) => inline,
            None => ctx.registry.fetch_file(&spec.id, &version, &entry.path).await?,
        };
        let path = dest.join(&entry.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        files += 1;
    }

    item.name = new_name.to_string();
    item.version = FORK_VERSION.to_string();
    item.published_at = None;
    item.publisher = String::new();
    item.description = if item.description.is_empty() {
        format!("Fork of {source}")
    } else {
        format!("{} (fork of {source})", item.description)
    };

    fs::write(
        dest.join(MANIFEST_FILE),
        serde_json::to_string_pretty(&item)?,
    )?;
    files += 1;

    info!("Forked {source} into '{new_name}'");
    Ok(ForkOutcome {
        source,
        dir: dest,
        files,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::cache::Cache;
    use crate::net::RegistryClient;
    use scm_schema::RegistryItem;
    use scm_schema::ident::IdentError;
    use tempfile::TempDir;

    fn ctx(server: &mockito::Server, project: &Path, cache: &Path) -> Context {
        Context {
            registry: RegistryClient::new(reqwest::Client::new(), &server.url()).unwrap(),
            cache: Cache::new(cache),
            project_root: project.to_path_buf(),
            vendor_command: vec![],
            dry_run: false,
            skip_deps: false,
            force: false,
        }
    }

    async fn mock_source(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("GET", "/user/banner/2.0.0/registry.json")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "name": "banner",
                    "type": "ui",
                    "version": "2.0.0",
                    "description": "A banner",
                    "files": [
                        {"path": "banner.tsx", "type": "ui", "content": "export const B = 1;"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_fork_rewrites_manifest() {
        let mut server = mockito::Server::new_async().await;
        let _m = mock_source(&mut server).await;
        let project = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();

        let spec = ComponentSpec::parse("user/banner@2.0.0").unwrap();
        let outcome = fork_component(&ctx(&server, project.path(), cache.path()), &spec, "my-banner")
            .await
            .unwrap();

        assert_eq!(outcome.source, "user/banner@2.0.0");
        assert_eq!(outcome.files, 2);

        let manifest: RegistryItem = serde_json::from_str(
            &fs::read_to_string(project.path().join("my-banner/registry.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest.name, "my-banner");
        assert_eq!(manifest.version, "0.1.0");
        assert!(manifest.description.contains("fork of user/banner@2.0.0"));
        assert!(project.path().join("my-banner/banner.tsx").exists());
    }

    #[tokio::test]
    async fn test_fork_to_reserved_name_rejected() {
        let server = mockito::Server::new_async().await;
        let project = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();

        let spec = ComponentSpec::parse("user/banner").unwrap();
        let result =
            fork_component(&ctx(&server, project.path(), cache.path()), &spec, "button").await;
        assert!(matches!(result, Err(Error::Ident(IdentError::Reserved(_)))));
    }

    #[tokio::test]
    async fn test_fork_into_existing_dir_rejected() {
        let server = mockito::Server::new_async().await;
        let project = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        fs::create_dir(project.path().join("my-banner")).unwrap();

        let spec = ComponentSpec::parse("user/banner").unwrap();
        let result =
            fork_component(&ctx(&server, project.path(), cache.path()), &spec, "my-banner").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _m = mock_source(&mut server).await;
        let project = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let mut c = ctx(&server, project.path(), cache.path());
        c.dry_run = true;

        let spec = ComponentSpec::parse("user/banner@2.0.0").unwrap();
        let outcome = fork_component(&c, &spec, "my-banner").await.unwrap();
        assert_eq!(outcome.files, 0);
        assert!(!project.path().join("my-banner").exists());
    }
}
