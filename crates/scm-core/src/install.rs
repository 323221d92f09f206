//! Component installation: resolve, fetch, write files, track deps.
//!
//! Transitive registry dependencies are installed by direct in-process
//! recursion carrying an explicit visited set, so circular references
//! are a set-membership check and are reported per-dependency without
//! aborting siblings. File writes within one component are tracked and
//! rolled back together on failure; rollback does not extend across
//! dependency boundaries.

use std::fs;
use std::path::PathBuf;

use scm_schema::{ComponentId, ComponentSpec, RegistryItem};
use tracing::{info, warn};

use crate::cache::{Cache, DEFAULT_TTL};
use crate::css::StyleSheet;
use crate::deps::{DepTarget, VisitedSet, classify_dep, resolve_deps};
use crate::error::{Error, Result};
use crate::ledger::InstallLedger;
use crate::net::RegistryClient;
use crate::resolver::{is_resolved, resolve_version};

/// Shared state for one command invocation.
///
/// Constructed once per process in the CLI and passed down explicitly;
/// nothing here is a global.
#[derive(Debug, Clone)]
pub struct Context {
    /// Registry transport.
    pub registry: RegistryClient,
    /// TTL cache for remote metadata.
    pub cache: Cache,
    /// Project the component is installed into.
    pub project_root: PathBuf,
    /// Command prefix for the vendor installer (e.g. `npx shadcn add`).
    /// Empty means "record the redirect but do not execute anything".
    pub vendor_command: Vec<String>,
    /// Plan only; write nothing.
    pub dry_run: bool,
    /// Skip dependency installation entirely.
    pub skip_deps: bool,
    /// Bypass the metadata cache.
    pub force: bool,
}

/// What one `add` invocation did (or would do, under `--dry-run`).
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Components installed, as `(identifier, version)`.
    pub installed: Vec<(String, String)>,
    /// npm packages the consumer must install themselves.
    pub npm: Vec<String>,
    /// Names declared in both the npm and registry dependency sets.
    pub conflicts: Vec<String>,
    /// Dependencies redirected to the vendor installer.
    pub vendor: Vec<String>,
    /// Dependencies skipped because they were circular.
    pub circular: Vec<String>,
    /// Dependencies that failed, as `(identifier, error message)`.
    pub failed: Vec<(String, String)>,
}

/// Install a component and its transitive registry dependencies.
pub async fn install_component(ctx: &Context, spec: &ComponentSpec) -> Result<InstallReport> {
    let mut visited = VisitedSet::seeded(&spec.id.to_string());
    let mut report = InstallReport::default();
    let mut ledger = InstallLedger::open(&ctx.project_root);

    install_inner(
        ctx,
        &spec.id,
        spec.requested_version(),
        &mut visited,
        &mut report,
        &mut ledger,
    )
    .await?;

    Ok(report)
}

/// Fetch metadata through the TTL cache unless `--force` was given.
async fn fetch_item_cached(ctx: &Context, id: &ComponentId, version: &str) -> Result<RegistryItem> {
    let key = format!("item:{id}@{version}");

    if ctx.force {
        ctx.cache.invalidate(&key);
    } else if let Some(item) = ctx.cache.get::<RegistryItem>(&key) {
        if item.validate().is_ok() {
            return Ok(item);
        }
        ctx.cache.invalidate(&key);
    }

    let item = ctx.registry.fetch_item(id, version).await?;
    if let Err(e) = ctx.cache.put(&key, &item, DEFAULT_TTL) {
        warn!("Failed to cache metadata for {id}@{version}: {e}");
    }
    Ok(item)
}

fn install_inner<'a>(
    ctx: &'a Context,
    id: &'a ComponentId,
    requested: &'a str,
    visited: &'a mut VisitedSet,
    report: &'a mut InstallReport,
    ledger: &'a mut InstallLedger,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        let version = resolve_version(&ctx.registry, id, requested).await?;
        if !is_resolved(&version) {
            return Err(Error::Unresolved(id.to_string()));
        }

        let item = fetch_item_cached(ctx, id, &version).await?;

        if ctx.dry_run {
            info!("[dry-run] would install {id}@{version} ({} files)", item.files.len());
        } else {
            write_component_files(ctx, id, &version, &item).await?;
            ledger.record_non_fatal(&id.to_string(), &version);
        }
        report.installed.push((id.to_string(), version.clone()));

        if ctx.skip_deps {
            return Ok(());
        }

        let deps = resolve_deps(&item.dependencies, &item.registry_dependencies);
        for conflict in &deps.conflicts {
            warn!(
                "Dependency '{conflict}' of {id} appears as both an npm and a registry dependency"
            );
            report.conflicts.push(conflict.clone());
        }
        for npm_dep in deps.npm {
            if !report.npm.contains(&npm_dep) {
                report.npm.push(npm_dep);
            }
        }

        for dep in &deps.registry {
            match classify_dep(dep) {
                DepTarget::Vendor(name) => {
                    report.vendor.push(name.clone());
                    if let Err(e) = vendor_install(ctx, &name).await {
                        warn!("Vendor installer failed for '{name}': {e}");
                        report.failed.push((name, e.to_string()));
                    }
                }
                DepTarget::Registry(dep) => {
                    let dep_id = match ComponentId::parse(&dep) {
                        Ok(dep_id) => dep_id,
                        Err(e) => {
                            warn!("Skipping malformed dependency '{dep}': {e}");
                            report.failed.push((dep, e.to_string()));
                            continue;
                        }
                    };
                    if let Err(e) = visited.enter(&dep_id.to_string()) {
                        warn!("Skipping circular dependency: {e}");
                        report.circular.push(dep_id.to_string());
                        continue;
                    }
                    if let Err(e) =
                        install_inner(ctx, &dep_id, scm_schema::LATEST, visited, report, ledger)
                            .await
                    {
                        // A broken dependency does not abort its siblings.
                        warn!("Failed to install dependency {dep_id}: {e}");
                        report.failed.push((dep_id.to_string(), e.to_string()));
                    }
                }
            }
        }

        Ok(())
    })
}

/// Write every file of one component, rolling the batch back on failure.
async fn write_component_files(
    ctx: &Context,
    id: &ComponentId,
    version: &str,
    item: &RegistryItem,
) -> Result<()> {
    let mut written: Vec<PathBuf> = Vec::new();

    let result = async {
        for entry in &item.files {
            let content = match &entry.content {
                Some(content) => content.clone(),
                None => ctx.registry.fetch_file(id, version, &entry.path).await?,
            };

            let rel = entry
                .target
                .clone()
                .unwrap_or_else(|| format!("components/{}/{}", item.name, entry.path));
            let dest = ctx.project_root.join(&rel);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, content)?;
            written.push(dest);
        }

        // CSS variables become a generated per-component stylesheet,
        // merged by key in memory rather than spliced into existing text.
        let mut sheet = StyleSheet::default();
        if let Some(vars) = &item.css_vars {
            sheet.merge_vars(vars);
        }
        if let Some(raw) = &item.css {
            sheet.append_raw(raw);
        }
        if !sheet.is_empty() {
            let dest = ctx.project_root.join(format!("styles/{}.css", item.name));
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, sheet.render())?;
            written.push(dest);
        }

        Ok(())
    }
    .await;

    if result.is_err() {
        rollback(&written);
    }
    result
}

/// Best-effort deletion of a failed batch. Not atomic; documented as such.
fn rollback(written: &[PathBuf]) {
    for path in written {
        if let Err(e) = fs::remove_file(path) {
            warn!("Rollback failed to remove {}: {e}", path.display());
        }
    }
}

/// Shell out to the vendor's own installer for a reserved name.
///
/// Serves both top-level installs of vendor names and dependencies
/// redirected during a registry install.
pub async fn vendor_install(ctx: &Context, name: &str) -> Result<()> {
    let Some((program, args)) = ctx.vendor_command.split_first() else {
        // No vendor command configured; the redirect is still recorded.
        return Ok(());
    };
    if ctx.dry_run {
        info!("[dry-run] would run vendor installer for '{name}'");
        return Ok(());
    }

    let status = tokio::process::Command::new(program)
        .args(args)
        .arg(name)
        .current_dir(&ctx.project_root)
        .status()
        .await?;

    if !status.success() {
        return Err(Error::Validation(format!(
            "vendor installer exited with {status} for '{name}'"
        )));
    }
    Ok(())
}
