//! Update command: refresh installed components to their latest versions.

use anyhow::{Result, bail};
use scm_core::install::install_component;
use scm_core::ledger::InstallLedger;
use scm_core::resolver::{is_resolved, resolve_version};
use scm_schema::ComponentSpec;

use crate::ui::Output;

pub async fn update(component: Option<&str>, dry_run: bool) -> Result<()> {
    let output = Output::new();
    // Bypass the cache so "latest" really means latest.
    let ctx = super::build_context(dry_run, false, true)?;

    let ledger = InstallLedger::open(&ctx.project_root);
    if ledger.is_empty() {
        output.info("No components are tracked in this project.");
        return Ok(());
    }

    let targets: Vec<(String, String)> = match component {
        Some(name) => match ledger.get(name) {
            Some(entry) => vec![(name.to_string(), entry.version.clone())],
            None => bail!("'{name}' is not installed in this project"),
        },
        None => ledger
            .read_all()
            .map(|(name, entry)| (name.to_string(), entry.version.clone()))
            .collect(),
    };

    for (name, installed) in targets {
        let spec = ComponentSpec::parse(&name)?;
        let latest = resolve_version(&ctx.registry, &spec.id, "latest").await?;

        if !is_resolved(&latest) {
            output.warn(&format!("Could not resolve the latest version of {name}; skipping"));
            continue;
        }
        if latest == installed {
            output.info(&format!("{name} is up to date ({installed})"));
            continue;
        }

        output.info(&format!("Updating {name} {installed} -> {latest}"));
        let pinned = ComponentSpec::parse(&format!("{name}@{latest}"))?;
        let report = install_component(&ctx, &pinned).await?;
        for (installed_name, version) in &report.installed {
            if dry_run {
                output.info(&format!("Would install {installed_name}@{version}"));
            } else {
                output.success(&format!("Installed {installed_name}@{version}"));
            }
        }
    }

    Ok(())
}
