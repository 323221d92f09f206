//! Add command: install components into the current project.

use anyhow::Result;
use scm_core::install::{install_component, vendor_install};
use scm_schema::{ComponentSpec, is_reserved};

use crate::ui::Output;

pub async fn add(components: &[String], skip_deps: bool, force: bool, dry_run: bool) -> Result<()> {
    let output = Output::new();
    let ctx = super::build_context(dry_run, skip_deps, force)?;

    for raw in components {
        // Bare vendor names never hit the registry, top-level or not.
        if let Some(name) = vendor_name(raw) {
            output.info(&format!(
                "'{name}' is a vendor component; delegating to the vendor installer"
            ));
            vendor_install(&ctx, name).await?;
            continue;
        }

        let spec = ComponentSpec::parse(raw)?;
        let report = install_component(&ctx, &spec).await?;

        for (name, version) in &report.installed {
            if dry_run {
                output.info(&format!("Would install {name}@{version}"));
            } else {
                output.success(&format!("Installed {name}@{version}"));
            }
        }
        for name in &report.vendor {
            output.info(&format!("Dependency '{name}' delegated to the vendor installer"));
        }
        for name in &report.circular {
            output.warn(&format!("Skipped circular dependency {name}"));
        }
        for name in &report.conflicts {
            output.warn(&format!(
                "'{name}' is declared as both an npm and a registry dependency"
            ));
        }
        for (name, reason) in &report.failed {
            output.error(&format!("Failed to install {name}: {reason}"));
        }
        if !report.npm.is_empty() {
            output.info(&format!(
                "Install the npm dependencies yourself: {}",
                report.npm.join(" ")
            ));
        }
    }

    Ok(())
}

/// The vendor-owned name behind `raw`, if it is a bare reserved name.
///
/// Namespaced specs go through the registry; a version suffix on a
/// vendor name is ignored since the vendor installer takes only a name.
fn vendor_name(raw: &str) -> Option<&str> {
    let name = raw.split('@').next().unwrap_or(raw);
    (!name.contains('/') && is_reserved(name)).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_vendor_name_detected() {
        assert_eq!(vendor_name("card"), Some("card"));
        assert_eq!(vendor_name("chart-5"), Some("chart-5"));
        assert_eq!(vendor_name("card@1.0.0"), Some("card"));
    }

    #[test]
    fn test_community_specs_not_redirected() {
        // Namespaced specs and non-reserved bare names take the registry
        // path (the latter then fail spec parsing).
        assert_eq!(vendor_name("acme/card"), None);
        assert_eq!(vendor_name("acme/button@1.2.0"), None);
        assert_eq!(vendor_name("my-widget"), None);
        assert!(ComponentSpec::parse("my-widget").is_err());
    }
}
