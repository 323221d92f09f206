//! Preview command: inspect a component before installing it.

use anyhow::{Result, bail};
use scm_core::Error;
use scm_core::resolver::{is_resolved, resolve_version};
use scm_schema::ComponentSpec;

use crate::ui::Output;

pub async fn preview(component: &str) -> Result<()> {
    let output = Output::new();
    let ctx = super::build_context(false, false, false)?;

    let spec = ComponentSpec::parse(component)?;
    let version = resolve_version(&ctx.registry, &spec.id, spec.requested_version()).await?;
    if !is_resolved(&version) {
        bail!("could not resolve a concrete version for '{}'", spec.id);
    }

    let item = ctx.registry.fetch_item(&spec.id, &version).await?;

    println!();
    println!("  {}@{}", spec.id, item.version);
    println!("  kind: {}", item.kind.as_str());
    if !item.description.is_empty() {
        println!("  {}", item.description);
    }
    if let Some(published_at) = item.published_at {
        println!("  published: {} by {}", published_at.format("%Y-%m-%d"), item.publisher);
    }
    println!();
    println!("  files:");
    for entry in &item.files {
        println!("    {}", entry.path);
    }
    if !item.dependencies.is_empty() {
        println!("  npm dependencies: {}", item.dependencies.join(", "));
    }
    if !item.registry_dependencies.is_empty() {
        println!(
            "  registry dependencies: {}",
            item.registry_dependencies.join(", ")
        );
    }

    match ctx.registry.fetch_readme(&spec.id, &version).await {
        Ok(readme) => {
            println!();
            println!("{readme}");
        }
        Err(Error::NotFound(_)) => {}
        Err(e) => output.warn(&format!("Could not fetch README: {e}")),
    }

    Ok(())
}
