//! Fork command: copy a published component into a locally-owned one.

use anyhow::Result;
use scm_core::fork::fork_component;
use scm_schema::ComponentSpec;

use crate::ui::Output;

pub async fn fork(component: &str, new_name: &str, dry_run: bool) -> Result<()> {
    let output = Output::new();
    let ctx = super::build_context(dry_run, false, false)?;

    let spec = ComponentSpec::parse(component)?;
    let outcome = fork_component(&ctx, &spec, new_name).await?;

    if dry_run {
        output.info(&format!("Would fork {} into '{new_name}'", outcome.source));
        return Ok(());
    }

    output.success(&format!(
        "Forked {} into '{new_name}' ({} files)",
        outcome.source, outcome.files
    ));
    output.info(&format!("Edit {}, then run 'scm publish {new_name}'", outcome.dir.display()));
    Ok(())
}
