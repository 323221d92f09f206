//! Publish command: release a component directory as a new version.

use std::path::Path;

use anyhow::{Result, bail};
use scm_core::config::Config;
use scm_core::net::github::GithubClient;
use scm_core::publish::{PublishOptions, publish_component};

use crate::ui::Output;
use crate::{REGISTRY_OWNER, REGISTRY_REPO};

pub async fn publish(path: &Path, version: Option<&str>, dry_run: bool) -> Result<()> {
    let output = Output::new();
    let config = Config::load(&scm_core::config_path());

    let Some(token) = &config.token else {
        bail!("not logged in; run 'scm login' first");
    };
    let Some(username) = &config.username else {
        bail!("stored credentials are incomplete; run 'scm login' again");
    };

    let gh = GithubClient::new(reqwest::Client::new(), token, REGISTRY_OWNER, REGISTRY_REPO);
    let opts = PublishOptions {
        version_override: version.map(str::to_string),
        dry_run,
    };

    let outcome = publish_component(
        &gh,
        username,
        path,
        &scm_core::snapshot_store_path(),
        &opts,
    )
    .await?;

    if !outcome.plan.has_changes && outcome.pull_request.is_none() && !dry_run {
        output.info(&format!(
            "No changes since version {}; nothing to publish.",
            outcome.plan.current
        ));
        return Ok(());
    }

    if dry_run {
        output.info(&format!(
            "Would publish version {} ({} bump from {})",
            outcome.plan.next, outcome.plan.change, outcome.plan.current
        ));
        return Ok(());
    }

    output.success(&format!(
        "Published version {} ({} bump)",
        outcome.plan.next, outcome.plan.change
    ));
    if let Some(pr) = &outcome.pull_request {
        output.info(&format!("Review: {}", pr.html_url));
    }
    Ok(())
}
