//! Publish flow: fingerprint the component, plan the version bump, push
//! the release to a branch of the registry repository, and open a pull
//! request for review.
//!
//! Everything that can fail validation does so before the first remote
//! write. Snapshot persistence happens last and is non-fatal; losing it
//! only costs a pessimistic bump classification next time.

use std::fs;
use std::path::Path;

use chrono::Utc;
use scm_schema::version::{ChangeType, VersionPlan};
use scm_schema::{MANIFEST_FILE, RegistryItem};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::fingerprint::{Snapshot, SnapshotStore, compute_snapshot, diff_snapshots};
use crate::net::github::{GithubClient, PullRequest, PullRequestSpec};
use crate::policy::plan_version;

/// Branch the registry repository accepts release PRs against.
const BASE_BRANCH: &str = "main";

/// Knobs for one publish invocation.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Explicit version to release instead of the computed bump.
    pub version_override: Option<String>,
    /// Plan only; perform no remote writes and persist nothing.
    pub dry_run: bool,
}

/// What a publish attempt produced.
#[derive(Debug)]
pub struct PublishOutcome {
    /// The version plan that was (or would be) released.
    pub plan: VersionPlan,
    /// The opened pull request, absent for dry runs and no-ops.
    pub pull_request: Option<PullRequest>,
    /// Number of files pushed to the release branch.
    pub files_published: usize,
}

/// Publish the component in `component_dir` under `namespace`.
///
/// The snapshot store at `store_path` supplies the previous publish's
/// fingerprint for change classification and is updated on success.
pub async fn publish_component(
    gh: &GithubClient,
    namespace: &str,
    component_dir: &Path,
    store_path: &Path,
    opts: &PublishOptions,
) -> Result<PublishOutcome> {
    let component_dir = component_dir.canonicalize()?;
    let manifest_path = component_dir.join(MANIFEST_FILE);
    let content = fs::read_to_string(&manifest_path).map_err(|_| {
        Error::NotFound(format!(
            "{MANIFEST_FILE} in {}",
            component_dir.display()
        ))
    })?;
    let mut item: RegistryItem = serde_json::from_str(&content)?;
    item.validate()?;

    // Snapshots are keyed by the authoring directory, not the manifest
    // name, so renaming one cannot borrow the other's baseline.
    let dir_key = component_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            Error::Validation(format!(
                "component path '{}' has no directory name",
                component_dir.display()
            ))
        })?
        .to_string();

    let snapshot = compute_snapshot(&component_dir)?;
    let mut store = SnapshotStore::load(store_path);
    let previous = store.get(&dir_key).cloned();

    let plan = match &previous {
        Some(prev) => {
            let diff = diff_snapshots(prev, &snapshot);
            if diff.is_empty() && opts.version_override.is_none() {
                info!("No changes detected for {}; nothing to publish", item.name);
                return Ok(PublishOutcome {
                    plan: VersionPlan {
                        current: item.version.clone(),
                        next: item.version.clone(),
                        change: ChangeType::Manual,
                        has_changes: false,
                    },
                    pull_request: None,
                    files_published: 0,
                });
            }
            plan_version(&item.version, &diff, opts.version_override.as_deref())?
        }
        None => {
            // First publish releases the manifest's declared version as-is
            // unless an explicit override is given.
            let diff = diff_snapshots(&Snapshot::new(), &snapshot);
            let first = opts
                .version_override
                .clone()
                .unwrap_or_else(|| item.version.clone());
            plan_version(&item.version, &diff, Some(&first))?
        }
    };

    if opts.dry_run {
        info!(
            "[dry-run] would publish {namespace}/{} as {} ({} bump)",
            item.name, plan.next, plan.change
        );
        return Ok(PublishOutcome {
            plan,
            pull_request: None,
            files_published: 0,
        });
    }

    let published = gh.list_component_versions(namespace, &item.name).await?;
    if published.iter().any(|v| v == &plan.next) {
        return Err(Error::Validation(format!(
            "version {} of {namespace}/{} is already published",
            plan.next, item.name
        )));
    }

    let user = gh.whoami().await?;
    item.version = plan.next.clone();
    item.published_at = Some(Utc::now());
    item.publisher = user.login;

    let branch = format!("publish/{namespace}-{}-{}", item.name, plan.next);
    let base_sha = gh.branch_sha(BASE_BRANCH).await?;
    gh.create_branch(&branch, &base_sha).await?;

    let prefix = format!("{namespace}/{}/{}", item.name, plan.next);
    let message = format!("Publish {namespace}/{}@{}", item.name, plan.next);

    let manifest_json = serde_json::to_string_pretty(&item)?;
    gh.put_file(&branch, &format!("{prefix}/{MANIFEST_FILE}"), &manifest_json, &message)
        .await?;
    let mut files_published = 1;

    for entry in &item.files {
        let file_content = match &entry.content {
            Some(inline) => inline.clone(),
            None => fs::read_to_string(component_dir.join(&entry.path))?,
        };
        gh.put_file(&branch, &format!("{prefix}/{}", entry.path), &file_content, &message)
            .await?;
        files_published += 1;
    }

    let readme = component_dir.join("README.md");
    if readme.is_file() {
        let readme_content = fs::read_to_string(&readme)?;
        gh.put_file(&branch, &format!("{prefix}/README.md"), &readme_content, &message)
            .await?;
        files_published += 1;
    }

    let pull_request = gh
        .open_pull_request(&PullRequestSpec {
            title: message,
            head: branch,
            base: BASE_BRANCH.to_string(),
            body: pr_body(namespace, &item, &plan),
        })
        .await?;

    store.insert(&dir_key, snapshot);
    if let Err(e) = store.save(store_path) {
        warn!("Failed to persist publish snapshot for {}: {e}", item.name);
    }

    Ok(PublishOutcome {
        plan,
        pull_request: Some(pull_request),
        files_published,
    })
}

/// Markdown body for the release pull request.
fn pr_body(namespace: &str, item: &RegistryItem, plan: &VersionPlan) -> String {
    let mut body = format!("## {namespace}/{}\n\n", item.name);
    if !item.description.is_empty() {
        body.push_str(&item.description);
        body.push_str("\n\n");
    }
    body.push_str(&format!(
        "- Version: `{}` ({} bump from `{}`)\n",
        plan.next, plan.change, plan.current
    ));
    body.push_str(&format!("- Kind: `{}`\n", item.kind.as_str()));
    body.push_str(&format!("- Files: {}\n", item.files.len()));
    if !item.registry_dependencies.is_empty() {
        body.push_str(&format!(
            "- Registry dependencies: {}\n",
            item.registry_dependencies.join(", ")
        ));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gh(server: &mockito::Server) -> GithubClient {
        GithubClient::with_api_base(
            reqwest::Client::new(),
            "gho_test",
            "scm-registry",
            "components",
            &server.url(),
        )
    }

    fn dir_key(dir: &Path) -> String {
        dir.file_name().unwrap().to_str().unwrap().to_string()
    }

    fn write_component(dir: &Path, version: &str) {
        fs::write(
            dir.join("registry.json"),
            serde_json::json!({
                "name": "fancy-badge",
                "type": "ui",
                "version": version,
                "files": [{"path": "fancy-badge.tsx", "type": "ui"}]
            })
            .to_string(),
        )
        .unwrap();
        fs::write(dir.join("fancy-badge.tsx"), "export const Badge = 1;").unwrap();
    }

    #[tokio::test]
    async fn test_dry_run_first_publish_uses_manifest_version() {
        let component = TempDir::new().unwrap();
        let store = TempDir::new().unwrap();
        write_component(component.path(), "1.0.0");

        let server = mockito::Server::new_async().await;
        let opts = PublishOptions {
            dry_run: true,
            ..Default::default()
        };
        let outcome = publish_component(
            &gh(&server),
            "acme",
            component.path(),
            &store.path().join("hashes.json"),
            &opts,
        )
        .await
        .unwrap();

        assert_eq!(outcome.plan.next, "1.0.0");
        assert_eq!(outcome.plan.change, ChangeType::Manual);
        assert!(outcome.pull_request.is_none());
    }

    #[tokio::test]
    async fn test_no_changes_is_a_no_op() {
        let component = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let store_path = store_dir.path().join("hashes.json");
        write_component(component.path(), "1.2.0");

        // Seed the store with the current fingerprint.
        let mut store = SnapshotStore::default();
        store.insert(
            &dir_key(component.path()),
            compute_snapshot(component.path()).unwrap(),
        );
        store.save(&store_path).unwrap();

        let server = mockito::Server::new_async().await;
        let outcome = publish_component(
            &gh(&server),
            "acme",
            component.path(),
            &store_path,
            &PublishOptions::default(),
        )
        .await
        .unwrap();

        assert!(!outcome.plan.has_changes);
        assert_eq!(outcome.plan.next, "1.2.0");
        assert!(outcome.pull_request.is_none());
        assert_eq!(outcome.files_published, 0);
    }

    #[tokio::test]
    async fn test_new_source_file_plans_minor_bump() {
        let component = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let store_path = store_dir.path().join("hashes.json");
        write_component(component.path(), "1.2.0");

        let mut store = SnapshotStore::default();
        store.insert(
            &dir_key(component.path()),
            compute_snapshot(component.path()).unwrap(),
        );
        store.save(&store_path).unwrap();

        // A new code file appears after the stored snapshot.
        fs::write(component.path().join("use-badge.ts"), "export {};").unwrap();

        let server = mockito::Server::new_async().await;
        let opts = PublishOptions {
            dry_run: true,
            ..Default::default()
        };
        let outcome = publish_component(
            &gh(&server),
            "acme",
            component.path(),
            &store_path,
            &opts,
        )
        .await
        .unwrap();

        assert_eq!(outcome.plan.change, ChangeType::Minor);
        assert_eq!(outcome.plan.next, "1.3.0");
    }

    #[tokio::test]
    async fn test_full_publish_opens_pull_request() {
        let component = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let store_path = store_dir.path().join("hashes.json");
        write_component(component.path(), "1.0.0");

        let mut server = mockito::Server::new_async().await;
        let repo = "/repos/scm-registry/components";
        let branch = "publish/acme-fancy-badge-1.0.0";

        let _versions = server
            .mock("GET", format!("{repo}/contents/acme/fancy-badge").as_str())
            .with_status(404)
            .create_async()
            .await;
        let _user = server
            .mock("GET", "/user")
            .with_status(200)
            .with_body(r#"{"login": "octocat"}"#)
            .create_async()
            .await;
        let _base = server
            .mock("GET", format!("{repo}/git/ref/heads/main").as_str())
            .with_status(200)
            .with_body(r#"{"object": {"sha": "base123"}}"#)
            .create_async()
            .await;
        let _branch = server
            .mock("POST", format!("{repo}/git/refs").as_str())
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;
        let _probe_manifest = server
            .mock(
                "GET",
                format!("{repo}/contents/acme/fancy-badge/1.0.0/registry.json?ref={branch}")
                    .as_str(),
            )
            .with_status(404)
            .create_async()
            .await;
        let put_manifest = server
            .mock(
                "PUT",
                format!("{repo}/contents/acme/fancy-badge/1.0.0/registry.json").as_str(),
            )
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;
        let _probe_file = server
            .mock(
                "GET",
                format!("{repo}/contents/acme/fancy-badge/1.0.0/fancy-badge.tsx?ref={branch}")
                    .as_str(),
            )
            .with_status(404)
            .create_async()
            .await;
        let put_file = server
            .mock(
                "PUT",
                format!("{repo}/contents/acme/fancy-badge/1.0.0/fancy-badge.tsx").as_str(),
            )
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;
        let _pr = server
            .mock("POST", format!("{repo}/pulls").as_str())
            .with_status(201)
            .with_body(r#"{"number": 42, "html_url": "https://example.com/pr/42"}"#)
            .create_async()
            .await;

        let outcome = publish_component(
            &gh(&server),
            "acme",
            component.path(),
            &store_path,
            &PublishOptions::default(),
        )
        .await
        .unwrap();

        put_manifest.assert_async().await;
        put_file.assert_async().await;
        assert_eq!(outcome.pull_request.unwrap().number, 42);
        assert_eq!(outcome.files_published, 2);

        // The fingerprint was persisted under the directory key.
        let store = SnapshotStore::load(&store_path);
        assert!(store.get(&dir_key(component.path())).is_some());
        assert!(store.get("fancy-badge").is_none());
    }

    #[tokio::test]
    async fn test_snapshot_keyed_by_directory_not_manifest_name() {
        let component = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let store_path = store_dir.path().join("hashes.json");
        write_component(component.path(), "1.2.0");

        // A baseline stored under the manifest name must not be picked
        // up; only the directory key counts.
        let mut store = SnapshotStore::default();
        store.insert(
            "fancy-badge",
            compute_snapshot(component.path()).unwrap(),
        );
        store.save(&store_path).unwrap();

        let server = mockito::Server::new_async().await;
        let opts = PublishOptions {
            dry_run: true,
            ..Default::default()
        };
        let outcome = publish_component(
            &gh(&server),
            "acme",
            component.path(),
            &store_path,
            &opts,
        )
        .await
        .unwrap();

        // No baseline under the directory key: this is a first publish,
        // not a no-op.
        assert!(outcome.plan.has_changes);
        assert_eq!(outcome.plan.next, "1.2.0");
        assert_eq!(outcome.plan.change, ChangeType::Manual);
    }

    #[tokio::test]
    async fn test_already_published_version_rejected() {
        let component = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        write_component(component.path(), "1.0.0");

        let mut server = mockito::Server::new_async().await;
        let _versions = server
            .mock("GET", "/repos/scm-registry/components/contents/acme/fancy-badge")
            .with_status(200)
            .with_body(r#"[{"name": "1.0.0", "type": "dir"}]"#)
            .create_async()
            .await;

        let result = publish_component(
            &gh(&server),
            "acme",
            component.path(),
            &store_dir.path().join("hashes.json"),
            &PublishOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_manifest_is_not_found() {
        let component = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let server = mockito::Server::new_async().await;

        let result = publish_component(
            &gh(&server),
            "acme",
            component.path(),
            &store_dir.path().join("hashes.json"),
            &PublishOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
