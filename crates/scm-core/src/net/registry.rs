//! Read-only registry transport over raw HTTPS.
//!
//! The registry is just files in a git repository: per-component
//! metadata at `{base}/{namespace}/{name}/{version}/registry.json`,
//! files next to it, and a flat JSON array index for search/listing.

use scm_schema::{ComponentId, RegistryIndexEntry, RegistryItem};

use crate::error::{Error, Result};
use crate::net::with_retry;
use crate::USER_AGENT;

/// Default public registry base URL.
pub const DEFAULT_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/scm-registry/components/main";

/// Reject URLs that are not HTTPS.
///
/// Plain HTTP is tolerated only for loopback hosts so the client can be
/// exercised against a local test server.
pub fn ensure_secure_url(url: &str) -> Result<()> {
    if url.starts_with("https://") {
        return Ok(());
    }
    if url.starts_with("http://127.0.0.1") || url.starts_with("http://localhost") {
        return Ok(());
    }
    Err(Error::InsecureUrl(url.to_string()))
}

/// Client for the static-file registry host.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    /// Build a client against `base_url` (no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsecureUrl`] if the base is not HTTPS.
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self> {
        ensure_secure_url(base_url)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Metadata URL for one published component version.
    pub fn item_url(&self, id: &ComponentId, version: &str) -> String {
        format!(
            "{}/{}/{}/{}/registry.json",
            self.base_url,
            id.namespace(),
            id.name(),
            version
        )
    }

    /// URL of a single file within a published version.
    pub fn file_url(&self, id: &ComponentId, version: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.base_url,
            id.namespace(),
            id.name(),
            version,
            path
        )
    }

    /// URL of a published version's README.
    pub fn readme_url(&self, id: &ComponentId, version: &str) -> String {
        self.file_url(id, version, "README.md")
    }

    /// URL of the registry-wide flat index.
    pub fn index_url(&self) -> String {
        format!("{}/index.json", self.base_url)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        ensure_secure_url(url)?;
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        match resp.status() {
            s if s == reqwest::StatusCode::NOT_FOUND => Err(Error::NotFound(url.to_string())),
            s if s == reqwest::StatusCode::UNAUTHORIZED || s == reqwest::StatusCode::FORBIDDEN => {
                Err(Error::Auth(format!("registry returned {s} for {url}")))
            }
            _ => Ok(resp.error_for_status()?),
        }
    }

    /// Fetch and validate one component's metadata.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the version does not exist; manifest
    /// validation errors if the published document is malformed.
    pub async fn fetch_item(&self, id: &ComponentId, version: &str) -> Result<RegistryItem> {
        let url = self.item_url(id, version);
        let item: RegistryItem = with_retry("fetch component metadata", || async {
            Ok(self.get(&url).await?.json().await?)
        })
        .await?;

        item.validate()?;
        Ok(item)
    }

    /// Fetch the registry-wide flat index.
    pub async fn fetch_index(&self) -> Result<Vec<RegistryIndexEntry>> {
        let url = self.index_url();
        with_retry("fetch registry index", || async {
            Ok(self.get(&url).await?.json().await?)
        })
        .await
    }

    /// Fetch the raw content of one file in a published version.
    pub async fn fetch_file(&self, id: &ComponentId, version: &str, path: &str) -> Result<String> {
        let url = self.file_url(id, version, path);
        with_retry("fetch component file", || async {
            Ok(self.get(&url).await?.text().await?)
        })
        .await
    }

    /// Fetch a published version's README, if present.
    pub async fn fetch_readme(&self, id: &ComponentId, version: &str) -> Result<String> {
        let url = self.readme_url(id, version);
        with_retry("fetch component readme", || async {
            Ok(self.get(&url).await?.text().await?)
        })
        .await
    }
}
