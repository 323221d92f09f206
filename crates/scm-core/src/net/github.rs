//! Authenticated GitHub REST client for publishing into the registry
//! repository: identity lookup, branch creation, content writes, and
//! pull-request creation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::USER_AGENT;
use crate::error::{Error, Result};
use crate::net::with_retry;

/// Default GitHub REST API base.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// The authenticated user, from `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    /// Account login name.
    pub login: String,
    /// Display name, if set.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentInfo {
    sha: String,
}

/// A created pull request, from `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    /// PR number in the target repository.
    pub number: u64,
    /// Browser URL of the PR.
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
struct DirEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Parameters for opening a pull request.
#[derive(Debug, Clone, Serialize)]
pub struct PullRequestSpec {
    /// PR title.
    pub title: String,
    /// Source branch.
    pub head: String,
    /// Target branch.
    pub base: String,
    /// Markdown body.
    pub body: String,
}

/// Client bound to one registry repository.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
    owner: String,
    repo: String,
}

impl GithubClient {
    /// Build a client for `owner/repo` using a bearer token.
    pub fn new(client: reqwest::Client, token: &str, owner: &str, repo: &str) -> Self {
        Self::with_api_base(client, token, owner, repo, DEFAULT_API_URL)
    }

    /// Same as [`new`](Self::new) with an explicit API base (for tests).
    pub fn with_api_base(
        client: reqwest::Client,
        token: &str,
        owner: &str,
        repo: &str,
        api_base: &str,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    fn repo_url(&self, rest: &str) -> String {
        format!("{}/repos/{}/{}/{rest}", self.api_base, self.owner, self.repo)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
    }

    async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        match resp.status() {
            s if s == reqwest::StatusCode::NOT_FOUND => Err(Error::NotFound(what.to_string())),
            s if s == reqwest::StatusCode::UNAUTHORIZED || s == reqwest::StatusCode::FORBIDDEN => {
                Err(Error::Auth(format!(
                    "GitHub rejected the request ({s}); run 'scm login' to refresh credentials"
                )))
            }
            _ => Ok(resp.error_for_status()?),
        }
    }

    /// Look up the authenticated user. Doubles as token validation.
    pub async fn whoami(&self) -> Result<GithubUser> {
        let url = format!("{}/user", self.api_base);
        with_retry("fetch GitHub identity", || async {
            let resp = self.request(reqwest::Method::GET, &url).send().await?;
            Ok(Self::check(resp, "authenticated user").await?.json().await?)
        })
        .await
    }

    /// SHA of the head commit of `branch`.
    pub async fn branch_sha(&self, branch: &str) -> Result<String> {
        let url = self.repo_url(&format!("git/ref/heads/{branch}"));
        let git_ref: GitRef = with_retry("fetch branch ref", || async {
            let resp = self.request(reqwest::Method::GET, &url).send().await?;
            Ok(Self::check(resp, &format!("branch '{branch}'")).await?.json().await?)
        })
        .await?;
        Ok(git_ref.object.sha)
    }

    /// Create `branch` pointing at `base_sha`.
    pub async fn create_branch(&self, branch: &str, base_sha: &str) -> Result<()> {
        let url = self.repo_url("git/refs");
        let body = json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": base_sha,
        });
        with_retry("create branch", || async {
            let resp = self
                .request(reqwest::Method::POST, &url)
                .json(&body)
                .send()
                .await?;
            Self::check(resp, "base branch").await?;
            Ok(())
        })
        .await
    }

    /// Create or update one file on `branch` via the contents API.
    ///
    /// If the file already exists its blob SHA is fetched first so the
    /// write becomes an update instead of a conflict.
    pub async fn put_file(
        &self,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<()> {
        let existing_sha = self.file_sha(branch, path).await?;

        let url = self.repo_url(&format!("contents/{path}"));
        let mut body = json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
            "branch": branch,
        });
        if let Some(sha) = existing_sha {
            body["sha"] = json!(sha);
        }

        with_retry("write registry file", || async {
            let resp = self
                .request(reqwest::Method::PUT, &url)
                .json(&body)
                .send()
                .await?;
            Self::check(resp, path).await?;
            Ok(())
        })
        .await
    }

    /// Blob SHA of `path` on `branch`, or `None` if absent.
    async fn file_sha(&self, branch: &str, path: &str) -> Result<Option<String>> {
        let url = self.repo_url(&format!("contents/{path}?ref={branch}"));
        let result: Result<ContentInfo> = with_retry("check existing file", || async {
            let resp = self.request(reqwest::Method::GET, &url).send().await?;
            Ok(Self::check(resp, path).await?.json().await?)
        })
        .await;

        match result {
            Ok(info) => Ok(Some(info.sha)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Open a pull request.
    pub async fn open_pull_request(&self, spec: &PullRequestSpec) -> Result<PullRequest> {
        let url = self.repo_url("pulls");
        with_retry("open pull request", || async {
            let resp = self
                .request(reqwest::Method::POST, &url)
                .json(spec)
                .send()
                .await?;
            Ok(Self::check(resp, "pull request target").await?.json().await?)
        })
        .await
    }

    /// Published version directories for one component
    /// (`{namespace}/{name}/<version>/` on the default branch).
    pub async fn list_component_versions(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<String>> {
        let url = self.repo_url(&format!("contents/{namespace}/{name}"));
        let entries: Vec<DirEntry> = match with_retry("list component versions", || async {
            let resp = self.request(reqwest::Method::GET, &url).send().await?;
            Ok(Self::check(resp, &format!("{namespace}/{name}")).await?.json().await?)
        })
        .await
        {
            Ok(entries) => entries,
            Err(Error::NotFound(_)) => return Ok(vec![]),
            Err(e) => return Err(e),
        };

        let mut versions: Vec<(semver::Version, String)> = entries
            .into_iter()
            .filter(|e| e.kind == "dir")
            .filter_map(|e| semver::Version::parse(&e.name).ok().map(|v| (v, e.name)))
            .collect();
        versions.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(versions.into_iter().map(|(_, name)| name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::Server) -> GithubClient {
        GithubClient::with_api_base(
            reqwest::Client::new(),
            "gho_test",
            "scm-registry",
            "components",
            &server.url(),
        )
    }

    #[tokio::test]
    async fn test_whoami() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/user")
            .match_header("authorization", "Bearer gho_test")
            .with_status(200)
            .with_body(r#"{"login": "octocat", "name": "The Octocat"}"#)
            .create_async()
            .await;

        let user = client(&server).whoami().await.unwrap();
        assert_eq!(user.login, "octocat");
    }

    #[tokio::test]
    async fn test_whoami_bad_token_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/user")
            .with_status(401)
            .create_async()
            .await;

        let result = client(&server).whoami().await;
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_branch_sha() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/scm-registry/components/git/ref/heads/main")
            .with_status(200)
            .with_body(r#"{"object": {"sha": "abc123"}}"#)
            .create_async()
            .await;

        let sha = client(&server).branch_sha("main").await.unwrap();
        assert_eq!(sha, "abc123");
    }

    #[tokio::test]
    async fn test_put_file_new_file_omits_sha() {
        let mut server = mockito::Server::new_async().await;
        let _probe = server
            .mock(
                "GET",
                "/repos/scm-registry/components/contents/acme/button/1.0.0/registry.json?ref=publish",
            )
            .with_status(404)
            .create_async()
            .await;
        let put = server
            .mock(
                "PUT",
                "/repos/scm-registry/components/contents/acme/button/1.0.0/registry.json",
            )
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"branch": "publish"}"#.to_string(),
            ))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        client(&server)
            .put_file("publish", "acme/button/1.0.0/registry.json", "{}", "publish")
            .await
            .unwrap();
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_component_versions_sorted() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/scm-registry/components/contents/acme/button")
            .with_status(200)
            .with_body(
                r#"[
                    {"name": "1.10.0", "type": "dir"},
                    {"name": "1.2.0", "type": "dir"},
                    {"name": "README.md", "type": "file"},
                    {"name": "not-a-version", "type": "dir"}
                ]"#,
            )
            .create_async()
            .await;

        let versions = client(&server)
            .list_component_versions("acme", "button")
            .await
            .unwrap();
        assert_eq!(versions, vec!["1.2.0", "1.10.0"]);
    }

    #[tokio::test]
    async fn test_list_versions_missing_component_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/scm-registry/components/contents/acme/ghost")
            .with_status(404)
            .create_async()
            .await;

        let versions = client(&server)
            .list_component_versions("acme", "ghost")
            .await
            .unwrap();
        assert!(versions.is_empty());
    }
}
