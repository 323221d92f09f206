//! OAuth device-flow login against GitHub.
//!
//! The flow is a bounded wait loop: poll at the server-specified
//! interval, back off further on `slow_down`, stop on terminal errors,
//! and give up once the device code's declared expiry elapses.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;

use crate::USER_AGENT;
use crate::error::{Error, Result};

/// Default OAuth endpoint base.
pub const DEFAULT_OAUTH_URL: &str = "https://github.com";

/// Scopes requested for publishing: repo writes plus identity/email reads.
pub const OAUTH_SCOPES: &str = "repo read:user user:email";

/// Extra delay added to the polling interval on a `slow_down` response.
const SLOW_DOWN_BUMP: Duration = Duration::from_secs(5);

/// Server response to a device-code request.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCode {
    /// Opaque code the client polls with.
    pub device_code: String,
    /// Short code the user types into the verification page.
    pub user_code: String,
    /// Page the user opens to approve the login.
    pub verification_uri: String,
    /// Seconds until the device code expires.
    pub expires_in: u64,
    /// Minimum seconds between polls.
    pub interval: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Device-flow client.
#[derive(Debug, Clone)]
pub struct DeviceFlow {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
}

impl DeviceFlow {
    /// Build a flow for the given OAuth app client id.
    pub fn new(client: reqwest::Client, client_id: &str) -> Self {
        Self::with_base_url(client, client_id, DEFAULT_OAUTH_URL)
    }

    /// Same as [`new`](Self::new) with an explicit endpoint base (for tests).
    pub fn with_base_url(client: reqwest::Client, client_id: &str, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
        }
    }

    /// Request a device code to show the user.
    pub async fn request_device_code(&self) -> Result<DeviceCode> {
        let url = format!("{}/login/device/code", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("client_id", self.client_id.as_str()), ("scope", OAUTH_SCOPES)])
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Poll until the user approves, a terminal error occurs, or the
    /// device code expires. Returns the bearer token.
    pub async fn poll_for_token(&self, device: &DeviceCode) -> Result<String> {
        let url = format!("{}/login/oauth/access_token", self.base_url);
        let deadline = Instant::now() + Duration::from_secs(device.expires_in);
        let mut interval = Duration::from_secs(device.interval);

        loop {
            if Instant::now() >= deadline {
                return Err(Error::Auth(
                    "Device code expired before the login was approved".to_string(),
                ));
            }
            tokio::time::sleep(interval).await;

            let resp: TokenResponse = self
                .client
                .post(&url)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .header(reqwest::header::ACCEPT, "application/json")
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("device_code", device.device_code.as_str()),
                    (
                        "grant_type",
                        "urn:ietf:params:oauth:grant-type:device_code",
                    ),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if let Some(token) = resp.access_token {
                return Ok(token);
            }

            match resp.error.as_deref() {
                Some("authorization_pending") => {
                    debug!("Device authorization pending; polling again in {interval:?}");
                }
                Some("slow_down") => {
                    interval += SLOW_DOWN_BUMP;
                    debug!("Server asked to slow down; new interval {interval:?}");
                }
                Some("expired_token") => {
                    return Err(Error::Auth("Device code expired".to_string()));
                }
                Some("access_denied") => {
                    return Err(Error::Auth("Login was denied by the user".to_string()));
                }
                Some("unsupported_grant_type") => {
                    return Err(Error::Auth(
                        "OAuth app does not support the device flow".to_string(),
                    ));
                }
                Some(other) => {
                    return Err(Error::Auth(format!("Unexpected OAuth error: {other}")));
                }
                None => {
                    return Err(Error::Auth(
                        "OAuth server returned neither a token nor an error".to_string(),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(server: &mockito::Server) -> DeviceFlow {
        DeviceFlow::with_base_url(reqwest::Client::new(), "client123", &server.url())
    }

    fn device(interval: u64, expires_in: u64) -> DeviceCode {
        DeviceCode {
            device_code: "dev123".to_string(),
            user_code: "ABCD-1234".to_string(),
            verification_uri: "https://github.com/login/device".to_string(),
            expires_in,
            interval,
        }
    }

    #[tokio::test]
    async fn test_request_device_code() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/login/device/code")
            .with_status(200)
            .with_body(
                r#"{
                    "device_code": "dev123",
                    "user_code": "ABCD-1234",
                    "verification_uri": "https://github.com/login/device",
                    "expires_in": 900,
                    "interval": 5
                }"#,
            )
            .create_async()
            .await;

        let code = flow(&server).request_device_code().await.unwrap();
        assert_eq!(code.user_code, "ABCD-1234");
        assert_eq!(code.interval, 5);
    }

    #[tokio::test]
    async fn test_poll_returns_token_on_approval() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/login/oauth/access_token")
            .with_status(200)
            .with_body(r#"{"access_token": "gho_winner"}"#)
            .create_async()
            .await;

        let token = flow(&server)
            .poll_for_token(&device(0, 60))
            .await
            .unwrap();
        assert_eq!(token, "gho_winner");
    }

    #[tokio::test]
    async fn test_poll_denied_is_terminal() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/login/oauth/access_token")
            .with_status(200)
            .with_body(r#"{"error": "access_denied"}"#)
            .create_async()
            .await;

        let result = flow(&server).poll_for_token(&device(0, 60)).await;
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_poll_times_out_on_expiry() {
        let server = mockito::Server::new_async().await;
        // expires_in of zero: the deadline has already passed.
        let result = flow(&server).poll_for_token(&device(0, 0)).await;
        assert!(matches!(result, Err(Error::Auth(_))));
    }
}
