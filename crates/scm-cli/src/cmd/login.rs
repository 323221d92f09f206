//! Login command: GitHub device flow.

use anyhow::Result;

use scm_core::config::Config;
use scm_core::net::auth::DeviceFlow;
use scm_core::net::github::GithubClient;

use crate::ui::Output;
use crate::{OAUTH_CLIENT_ID, REGISTRY_OWNER, REGISTRY_REPO};

pub async fn login() -> Result<()> {
    let output = Output::new();
    let config_path = scm_core::config_path();
    let mut config = Config::load(&config_path);

    if let Some(username) = &config.username {
        output.info(&format!("Currently logged in as {username}; re-authenticating."));
    }

    let client = reqwest::Client::new();
    let flow = DeviceFlow::new(client.clone(), OAUTH_CLIENT_ID);
    let code = flow.request_device_code().await?;

    output.info(&format!("Open {}", code.verification_uri));
    output.info(&format!("and enter the code: {}", code.user_code));
    output.info("Waiting for approval...");

    let token = flow.poll_for_token(&code).await?;

    // Validate the token and learn who it belongs to.
    let gh = GithubClient::new(client, &token, REGISTRY_OWNER, REGISTRY_REPO);
    let user = gh.whoami().await?;

    config.token = Some(token);
    config.username = Some(user.login.clone());
    config.save(&config_path)?;

    output.success(&format!("Logged in as {}", user.login));
    Ok(())
}
