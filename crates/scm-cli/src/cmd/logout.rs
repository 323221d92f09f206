//! Logout command.

use anyhow::Result;

use scm_core::config::Config;

use crate::ui::Output;

pub fn logout() -> Result<()> {
    let output = Output::new();
    let config_path = scm_core::config_path();
    let mut config = Config::load(&config_path);

    if !config.is_logged_in() {
        output.info("Not logged in.");
        return Ok(());
    }

    config.clear_credentials();
    config.save(&config_path)?;
    output.success("Logged out.");
    Ok(())
}
