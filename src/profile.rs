//! Outbound profile request issued when the screen mounts.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Endpoint requested on mount unless overridden.
pub const DEFAULT_PROFILE_URL: &str = "https://api.github.com/users/jadensun";

/// Sent on every request; GitHub answers 403 without one.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// GET `url` with no extra headers beyond the user agent and no timeout,
/// then parse the body as JSON.
pub fn fetch_profile(url: &str) -> Result<Value> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(None::<Duration>)
        .build()
        .context("failed to build HTTP client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to request profile from {url}"))?;
    let status = response.status();
    let body = response
        .json::<Value>()
        .with_context(|| format!("profile response ({status}) was not JSON"))?;
    Ok(body)
}

/// Fire the request on a detached thread. The parsed profile is dropped and
/// failures are only logged; nothing on screen depends on either. The
/// handle is returned for tests, the screen itself never joins it.
pub fn spawn_profile_fetch(url: String) -> JoinHandle<()> {
    thread::spawn(move || match fetch_profile(&url) {
        Ok(profile) => {
            let fields = profile.as_object().map_or(0, |o| o.len());
            debug!(url = %url, fields, "profile fetched");
        }
        Err(err) => warn!(url = %url, error = %format!("{err:#}"), "profile fetch failed"),
    })
}
