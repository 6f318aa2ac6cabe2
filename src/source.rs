use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;
use url::Url;

use crate::domain::{LogEntry, LogPayload};

// The logs API rejects generic client user agents.
const USER_AGENT: &str = concat!("whatblocks/", env!("CARGO_PKG_VERSION"));
const LOG_LIMIT: &str = "1000";

/// Blocked-query log endpoint for a profile.
pub fn logs_url(api_base: &str, profile_id: &str) -> Result<Url> {
    let mut url = Url::parse(api_base).with_context(|| format!("Invalid API base '{}'", api_base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("API base '{}' cannot take a path", api_base))?
        .pop_if_empty()
        .extend(["profiles", profile_id, "logs"]);
    url.query_pairs_mut()
        .append_pair("status", "blocked")
        .append_pair("limit", LOG_LIMIT);
    Ok(url)
}

/// Downloads the raw blocked-query log payload.
pub fn fetch_profile_logs(api_base: &str, api_key: &str, profile_id: &str) -> Result<String> {
    let start_time = Instant::now();
    let url = logs_url(api_base, profile_id)?;
    info!(action = "start", component = "log_fetch", profile_id, url = %url, "Downloading logs");

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url.clone())
        .header("X-Api-Key", api_key)
        .send()
        .with_context(|| format!("Request to {} failed", url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("HTTP {} for {}", status.as_u16(), url);
    }

    let body = response
        .text()
        .with_context(|| format!("Failed to read response from {}", url))?;

    info!(action = "complete", component = "log_fetch", bytes = body.len(), duration_ms = start_time.elapsed().as_millis(), "Logs downloaded");
    Ok(body)
}

pub fn parse_payload(body: &str) -> Result<Vec<LogEntry>> {
    let payload: LogPayload =
        serde_json::from_str(body).context("Log payload does not match the expected shape")?;
    Ok(payload.into_entries())
}

pub fn load_log_file(path: &Path) -> Result<Vec<LogEntry>> {
    info!(action = "load", component = "log_file", file_path = ?path, "Loading logs from file");
    let body =
        fs::read_to_string(path).with_context(|| format!("Failed to read log file {:?}", path))?;
    parse_payload(&body).with_context(|| format!("Invalid log file {:?}", path))
}

/// Writes the raw payload to `<profile_id>-<unix timestamp>.json` in `dir`.
pub fn keep_payload(dir: &Path, profile_id: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{}-{}.json", profile_id, Utc::now().timestamp()));
    fs::write(&path, body).with_context(|| format!("Failed to write {:?}", path))?;
    info!(action = "saved", component = "log_payload", file_path = ?path, "Wrote raw payload");
    Ok(path)
}
