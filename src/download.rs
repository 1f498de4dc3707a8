//! Fetching service list and provider directory documents
//!
//! The parsers only ever see text; this module turns a URL or a local file
//! (plain or gzip-compressed) into that text.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use flate2::read::GzDecoder;
use log::{debug, info, warn};

use crate::error::{CatalogueError, Result};

/// Download configuration
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum attempts
    pub max_retries: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds
    pub read_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 2000,
            connect_timeout_secs: 30,
            read_timeout_secs: 120,
            user_agent: concat!("dvbi-catalogue/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

fn create_agent(config: &DownloadConfig) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(config.read_timeout_secs)))
        .timeout_connect(Some(Duration::from_secs(config.connect_timeout_secs)))
        .max_idle_connections(2)
        .max_idle_connections_per_host(1)
        .build()
        .new_agent()
}

/// GET `url` with retry and return the decoded document text
pub fn fetch_document(url: &str, config: &DownloadConfig) -> Result<String> {
    let agent = create_agent(config);
    let mut attempts = 0;

    loop {
        attempts += 1;

        match try_fetch(&agent, url, config) {
            Ok(body) => {
                info!("Fetched {} ({} bytes)", url, body.len());
                return decode_payload(body);
            }
            Err(e) => {
                if attempts >= config.max_retries.max(1) {
                    return Err(CatalogueError::Download(format!(
                        "{} failed after {} attempts: {}",
                        url, attempts, e
                    )));
                }
                warn!("Fetching {} failed (attempt {}): {}", url, attempts, e);
                std::thread::sleep(Duration::from_millis(config.retry_delay_ms));
            }
        }
    }
}

fn try_fetch(agent: &ureq::Agent, url: &str, config: &DownloadConfig) -> std::result::Result<Vec<u8>, String> {
    let response = agent
        .get(url)
        .header("User-Agent", &config.user_agent)
        .call()
        .map_err(|e| format!("Request failed: {}", e))?;

    let status = response.status();
    if status != 200 {
        return Err(format!("HTTP error: {}", status));
    }

    let mut body = Vec::new();
    response
        .into_body()
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|e| format!("Read failed: {}", e))?;
    Ok(body)
}

/// Read a local document; gzip is detected from the `1f 8b` magic bytes
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    debug!("Read {} ({} bytes)", path.display(), bytes.len());
    decode_payload(bytes)
}

/// Fetch `source` when it is an http(s) URL, otherwise read it from disk
pub fn load_document(source: &str, config: &DownloadConfig) -> Result<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_document(source, config)
    } else {
        read_document(Path::new(source))
    }
}

fn decode_payload(bytes: Vec<u8>) -> Result<String> {
    let text = if bytes.starts_with(&[0x1f, 0x8b]) {
        let mut text = String::new();
        GzDecoder::new(bytes.as_slice()).read_to_string(&mut text)?;
        text
    } else {
        String::from_utf8(bytes)
            .map_err(|e| CatalogueError::Download(format!("Document is not UTF-8: {}", e)))?
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}
