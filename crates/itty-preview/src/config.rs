//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::Context;

use crate::crawler::DEFAULT_METADATA_BOTS;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Directory holding the prebuilt client app (`index.html` and assets).
    pub docs_dir: PathBuf,

    /// User-agent substrings that identify link-preview crawlers.
    pub metadata_bots: Vec<String>,

    /// User-agent substrings that are refused with 401.
    pub blocked_agents: Vec<String>,

    /// Whether to emit a tracing span per request.
    pub request_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            docs_dir: PathBuf::from("docs"),
            metadata_bots: DEFAULT_METADATA_BOTS.iter().map(|s| s.to_string()).collect(),
            blocked_agents: Vec::new(),
            request_log: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: Listen port on all interfaces (default: 8080)
    /// - `ITTY_BIND_ADDR`: Full bind address, takes precedence over `PORT`
    /// - `DOCS_DIR`: Client app directory (default: "docs")
    /// - `METADATA_BOTS`: Comma-separated crawler user-agent substrings
    ///   (default: [`DEFAULT_METADATA_BOTS`])
    /// - `UA_ARRAY`: Comma-separated user-agent substrings to refuse
    /// - `REQUEST_LOG`: Set to "silent" to disable request spans
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = match std::env::var("ITTY_BIND_ADDR") {
            Ok(addr) if !addr.trim().is_empty() => addr.trim().to_string(),
            _ => match std::env::var("PORT") {
                Ok(port) => {
                    let port: u16 = port
                        .trim()
                        .parse()
                        .with_context(|| format!("invalid PORT value: {port:?}"))?;
                    format!("0.0.0.0:{port}")
                }
                Err(_) => defaults.bind_addr,
            },
        };

        let docs_dir = std::env::var("DOCS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.docs_dir);

        let metadata_bots = match std::env::var("METADATA_BOTS") {
            Ok(list) => parse_list(&list),
            Err(_) => defaults.metadata_bots,
        };

        let blocked_agents = parse_list(&std::env::var("UA_ARRAY").unwrap_or_default());

        let request_log = std::env::var("REQUEST_LOG").as_deref() != Ok("silent");

        tracing::info!(
            bind_addr = %bind_addr,
            docs_dir = %docs_dir.display(),
            metadata_bots = metadata_bots.len(),
            blocked_agents = blocked_agents.len(),
            request_log,
            "preview configuration loaded"
        );

        Ok(Self {
            bind_addr,
            docs_dir,
            metadata_bots,
            blocked_agents,
            request_log,
        })
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
