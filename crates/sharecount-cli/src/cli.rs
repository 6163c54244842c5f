//! CLI argument definitions for sharecount.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--url` | required | Comma-separated target URLs |
//! | `--platforms` | all | Comma-separated platform filter |
//! | `--proxy` | env | Forward proxy URL |
//! | `--timeout-ms` | `4000` | Per-platform request timeout |
//! | `--strict-tls` | `false` | Verify TLS certificates |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--list-platforms` | `false` | Print the platform table and exit |
//!
//! # Examples
//!
//! ```bash
//! sharecount --url https://example.com/post
//! sharecount --url https://a.example,https://b.example --platforms reddit,buffer --pretty
//! LOG_LEVEL=debug sharecount --url https://example.com --proxy http://127.0.0.1:3128
//! ```

use std::time::Duration;

use clap::Parser;
use sharecount_core::{CollectorConfig, SelectionSet};

use crate::error::CliError;

/// Social share counts for one or more URLs, printed as JSON.
#[derive(Debug, Parser)]
#[command(name = "sharecount", author, version, about)]
pub struct Cli {
    /// Comma-separated URLs to collect share counts for.
    #[arg(long, required_unless_present = "list_platforms")]
    pub url: Option<String>,

    /// Comma-separated platform names; every enabled platform when omitted.
    #[arg(long)]
    pub platforms: Option<String>,

    /// Forward proxy URL. Falls back to SHARECOUNT_PROXY, PROXY and PROXY_MESH.
    #[arg(long)]
    pub proxy: Option<String>,

    /// Per-platform request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Verify TLS certificates of platform endpoints.
    #[arg(long, default_value_t = false)]
    pub strict_tls: bool,

    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Print the built-in platform table as JSON and exit.
    #[arg(long, default_value_t = false)]
    pub list_platforms: bool,
}

impl Cli {
    /// Target URLs in the order given, blanks dropped.
    pub fn urls(&self) -> Result<Vec<String>, CliError> {
        let urls: Vec<String> = self
            .url
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
            .collect();

        if urls.is_empty() {
            return Err(CliError::Validation(String::from(
                "--url must name at least one URL",
            )));
        }
        Ok(urls)
    }

    pub fn selection(&self) -> SelectionSet {
        self.platforms
            .as_deref()
            .map(SelectionSet::parse)
            .unwrap_or_default()
    }

    /// Layers command-line overrides on top of `base`.
    pub fn config(&self, base: CollectorConfig) -> CollectorConfig {
        let mut config = base;
        if let Some(proxy) = &self.proxy {
            config = config.with_proxy(Some(proxy.as_str()));
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_request_timeout(Duration::from_millis(timeout_ms));
        }
        if self.strict_tls {
            config = config.with_accept_invalid_certs(false);
        }
        config
    }
}
