//! Connection arguments shared by every subcommand.

use crate::api::config::{
    DEFAULT_API_BASE_URL, ENV_API_BASE_URL, ENV_REQUEST_TIMEOUT_SECS, ENV_STATE_FILE,
};
use anyhow::{Context, Result};
use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use std::path::PathBuf;
use std::time::Duration;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_STATE_FILE: &str = "state-file";

#[must_use]
pub fn validator_url() -> ValueParser {
    ValueParser::from(move |raw: &str| -> std::result::Result<String, String> {
        let trimmed = raw.trim();
        match url::Url::parse(trimmed) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
            Ok(url) => Err(format!("unsupported scheme: {}", url.scheme())),
            Err(err) => Err(format!("invalid URL: {err}")),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Marketplace API base URL")
                .env(ENV_API_BASE_URL)
                .default_value(DEFAULT_API_BASE_URL)
                .global(true)
                .value_parser(validator_url()),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env(ENV_REQUEST_TIMEOUT_SECS)
                .default_value("10")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_STATE_FILE)
                .long(ARG_STATE_FILE)
                .help("Session file (default: <config dir>/coursemart/session.json)")
                .env(ENV_STATE_FILE)
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub api_url: String,
    pub timeout: Duration,
    pub state_file: Option<PathBuf>,
}

impl Options {
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let api_url = matches
            .get_one::<String>(ARG_API_URL)
            .cloned()
            .context("missing required argument: --api-url")?;
        let timeout = matches
            .get_one::<u64>(ARG_TIMEOUT)
            .copied()
            .context("missing required argument: --timeout")?;

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout),
            state_file: matches.get_one::<PathBuf>(ARG_STATE_FILE).cloned(),
        })
    }
}
