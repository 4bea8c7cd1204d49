use crate::api::ClientConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Connection settings resolved from global CLI arguments.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub timeout: Duration,
    pub state_file: Option<PathBuf>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String) -> Self {
        let defaults = ClientConfig::default();
        Self {
            api_url,
            timeout: defaults.request_timeout,
            state_file: None,
        }
    }

    /// Environment-derived config with CLI values layered on top.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let base = ClientConfig::load();
        ClientConfig {
            api_base_url: self.api_url.clone(),
            request_timeout: self.timeout,
            state_file: self.state_file.clone().or(base.state_file.clone()),
            ..base
        }
    }
}
