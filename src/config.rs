use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_NETRC_HOST: &str = "github.com";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Immutable settings handed to the tag creator.
///
/// Every field has a default, so an empty YAML document (or
/// [`Config::default`]) targets github.com with the standard environment
/// variables and `~/.netrc`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// Forge API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root of the REST API (e.g. `https://ghe.corp.example.com/api/v3`).
    pub api_url: String,
    /// Per-request timeout in seconds.  Applies to each of the two calls.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// `Accept` header sent with every request.
    pub accept: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            accept: "application/vnd.github.v3+json".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// API root without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Checks every HTTP client construction relies on.
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".to_string());
        }
        if !(self.api_url.starts_with("https://") || self.api_url.starts_with("http://")) {
            return Err(format!("api_url must be an http(s) URL, got {:?}", self.api_url));
        }
        Ok(())
    }
}

fn default_user_agent() -> String {
    format!("forgetag/{}", env!("CARGO_PKG_VERSION"))
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Name of the environment variable holding the API user.
    pub user_env: String,
    /// Name of the environment variable holding the password or token.
    pub password_env: String,
    /// Credential file to fall back to.  `None` means `~/.netrc`.
    pub netrc_path: Option<PathBuf>,
    /// Host whose netrc entry supplies the fallback credentials.
    pub netrc_host: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            user_env: "GITHUB_USER".to_string(),
            password_env: "GITHUB_PASS".to_string(),
            netrc_path: None,
            netrc_host: DEFAULT_NETRC_HOST.to_string(),
        }
    }
}

impl CredentialsConfig {
    /// The credential file to read, or `None` when no home directory is known.
    pub fn resolved_netrc_path(&self) -> Option<PathBuf> {
        self.netrc_path
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".netrc")))
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Load and validate a [`Config`] from a YAML file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config = parse_config(&contents)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Parse and validate a YAML document.  An empty document yields the defaults.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = if contents.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(contents)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Basic sanity checks that cannot be expressed purely with serde.
pub fn validate_config(config: &Config) -> Result<()> {
    config.api.check().map_err(anyhow::Error::msg)?;
    anyhow::ensure!(
        !config.credentials.user_env.is_empty() && !config.credentials.password_env.is_empty(),
        "credential environment variable names must not be empty"
    );
    anyhow::ensure!(
        !config.credentials.netrc_host.is_empty(),
        "netrc_host must not be empty"
    );
    Ok(())
}
