use std::fmt;

use tracing::{debug, instrument};

use super::netrc::Netrc;
use crate::config::CredentialsConfig;
use crate::error::TagError;

/// Basic-auth credentials for the forge API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Where a resolved credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Netrc,
}

/// Resolve credentials from the process environment, falling back to netrc.
pub fn resolve_credentials(config: &CredentialsConfig) -> Result<Credentials, TagError> {
    resolve_credentials_with(config, |name| std::env::var(name).ok())
        .map(|(credentials, _)| credentials)
}

/// Resolve credentials using `env` to look up environment variables.
///
/// Both variables must be present and non-empty for the environment to win;
/// in that case the netrc file is never opened.
#[instrument(skip(config, env), fields(host = %config.netrc_host))]
pub fn resolve_credentials_with<F>(
    config: &CredentialsConfig,
    env: F,
) -> Result<(Credentials, CredentialSource), TagError>
where
    F: Fn(&str) -> Option<String>,
{
    let user = env(&config.user_env).filter(|v| !v.is_empty());
    let secret = env(&config.password_env).filter(|v| !v.is_empty());

    if let (Some(user), Some(secret)) = (user, secret) {
        debug!(user_env = %config.user_env, "using credentials from environment");
        return Ok((Credentials { user, secret }, CredentialSource::Environment));
    }

    let credentials = from_netrc(config)?;
    Ok((credentials, CredentialSource::Netrc))
}

fn from_netrc(config: &CredentialsConfig) -> Result<Credentials, TagError> {
    let path = config.resolved_netrc_path().ok_or_else(|| {
        TagError::credentials_not_found(format!(
            "{} and {} are not set and no home directory is available for .netrc",
            config.user_env, config.password_env
        ))
    })?;

    let netrc = Netrc::from_file(&path).map_err(|e| {
        TagError::credentials_not_found(format!(
            "{} and {} are not set and {e}",
            config.user_env, config.password_env
        ))
    })?;

    let host = config.netrc_host.as_str();
    let entry = netrc.authenticators(host).ok_or_else(|| {
        TagError::credentials_not_found(format!(
            "no entry for {host} in {}",
            path.display()
        ))
    })?;

    if entry.login.is_empty() {
        return Err(TagError::credentials_not_found(format!(
            "netrc entry for {host} in {} has no login",
            path.display()
        )));
    }
    let secret = entry.password.clone().ok_or_else(|| {
        TagError::credentials_not_found(format!(
            "netrc entry for {host} in {} has no password",
            path.display()
        ))
    })?;

    debug!(path = %path.display(), host, "using credentials from netrc");
    Ok(Credentials {
        user: entry.login.clone(),
        secret,
    })
}
