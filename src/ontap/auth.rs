//! ONTAP Authentication
//!
//! Resolves the cluster address and basic-auth credentials from the
//! environment. Passwords are only ever read from the environment or the
//! command line, never from the configuration file.

use anyhow::{bail, Result};
use std::fmt;

/// Environment variable holding the cluster management address
pub const HOST_ENV: &str = "ONTAP_HOST";
/// Environment variable holding the API user
pub const USERNAME_ENV: &str = "ONTAP_USERNAME";
/// Environment variable holding the API password
pub const PASSWORD_ENV: &str = "ONTAP_PASSWORD";

/// Basic-auth credentials for the cluster REST API
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Result<Self> {
        if username.is_empty() {
            bail!("ONTAP username is empty");
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Build credentials for `username`, taking the password from the
    /// explicit value or `ONTAP_PASSWORD`
    pub fn resolve(username: &str, password: Option<&str>) -> Result<Self> {
        let password = match password {
            Some(p) => p.to_string(),
            None => match std::env::var(PASSWORD_ENV) {
                Ok(p) => p,
                Err(_) => bail!(
                    "No ONTAP password available. Set {} or pass --password",
                    PASSWORD_ENV
                ),
            },
        };
        Self::new(username, &password)
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// Never print the password, not even in debug logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Validate a cluster address: a hostname, an IPv4/IPv6 literal, optionally
/// with a port, or a full `http(s)://` URL
pub fn validate_host(host: &str) -> bool {
    if host.is_empty() || host.len() > 255 {
        return false;
    }
    if host.starts_with("https://") || host.starts_with("http://") {
        return url::Url::parse(host).is_ok();
    }

    // Bracketed IPv6 literal, e.g. [fd20::1]:443
    if host.starts_with('[') {
        return url::Url::parse(&format!("https://{}", host)).is_ok();
    }

    host.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == ':' || c == '_')
}

/// Read the cluster address from the environment
/// Security: Validates the value before returning it
pub fn get_default_host() -> Option<String> {
    let host = std::env::var(HOST_ENV).ok()?;
    if validate_host(&host) {
        return Some(host);
    }
    tracing::warn!("Invalid cluster address format in {}", HOST_ENV);
    None
}

/// Read the API user from the environment
pub fn get_default_username() -> Option<String> {
    std::env::var(USERNAME_ENV).ok().filter(|u| !u.is_empty())
}
