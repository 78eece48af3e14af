//! Connection settings for a network directory.
//!
//! Usually read from a TOML file:
//!
//! ```toml
//! host = "ldap.example.com"
//! port = 636
//! use_tls = true
//! bind_dn = "cn=admin,dc=example,dc=com"
//! bind_password = "secret"
//! base_dn = "dc=example,dc=com"
//! ```

use crate::error::{DirectoryError, DirectoryResult};
use lpa_types::Dn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Settings used to open sessions against an LDAP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub host: String,
    pub port: u16,
    /// Connect with `ldaps://`.
    pub use_tls: bool,
    /// Upgrade a plain connection with StartTLS.
    pub use_starttls: bool,
    /// Simple-bind identity. Anonymous when unset.
    pub bind_dn: Option<String>,
    pub bind_password: Option<String>,
    /// Root of the subtree this application works in.
    pub base_dn: String,
    pub connect_timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 389,
            use_tls: false,
            use_starttls: false,
            bind_dn: None,
            bind_password: None,
            base_dn: "dc=example,dc=com".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl DirectoryConfig {
    /// Parses settings from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> DirectoryResult<Self> {
        let config: DirectoryConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads settings from a TOML file.
    pub fn load(path: &Path) -> DirectoryResult<Self> {
        let text = std::fs::read_to_string(path)?;
        debug!("Loaded directory config from {:?}", path);
        Self::from_toml_str(&text)
    }

    /// The server URL, e.g. `ldap://localhost:389`.
    pub fn url(&self) -> String {
        let scheme = if self.use_tls { "ldaps" } else { "ldap" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    /// The parsed base DN.
    pub fn base(&self) -> DirectoryResult<Dn> {
        Ok(Dn::parse(&self.base_dn)?)
    }

    /// Checks the settings for combinations no server would accept.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.host.trim().is_empty() {
            return Err(DirectoryError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(DirectoryError::Config("port must not be 0".to_string()));
        }
        if self.use_tls && self.use_starttls {
            return Err(DirectoryError::Config(
                "use_tls and use_starttls are mutually exclusive".to_string(),
            ));
        }
        if self.bind_password.is_some() && self.bind_dn.is_none() {
            return Err(DirectoryError::Config(
                "bind_password is set without bind_dn".to_string(),
            ));
        }
        if let Some(bind_dn) = &self.bind_dn {
            Dn::parse(bind_dn)?;
        }
        self.base()?;
        Ok(())
    }
}
