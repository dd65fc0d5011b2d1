//! Store configuration and environment variable handling.

use std::env;
use std::fmt;

/// Environment variable holding the store access credential.
pub const SECRET_ENV: &str = "STORE_SECRET";

/// Environment variable holding the remote store base URL.
pub const URL_ENV: &str = "STORE_URL";

/// Store connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Access credential sent with every store request
    pub secret: String,
    /// Base URL of the remote store (unused by the local backend)
    pub url: Option<String>,
}

impl StoreConfig {
    pub fn new(secret: impl Into<String>, url: Option<String>) -> Self {
        Self {
            secret: secret.into(),
            url,
        }
    }

    /// Load the store configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_SECRET` (required): access credential for the document store
    /// - `STORE_URL` (optional): base URL of the remote store
    ///
    /// # Errors
    /// Returns an error if the credential is not set or is empty.
    pub fn from_env() -> Result<Self, String> {
        let secret = env::var(SECRET_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                format!(
                    "The {} environment variable must be set to your document store access key",
                    SECRET_ENV
                )
            })?;
        let url = env::var(URL_ENV).ok().filter(|s| !s.trim().is_empty());

        Ok(Self { secret, url })
    }
}

// Keeps the credential out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("secret", &"<redacted>")
            .field("url", &self.url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = StoreConfig::new("s3cr3t", Some("http://localhost:8443".into()));
        let printed = format!("{:?}", config);
        assert!(!printed.contains("s3cr3t"));
        assert!(printed.contains("localhost:8443"));
    }
}
