//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`OidcConfig`](supersaas_connector_access::OidcConfig) for
//! identity-provider configuration.

use axum_extra::extract::cookie::Key;
use serde::Deserialize;
use supersaas_connector_access::OidcConfig;

use crate::auth::routes::CALLBACK_PATH;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default)]
    pub listen: ListenConfig,

    /// Externally visible base URL of the connector.
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Where the browser is sent when authentication or provisioning fails.
    #[serde(default = "default_error_redirect_url")]
    pub error_redirect_url: String,

    /// Session cookie configuration.
    pub session: SessionConfig,

    /// OIDC identity-provider configuration.
    #[serde(default)]
    pub oidc: OidcConfig,

    /// SuperSaaS API configuration.
    pub supersaas: SuperSaasConfig,
}

/// Network listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Session-cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Signing-key material for the session cookie. At least 32 bytes.
    pub secret: String,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP
    /// development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

/// SuperSaaS API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SuperSaasConfig {
    /// SuperSaaS account name.
    pub account: String,

    /// SuperSaaS API key.
    pub api_key: String,

    /// Base URL of the SuperSaaS API.
    #[serde(default = "default_supersaas_base_url")]
    pub base_url: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_public_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_error_redirect_url() -> String {
    "https://www.rabe.ch".to_string()
}

fn default_secure_cookies() -> bool {
    true
}

fn default_supersaas_base_url() -> String {
    "https://www.supersaas.com".to_string()
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the socket address to bind to.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen.host, self.listen.port)
    }

    /// Returns the OIDC redirect URI advertised to the provider.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.public_url.trim_end_matches('/'), CALLBACK_PATH)
    }
}

impl SessionConfig {
    /// Derives the cookie signing key from the configured secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is shorter than 32 bytes.
    pub fn signing_key(&self) -> Result<Key, config::ConfigError> {
        if self.secret.len() < 32 {
            return Err(config::ConfigError::Message(
                "session.secret must be at least 32 bytes".to_string(),
            ));
        }
        Ok(Key::derive_from(self.secret.as_bytes()))
    }
}
