//! SuperSaaS account provisioning and auto-login URLs.
//!
//! SuperSaaS addresses users created by an integration through a foreign-key
//! id (`{uid}fk`), which makes the ensure call an upsert: repeating it for
//! the same uid updates the one account instead of creating another. The
//! auto-login URL carries an MD5 checksum over account name, API key, and
//! user name, as required by the SuperSaaS API.

use async_trait::async_trait;
use md5::{Digest, Md5};
use supersaas_connector_access::{IdentityContext, ProvisioningClient, ProvisioningError};
use url::Url;

use crate::config::SuperSaasConfig;

/// Provisioning client for the SuperSaaS REST API.
pub struct SuperSaasClient {
    account: String,
    api_key: String,
    base_url: Url,
    http_client: reqwest::Client,
}

impl SuperSaasClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is invalid.
    pub fn new(config: &SuperSaasConfig) -> Result<Self, SuperSaasSetupError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SuperSaasSetupError::Configuration(format!("invalid base URL: {}", e))
        })?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                SuperSaasSetupError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            account: config.account.clone(),
            api_key: config.api_key.clone(),
            base_url,
            http_client,
        })
    }

    /// Computes the login checksum over account name, API key, and user
    /// name.
    fn checksum(&self, name: &str) -> String {
        let digest = Md5::digest(format!("{}{}{}", self.account, self.api_key, name).as_bytes());
        hex::encode(digest)
    }

    /// Builds the auto-login URL for the given user name.
    fn login_url(&self, name: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path("/api/login");
        url.query_pairs_mut()
            .append_pair("account", &self.account)
            .append_pair("user[name]", name)
            .append_pair("checksum", &self.checksum(name));
        url.to_string()
    }

    /// Builds the upsert URL for the given foreign-key uid.
    fn user_url(&self, uid: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/api/users/{}fk.json", uid));
        url.query_pairs_mut()
            .append_pair("account", &self.account)
            .append_pair("api_key", &self.api_key);
        url.to_string()
    }
}

#[async_trait]
impl ProvisioningClient for SuperSaasClient {
    async fn ensure_user(
        &self,
        identity: &IdentityContext,
    ) -> Result<String, ProvisioningError> {
        let response = self
            .http_client
            .put(self.user_url(&identity.uid))
            .json(&serde_json::json!({ "name": identity.email }))
            .send()
            .await
            .map_err(|e| ProvisioningError::Request {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProvisioningError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!(uid = %identity.uid, "SuperSaaS account ensured");
        Ok(self.login_url(&identity.email))
    }
}

/// SuperSaaS setup errors, fatal at startup only.
#[derive(Debug)]
pub enum SuperSaasSetupError {
    /// Configuration error (invalid URLs, etc.)
    Configuration(String),
}

impl std::fmt::Display for SuperSaasSetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "SuperSaaS configuration error: {}", msg),
        }
    }
}

impl std::error::Error for SuperSaasSetupError {}
