//! OIDC identity-provider configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the OIDC identity provider.
///
/// The connector targets Keycloak-style providers where realms live under
/// `{server_url}/realms/{realm}`; the composed issuer URL is used for OIDC
/// discovery at startup.
///
/// Fields with defaults can be omitted when loading from environment
/// variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcConfig {
    /// Base URL of the identity provider (e.g. "https://sso.rabe.ch/auth/").
    #[serde(default = "default_server_url")]
    server_url: String,
    /// Realm name within the provider.
    #[serde(default = "default_realm")]
    realm: String,
    /// The OAuth2 client ID registered with the provider.
    #[serde(default = "default_client_id")]
    client_id: String,
    /// The OAuth2 client secret. Absent for public clients.
    #[serde(default)]
    client_secret: Option<String>,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid,email,profile"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Where the provider should send the browser after front-channel
    /// logout.
    #[serde(default = "default_post_logout_redirect_url")]
    post_logout_redirect_url: String,
}

fn default_server_url() -> String {
    "https://sso.rabe.ch/auth/".to_string()
}

fn default_realm() -> String {
    "rabe".to_string()
}

fn default_client_id() -> String {
    "supersaas-auth-connector".to_string()
}

fn default_scopes() -> String {
    "openid,email,profile".to_string()
}

fn default_post_logout_redirect_url() -> String {
    "https://www.rabe.ch".to_string()
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            realm: default_realm(),
            client_id: default_client_id(),
            client_secret: None,
            scopes: default_scopes(),
            post_logout_redirect_url: default_post_logout_redirect_url(),
        }
    }
}

impl OidcConfig {
    /// Creates a configuration for the given provider and client.
    #[must_use]
    pub fn new(server_url: String, realm: String, client_id: String) -> Self {
        Self {
            server_url,
            realm,
            client_id,
            ..Self::default()
        }
    }

    /// Returns the provider base URL.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Returns the realm name.
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Returns the issuer URL used for OIDC discovery.
    #[must_use]
    pub fn issuer_url(&self) -> String {
        format!(
            "{}/realms/{}",
            self.server_url.trim_end_matches('/'),
            self.realm
        )
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret, if this is a confidential client.
    #[must_use]
    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    /// Returns the OAuth2 scopes to request, parsed from the
    /// comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes.split(',').map(str::trim).collect()
    }

    /// Returns the post-logout redirect target.
    #[must_use]
    pub fn post_logout_redirect_url(&self) -> &str {
        &self.post_logout_redirect_url
    }
}
