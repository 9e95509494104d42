//! OIDC identity client built on the openidconnect crate.

use async_trait::async_trait;
use openidconnect::core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce, OAuth2TokenResponse,
    RedirectUrl, Scope,
};
use supersaas_connector_access::{
    AuthenticationError, IdentityClient, OidcConfig, TokenSet, UserClaims,
};
use url::Url;

/// Identity client for a discovered OIDC provider.
///
/// Provider metadata is discovered once at startup; per-request operations
/// build on it. Claims are read from the provider's userinfo endpoint
/// rather than the ID token, so the token set stays opaque to the
/// connector.
pub struct OidcIdentityClient {
    provider_metadata: CoreProviderMetadata,
    client_id: ClientId,
    client_secret: Option<ClientSecret>,
    redirect_url: RedirectUrl,
    userinfo_url: String,
    end_session_url: Url,
    config: OidcConfig,
    http_client: reqwest::Client,
}

impl OidcIdentityClient {
    /// Creates a new identity client by discovering the provider metadata.
    pub async fn discover(
        config: OidcConfig,
        redirect_uri: String,
    ) -> Result<Self, OidcSetupError> {
        let issuer_url = IssuerUrl::new(config.issuer_url())
            .map_err(|e| OidcSetupError::Configuration(format!("invalid issuer URL: {}", e)))?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                OidcSetupError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| {
                OidcSetupError::Discovery(format!("failed to discover provider: {}", e))
            })?;

        let userinfo_url = provider_metadata
            .userinfo_endpoint()
            .ok_or_else(|| {
                OidcSetupError::Discovery("provider advertises no userinfo endpoint".to_string())
            })?
            .as_str()
            .to_string();

        // Keycloak does not always advertise its end-session endpoint in
        // the core metadata, so compose it from the issuer.
        let end_session_url =
            Url::parse(&format!("{}/protocol/openid-connect/logout", config.issuer_url()))
                .map_err(|e| {
                    OidcSetupError::Configuration(format!("invalid end-session URL: {}", e))
                })?;

        let redirect_url = RedirectUrl::new(redirect_uri)
            .map_err(|e| OidcSetupError::Configuration(format!("invalid redirect URI: {}", e)))?;

        let client_id = ClientId::new(config.client_id().to_string());
        let client_secret = config
            .client_secret()
            .map(|secret| ClientSecret::new(secret.to_string()));

        Ok(Self {
            provider_metadata,
            client_id,
            client_secret,
            redirect_url,
            userinfo_url,
            end_session_url,
            config,
            http_client,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }
}

#[async_trait]
impl IdentityClient for OidcIdentityClient {
    fn authorization_url(&self) -> String {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let mut auth_request = client.authorize_url(
            CoreAuthenticationFlow::AuthorizationCode,
            CsrfToken::new_random,
            Nonce::new_random,
        );

        for scope in self.config.scopes() {
            auth_request = auth_request.add_scope(Scope::new(scope.to_string()));
        }

        let (auth_url, _csrf_token, _nonce) = auth_request.url();
        auth_url.to_string()
    }

    fn logout_url(&self) -> String {
        let mut url = self.end_session_url.clone();
        url.query_pairs_mut()
            .append_pair(
                "post_logout_redirect_uri",
                self.config.post_logout_redirect_url(),
            )
            .append_pair("client_id", self.config.client_id());
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, AuthenticationError> {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let token_request = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| AuthenticationError::CodeExchange {
                reason: format!("token endpoint error: {}", e),
            })?;

        let token_response = token_request
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthenticationError::CodeExchange {
                reason: e.to_string(),
            })?;

        let id_token = raw_id_token(&token_response);

        Ok(TokenSet::new(
            token_response.access_token().secret().clone(),
            token_response
                .refresh_token()
                .map(|token| token.secret().clone()),
            id_token,
        ))
    }

    async fn fetch_userinfo(
        &self,
        access_token: &str,
    ) -> Result<UserClaims, AuthenticationError> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthenticationError::UserinfoFetch {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(AuthenticationError::UserinfoFetch {
                reason: format!("userinfo endpoint returned {}", response.status()),
            });
        }

        let payload: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| AuthenticationError::UserinfoFetch {
                    reason: format!("invalid userinfo payload: {}", e),
                })?;

        claims_from_userinfo(&payload)
    }
}

/// Extracts the raw ID token string from a token response.
///
/// The openidconnect response type keeps the ID token behind its verifying
/// wrapper; the raw JWT is recovered through serialization since the
/// connector stores it opaquely.
fn raw_id_token<TR>(token_response: &TR) -> Option<String>
where
    TR: serde::Serialize,
{
    serde_json::to_value(token_response)
        .ok()
        .and_then(|value| {
            value
                .get("id_token")
                .and_then(|token| token.as_str())
                .map(str::to_string)
        })
}

/// Extracts the claims the connector needs from a userinfo payload.
///
/// `email` names the SuperSaaS account; `uid` is the stable identifier the
/// realm asserts for the user. Either claim missing fails the whole
/// authentication.
fn claims_from_userinfo(
    payload: &serde_json::Value,
) -> Result<UserClaims, AuthenticationError> {
    let email = payload
        .get("email")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| AuthenticationError::MissingClaim {
            claim: "email".to_string(),
        })?;

    let uid = match payload.get("uid") {
        Some(serde_json::Value::String(uid)) => uid.clone(),
        Some(serde_json::Value::Number(uid)) => uid.to_string(),
        _ => {
            return Err(AuthenticationError::MissingClaim {
                claim: "uid".to_string(),
            });
        }
    };

    Ok(UserClaims::new(email.to_string(), uid))
}

/// OIDC setup errors, fatal at startup only.
#[derive(Debug)]
pub enum OidcSetupError {
    /// Configuration error (invalid URLs, etc.)
    Configuration(String),
    /// Failed to discover provider metadata.
    Discovery(String),
}

impl std::fmt::Display for OidcSetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "OIDC configuration error: {}", msg),
            Self::Discovery(msg) => write!(f, "OIDC discovery error: {}", msg),
        }
    }
}

impl std::error::Error for OidcSetupError {}
