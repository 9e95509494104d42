//! Collaborator contracts consumed by the authentication gate and routes.
//!
//! Both external services are invoked through narrow traits so the gate can
//! be exercised against in-process fakes. The server crate provides the
//! production implementations.

use async_trait::async_trait;

use crate::error::{AuthenticationError, ProvisioningError};
use crate::identity::{IdentityContext, UserClaims};
use crate::session::TokenSet;

/// The OIDC identity provider, seen through the two operations the
/// connector needs.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Returns the provider's authorization endpoint URL for starting the
    /// authorization-code flow.
    fn authorization_url(&self) -> String;

    /// Returns the provider's end-session URL for front-channel logout.
    fn logout_url(&self) -> String;

    /// Exchanges an authorization code for a token set.
    ///
    /// An expired or already-consumed code is rejected by the provider and
    /// surfaces as [`AuthenticationError::CodeExchange`].
    async fn exchange_code(&self, code: &str) -> Result<TokenSet, AuthenticationError>;

    /// Fetches the user's claims with a fresh access token.
    async fn fetch_userinfo(
        &self,
        access_token: &str,
    ) -> Result<UserClaims, AuthenticationError>;
}

/// The SuperSaaS account-management API.
#[async_trait]
pub trait ProvisioningClient: Send + Sync {
    /// Ensures an account exists for the given identity and returns the
    /// auto-login URL to redirect the user to.
    ///
    /// Idempotent: repeated calls with the same identity must not create
    /// duplicate accounts and return the same login destination semantics.
    async fn ensure_user(
        &self,
        identity: &IdentityContext,
    ) -> Result<String, ProvisioningError>;
}
