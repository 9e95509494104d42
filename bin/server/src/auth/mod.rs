//! Authentication module for the SuperSaaS connector server.
//!
//! This module provides:
//! - The authentication gate middleware that runs on every request
//! - The OIDC identity client built on the openidconnect crate
//! - The route handlers consuming the identity context the gate attaches
//!
//! # Authentication Model
//!
//! Identity state lives only in the browser session: the signed `session`
//! cookie carries an opaque session ID, and the session store maps that ID
//! to the token set and claims obtained from one successful
//! authorization-code exchange. There is no local user database; SuperSaaS
//! accounts are provisioned lazily from the claims on each visit to the
//! protected route.

pub mod middleware;
pub mod oidc;
pub mod routes;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use supersaas_connector_access::{IdentityClient, ProvisioningClient, SessionStore};

pub use middleware::{AuthGate, authentication_gate};
pub use oidc::OidcIdentityClient;
pub use routes::router;

/// Shared application state.
pub struct AppState {
    /// The authentication gate applied to every request.
    pub gate: AuthGate,
    /// Session persistence.
    pub store: Arc<dyn SessionStore>,
    /// OIDC identity provider client.
    pub identity: Arc<dyn IdentityClient>,
    /// SuperSaaS provisioning client.
    pub provisioning: Arc<dyn ProvisioningClient>,
    /// Where the browser is sent when authentication or provisioning fails.
    pub error_redirect_url: String,
    /// Whether to set the Secure flag on the session cookie.
    pub secure_cookies: bool,
    /// Signing key for the session cookie.
    cookie_key: Key,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        store: Arc<dyn SessionStore>,
        identity: Arc<dyn IdentityClient>,
        provisioning: Arc<dyn ProvisioningClient>,
        error_redirect_url: String,
        cookie_key: Key,
        secure_cookies: bool,
    ) -> Self {
        let gate = AuthGate::new(
            identity.clone(),
            store.clone(),
            error_redirect_url.clone(),
        );
        Self {
            gate,
            store,
            identity,
            provisioning,
            error_redirect_url,
            secure_cookies,
            cookie_key,
        }
    }
}

/// Axum state handle wrapping the shared [`AppState`].
///
/// Axum's `SignedCookieJar` extractor requires `Key: FromRef<S>`, but the
/// orphan rule forbids implementing the foreign `FromRef`/`Key` pair for the
/// equally-foreign `Arc<AppState>`. Wrapping the `Arc` in this local newtype
/// gives the `FromRef` impls a local type to anchor on without changing how
/// handlers extract `State<Arc<AppState>>`.
#[derive(Clone)]
pub(crate) struct AppStateRef(pub(crate) Arc<AppState>);

impl FromRef<AppStateRef> for Key {
    fn from_ref(state: &AppStateRef) -> Self {
        state.0.cookie_key.clone()
    }
}

impl FromRef<AppStateRef> for Arc<AppState> {
    fn from_ref(state: &AppStateRef) -> Self {
        state.0.clone()
    }
}
