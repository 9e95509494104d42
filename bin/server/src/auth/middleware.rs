//! The authentication gate, applied to every request as Axum middleware.
//!
//! The gate classifies each request, drives the authorization-code exchange
//! and userinfo fetch when the request is the OIDC callback, and attaches
//! the identity context derived from the session to every request that has
//! one. It never forces a redirect for requests outside the callback path;
//! route handlers decide whether they require authentication.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use supersaas_connector_access::{
    AuthenticationError, IdentityClient, IdentityContext, SessionData, SessionId, SessionStore,
};

use super::AppState;
use super::routes::CALLBACK_PATH;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Request classification by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// The OIDC callback; the gate performs the code exchange.
    Callback,
    /// Everything else, public and protected routes alike.
    Other,
}

/// The slice of an inbound request the gate inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    path: String,
    code: Option<String>,
    provider_error: Option<String>,
}

impl GateRequest {
    /// Extracts the gate-relevant parts from a request URI.
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Self {
        let mut code = None;
        let mut provider_error = None;
        if let Some(query) = uri.query() {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                match key.as_ref() {
                    "code" => code = Some(value.into_owned()),
                    "error" => provider_error = Some(value.into_owned()),
                    _ => {}
                }
            }
        }
        Self {
            path: uri.path().to_string(),
            code,
            provider_error,
        }
    }

    /// Classifies the request by path.
    #[must_use]
    pub fn classify(&self) -> RequestClass {
        if self.path == CALLBACK_PATH {
            RequestClass::Callback
        } else {
            RequestClass::Other
        }
    }
}

/// The gate's verdict on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Hand the request to the route handler, with the identity context
    /// when the session is authenticated.
    Proceed { identity: Option<IdentityContext> },
    /// Short-circuit with a redirect; route logic never runs.
    Redirect { location: String },
}

/// Request-scoped authentication decision engine.
pub struct AuthGate {
    identity: Arc<dyn IdentityClient>,
    store: Arc<dyn SessionStore>,
    error_redirect_url: String,
}

impl AuthGate {
    /// Creates a gate over the given collaborators.
    pub fn new(
        identity: Arc<dyn IdentityClient>,
        store: Arc<dyn SessionStore>,
        error_redirect_url: String,
    ) -> Self {
        Self {
            identity,
            store,
            error_redirect_url,
        }
    }

    /// Runs the gate for one request.
    pub async fn handle(&self, session_id: &SessionId, request: &GateRequest) -> GateDecision {
        match request.classify() {
            RequestClass::Callback => self.handle_callback(session_id, request).await,
            RequestClass::Other => {
                let session = self.store.get(session_id).await;
                GateDecision::Proceed {
                    identity: session.identity(),
                }
            }
        }
    }

    async fn handle_callback(
        &self,
        session_id: &SessionId,
        request: &GateRequest,
    ) -> GateDecision {
        match self.complete_login(session_id, request).await {
            Ok(identity) => GateDecision::Proceed {
                identity: Some(identity),
            },
            Err(error) => {
                match &error {
                    AuthenticationError::MissingAuthorizationCode => {
                        tracing::warn!(error = %error, "OIDC callback rejected");
                    }
                    _ => {
                        tracing::error!(error = %error, "OIDC callback failed");
                    }
                }
                if error.invalidates_session() {
                    self.store.clear(session_id).await;
                }
                GateDecision::Redirect {
                    location: self.error_redirect_url.clone(),
                }
            }
        }
    }

    /// Exchanges the callback's code, fetches the user's claims, and writes
    /// the session in one atomic `put`. A session already authenticated is
    /// re-exchanged and overwritten.
    async fn complete_login(
        &self,
        session_id: &SessionId,
        request: &GateRequest,
    ) -> Result<IdentityContext, AuthenticationError> {
        if let Some(error) = &request.provider_error {
            return Err(AuthenticationError::ProviderReturnedError {
                error: error.clone(),
            });
        }

        let code = request
            .code
            .as_deref()
            .ok_or(AuthenticationError::MissingAuthorizationCode)?;

        let tokens = self.identity.exchange_code(code).await?;
        let claims = self.identity.fetch_userinfo(tokens.access_token()).await?;

        let identity = IdentityContext::from_claims(&claims);
        self.store
            .put(session_id, SessionData::authenticated(tokens, claims))
            .await;

        tracing::info!(uid = %identity.uid, "session authenticated");
        Ok(identity)
    }
}

/// Axum middleware adapter around [`AuthGate`].
///
/// Resolves the session ID from the signed cookie (minting a fresh one when
/// absent), runs the gate, and threads the identity context to the handler
/// as a typed request extension.
pub async fn authentication_gate(
    State(state): State<Arc<AppState>>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let (session_id, jar) = match jar.get(SESSION_COOKIE) {
        Some(cookie) => (SessionId::from(cookie.value()), jar),
        None => {
            let session_id = SessionId::generate();
            let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
                .path("/")
                .http_only(true)
                .secure(state.secure_cookies)
                .same_site(SameSite::Lax);
            (session_id, jar.add(cookie))
        }
    };

    let gate_request = GateRequest::from_uri(request.uri());
    let response = match state.gate.handle(&session_id, &gate_request).await {
        GateDecision::Proceed { identity } => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        GateDecision::Redirect { location } => Redirect::to(&location).into_response(),
    };

    (jar, response).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::{StaticIdentityClient, claims, tokens};
    use supersaas_connector_access::MemorySessionStore;

    const ERROR_URL: &str = "https://errors.test/oops";

    fn gate_with(
        identity: StaticIdentityClient,
    ) -> (AuthGate, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        let gate = AuthGate::new(Arc::new(identity), store.clone(), ERROR_URL.to_string());
        (gate, store)
    }

    fn callback_request(query: &str) -> GateRequest {
        let uri: Uri = format!("{CALLBACK_PATH}{query}").parse().expect("uri");
        GateRequest::from_uri(&uri)
    }

    #[test]
    fn classifies_callback_path() {
        assert_eq!(callback_request("").classify(), RequestClass::Callback);
    }

    #[test]
    fn classifies_other_paths() {
        for path in ["/", "/supersaas", "/logout", "/oidc/callback/extra"] {
            let uri: Uri = path.parse().expect("uri");
            assert_eq!(
                GateRequest::from_uri(&uri).classify(),
                RequestClass::Other,
                "path {path}"
            );
        }
    }

    #[test]
    fn parses_code_and_error_from_query() {
        let request = callback_request("?code=abc%20123&error=access_denied&state=xyz");
        assert_eq!(request.code.as_deref(), Some("abc 123"));
        assert_eq!(request.provider_error.as_deref(), Some("access_denied"));
    }

    #[tokio::test]
    async fn public_request_without_session_proceeds_anonymously() {
        let (gate, _store) = gate_with(StaticIdentityClient::succeeding());
        let uri: Uri = "/supersaas".parse().expect("uri");

        let decision = gate
            .handle(&SessionId::generate(), &GateRequest::from_uri(&uri))
            .await;

        assert_eq!(decision, GateDecision::Proceed { identity: None });
    }

    #[tokio::test]
    async fn authenticated_session_yields_identity_on_other_paths() {
        let (gate, store) = gate_with(StaticIdentityClient::succeeding());
        let session_id = SessionId::generate();
        store
            .put(&session_id, SessionData::authenticated(tokens(), claims()))
            .await;

        let uri: Uri = "/supersaas".parse().expect("uri");
        let decision = gate.handle(&session_id, &GateRequest::from_uri(&uri)).await;

        match decision {
            GateDecision::Proceed {
                identity: Some(identity),
            } => {
                assert_eq!(identity.email, "u@x.test");
                assert_eq!(identity.uid, "42");
            }
            other => panic!("expected identity, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn callback_without_code_redirects_to_error_destination() {
        let (gate, store) = gate_with(StaticIdentityClient::succeeding());
        let session_id = SessionId::generate();

        let decision = gate.handle(&session_id, &callback_request("")).await;

        assert_eq!(
            decision,
            GateDecision::Redirect {
                location: ERROR_URL.to_string()
            }
        );
        assert!(!store.get(&session_id).await.is_authenticated());
    }

    #[tokio::test]
    async fn callback_with_provider_error_redirects_and_clears_session() {
        let (gate, store) = gate_with(StaticIdentityClient::succeeding());
        let session_id = SessionId::generate();
        store
            .put(&session_id, SessionData::authenticated(tokens(), claims()))
            .await;

        let decision = gate
            .handle(&session_id, &callback_request("?error=access_denied"))
            .await;

        assert_eq!(
            decision,
            GateDecision::Redirect {
                location: ERROR_URL.to_string()
            }
        );
        assert!(!store.get(&session_id).await.is_authenticated());
    }

    #[tokio::test]
    async fn successful_callback_populates_session_and_attaches_identity() {
        let identity_client = StaticIdentityClient::succeeding();
        let (gate, store) = gate_with(identity_client);
        let session_id = SessionId::generate();

        let decision = gate
            .handle(&session_id, &callback_request("?code=abc123"))
            .await;

        match decision {
            GateDecision::Proceed {
                identity: Some(identity),
            } => {
                assert_eq!(identity.email, "u@x.test");
                assert_eq!(identity.uid, "42");
            }
            other => panic!("expected identity, got {other:?}"),
        }

        let session = store.get(&session_id).await;
        assert!(session.is_authenticated());
        assert_eq!(
            session.tokens().expect("tokens").access_token(),
            "access_123"
        );
    }

    #[tokio::test]
    async fn failed_exchange_clears_session_and_redirects() {
        let (gate, store) = gate_with(StaticIdentityClient::failing_exchange());
        let session_id = SessionId::generate();
        store
            .put(&session_id, SessionData::authenticated(tokens(), claims()))
            .await;

        let decision = gate
            .handle(&session_id, &callback_request("?code=already-used"))
            .await;

        assert_eq!(
            decision,
            GateDecision::Redirect {
                location: ERROR_URL.to_string()
            }
        );
        assert!(!store.get(&session_id).await.is_authenticated());
    }

    #[tokio::test]
    async fn failed_userinfo_discards_fresh_tokens() {
        let (gate, store) = gate_with(StaticIdentityClient::failing_userinfo());
        let session_id = SessionId::generate();

        let decision = gate
            .handle(&session_id, &callback_request("?code=abc123"))
            .await;

        assert_eq!(
            decision,
            GateDecision::Redirect {
                location: ERROR_URL.to_string()
            }
        );
        // Indistinguishable from a session that never attempted exchange.
        assert_eq!(store.get(&session_id).await, SessionData::default());
    }

    #[tokio::test]
    async fn repeated_callback_overwrites_session() {
        let identity_client = StaticIdentityClient::succeeding();
        let exchange_calls = identity_client.exchange_calls.clone();
        let (gate, store) = gate_with(identity_client);
        let session_id = SessionId::generate();

        gate.handle(&session_id, &callback_request("?code=first"))
            .await;
        gate.handle(&session_id, &callback_request("?code=second"))
            .await;

        assert_eq!(exchange_calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        let session = store.get(&session_id).await;
        assert!(session.is_authenticated());
        assert_eq!(session.identity().expect("identity").uid, "42");
    }
}
