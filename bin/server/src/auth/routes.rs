//! Route handlers consuming the identity context the gate establishes.

use std::sync::Arc;

use axum::{
    Extension, Router, middleware,
    extract::State,
    response::{IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::Cookie;
use supersaas_connector_access::{IdentityContext, SessionId};
use tower_http::trace::TraceLayer;

use super::middleware::{SESSION_COOKIE, authentication_gate};
use super::{AppState, AppStateRef};

/// Path of the OIDC callback the gate intercepts.
pub const CALLBACK_PATH: &str = "/oidc/callback";

/// Path of the protected provisioning route.
pub const SUPERSAAS_PATH: &str = "/supersaas";

/// Path of the front-channel logout route.
pub const LOGOUT_PATH: &str = "/logout";

/// Builds the connector's router with the authentication gate applied to
/// every route.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(to_supersaas))
        .route(CALLBACK_PATH, get(to_supersaas))
        .route(SUPERSAAS_PATH, get(supersaas_redirect))
        .route(LOGOUT_PATH, get(logout))
        .layer(middleware::from_fn_with_state(
            AppStateRef(state.clone()),
            authentication_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(AppStateRef(state))
}

/// Redirects to `/supersaas` for user creation and redirection to
/// SuperSaaS.
///
/// Serves both the root route and the callback route: by the time this
/// handler runs for a callback, the gate has already exchanged the code and
/// populated the session.
async fn to_supersaas() -> Redirect {
    Redirect::to(SUPERSAAS_PATH)
}

/// Ensures a SuperSaaS account exists and redirects to its login URL.
///
/// Unauthenticated requests are sent to the identity provider's
/// authorization endpoint instead; a provisioning failure redirects to the
/// error destination while keeping the session authenticated, so a retry
/// can succeed without a fresh login.
async fn supersaas_redirect(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<IdentityContext>>,
) -> Redirect {
    let Some(Extension(identity)) = identity else {
        tracing::debug!("unauthenticated request, redirecting to provider");
        return Redirect::to(&state.identity.authorization_url());
    };

    match state.provisioning.ensure_user(&identity).await {
        Ok(login_url) => Redirect::to(&login_url),
        Err(error) => {
            tracing::error!(error = %error, uid = %identity.uid, "provisioning failed");
            Redirect::to(&state.error_redirect_url)
        }
    }
}

/// Logs the user out by clearing the session and redirecting to the
/// provider's end-session endpoint (front-channel logout).
async fn logout(State(state): State<Arc<AppState>>, jar: SignedCookieJar) -> impl IntoResponse {
    let jar = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.store.clear(&SessionId::from(cookie.value())).await;
        let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
        jar.remove(removal)
    } else {
        jar
    };

    (jar, Redirect::to(&state.identity.logout_url()))
}
