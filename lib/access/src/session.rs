//! Per-browser session state.
//!
//! A session is created empty on first contact, populated exactly once per
//! successful authorization-code exchange, and cleared entirely on logout or
//! on any exchange/userinfo failure. Subsequent requests only ever observe a
//! session that is fully unauthenticated or fully authenticated.

use serde::{Deserialize, Serialize};

use crate::identity::{IdentityContext, UserClaims};

/// Unique identifier for a session.
///
/// Session IDs are opaque strings held client-side in a signed cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session ID from a string.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generates a fresh random session ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Returns the session ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The token set obtained from one successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Opaque access token, used for the userinfo fetch.
    access_token: String,
    /// Refresh token, if the provider issued one.
    refresh_token: Option<String>,
    /// Raw ID token, if the provider issued one.
    id_token: Option<String>,
}

impl TokenSet {
    /// Creates a token set from an exchange response.
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        id_token: Option<String>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            id_token,
        }
    }

    /// Returns the access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the refresh token, if present.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns the raw ID token, if present.
    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }
}

/// The authenticated payload of a session.
///
/// Tokens and claims always come from the same exchange; they are stored and
/// replaced as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Authentication {
    tokens: TokenSet,
    claims: UserClaims,
}

/// Server-trusted, browser-scoped session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    authentication: Option<Authentication>,
}

impl SessionData {
    /// Creates a session populated from a successful exchange.
    #[must_use]
    pub fn authenticated(tokens: TokenSet, claims: UserClaims) -> Self {
        Self {
            authentication: Some(Authentication { tokens, claims }),
        }
    }

    /// Replaces the session contents with the result of a fresh exchange.
    pub fn authenticate(&mut self, tokens: TokenSet, claims: UserClaims) {
        self.authentication = Some(Authentication { tokens, claims });
    }

    /// Clears all authentication state.
    pub fn clear(&mut self) {
        self.authentication = None;
    }

    /// Returns true if the session holds a complete token set.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    /// Returns the token set, if authenticated.
    #[must_use]
    pub fn tokens(&self) -> Option<&TokenSet> {
        self.authentication.as_ref().map(|a| &a.tokens)
    }

    /// Returns the claims, if authenticated.
    #[must_use]
    pub fn claims(&self) -> Option<&UserClaims> {
        self.authentication.as_ref().map(|a| &a.claims)
    }

    /// Derives the per-request identity view from the stored claims.
    #[must_use]
    pub fn identity(&self) -> Option<IdentityContext> {
        self.claims().map(IdentityContext::from_claims)
    }
}
