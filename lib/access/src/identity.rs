//! Identity claims and the per-request identity view.

use serde::{Deserialize, Serialize};

/// Claims extracted from the provider's userinfo response.
///
/// Only the claims consumed downstream are kept; everything else the
/// provider asserts is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Email address, used as the SuperSaaS account name.
    email: String,
    /// Provider-supplied stable user identifier.
    uid: String,
}

impl UserClaims {
    /// Creates a set of claims.
    #[must_use]
    pub fn new(email: String, uid: String) -> Self {
        Self { email, uid }
    }

    /// Returns the email claim.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the stable user identifier claim.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }
}

/// Per-request view of the authenticated user.
///
/// Derived fresh from the session's claims on every request and attached to
/// the request by the authentication gate; discarded at response time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    /// Email address of the authenticated user.
    pub email: String,
    /// Provider-supplied stable user identifier.
    pub uid: String,
}

impl IdentityContext {
    /// Derives the identity view from stored claims.
    #[must_use]
    pub fn from_claims(claims: &UserClaims) -> Self {
        Self {
            email: claims.email().to_string(),
            uid: claims.uid().to_string(),
        }
    }
}
