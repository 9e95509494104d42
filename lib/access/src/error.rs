//! Error types for authentication and provisioning.
//!
//! Collaborator failures are opaque beyond succeeded/failed: the gate and
//! route layer convert every variant into a redirect to the configured error
//! destination, so these types exist for logging and for deciding whether
//! the session must be cleared.

use std::fmt;

/// Errors from the OIDC authentication flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The provider redirected back with an error instead of a code.
    ProviderReturnedError { error: String },
    /// The callback was reached without a `code` query parameter.
    MissingAuthorizationCode,
    /// The provider rejected or failed to process the authorization code.
    CodeExchange { reason: String },
    /// The userinfo fetch failed after a successful exchange.
    UserinfoFetch { reason: String },
    /// The userinfo response lacked a required claim.
    MissingClaim { claim: String },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderReturnedError { error } => {
                write!(f, "provider returned error: {error}")
            }
            Self::MissingAuthorizationCode => {
                write!(f, "callback reached without an authorization code")
            }
            Self::CodeExchange { reason } => {
                write!(f, "code exchange failed: {reason}")
            }
            Self::UserinfoFetch { reason } => {
                write!(f, "userinfo fetch failed: {reason}")
            }
            Self::MissingClaim { claim } => {
                write!(f, "userinfo response missing required claim: {claim}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

impl AuthenticationError {
    /// Returns true if the session must be cleared when this error occurs.
    ///
    /// A missing code never touched the session; every later failure may
    /// leave claims or tokens the connector no longer trusts.
    #[must_use]
    pub fn invalidates_session(&self) -> bool {
        !matches!(self, Self::MissingAuthorizationCode)
    }
}

/// Errors from the SuperSaaS provisioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    /// The request could not be sent or the response not read.
    Request { reason: String },
    /// SuperSaaS answered with a non-success status.
    Rejected { status: u16 },
}

impl fmt::Display for ProvisioningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { reason } => {
                write!(f, "provisioning request failed: {reason}")
            }
            Self::Rejected { status } => {
                write!(f, "provisioning rejected with status {status}")
            }
        }
    }
}

impl std::error::Error for ProvisioningError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_returned_error_display() {
        let err = AuthenticationError::ProviderReturnedError {
            error: "access_denied".to_string(),
        };
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn missing_code_display() {
        let err = AuthenticationError::MissingAuthorizationCode;
        assert!(err.to_string().contains("authorization code"));
    }

    #[test]
    fn code_exchange_display() {
        let err = AuthenticationError::CodeExchange {
            reason: "invalid_grant".to_string(),
        };
        assert!(err.to_string().contains("code exchange failed"));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn missing_claim_display() {
        let err = AuthenticationError::MissingClaim {
            claim: "uid".to_string(),
        };
        assert!(err.to_string().contains("uid"));
    }

    #[test]
    fn missing_code_does_not_invalidate_session() {
        assert!(!AuthenticationError::MissingAuthorizationCode.invalidates_session());
    }

    #[test]
    fn exchange_and_userinfo_failures_invalidate_session() {
        let exchange = AuthenticationError::CodeExchange {
            reason: "expired".to_string(),
        };
        let userinfo = AuthenticationError::UserinfoFetch {
            reason: "timeout".to_string(),
        };
        assert!(exchange.invalidates_session());
        assert!(userinfo.invalidates_session());
    }

    #[test]
    fn provisioning_rejected_display() {
        let err = ProvisioningError::Rejected { status: 422 };
        assert!(err.to_string().contains("422"));
    }
}
