//! Session and identity model for the SuperSaaS connector.
//!
//! This crate provides:
//! - The per-browser session model (`SessionData`, `SessionId`, `TokenSet`)
//! - The per-request identity view (`IdentityContext`, `UserClaims`)
//! - Collaborator contracts (`IdentityClient`, `ProvisioningClient`,
//!   `SessionStore`) implemented by the server crate
//! - OIDC provider configuration (`OidcConfig`)
//! - Authentication and provisioning error types
//!
//! # Session Model
//!
//! A session is either unauthenticated or holds a complete token set plus
//! the claims obtained from the same authentication. Partial states are
//! unrepresentable: tokens and claims travel together.
//!
//! # Example
//!
//! ```
//! use supersaas_connector_access::{SessionData, TokenSet, UserClaims};
//!
//! let mut session = SessionData::default();
//! assert!(!session.is_authenticated());
//!
//! session.authenticate(
//!     TokenSet::new("opaque-access-token".to_string(), None, None),
//!     UserClaims::new("alice@example.com".to_string(), "42".to_string()),
//! );
//!
//! let identity = session.identity().expect("authenticated session");
//! assert_eq!(identity.email, "alice@example.com");
//! assert_eq!(identity.uid, "42");
//! ```

pub mod client;
pub mod error;
pub mod identity;
pub mod oidc;
pub mod session;
pub mod store;

// Re-export main types at crate root
pub use client::{IdentityClient, ProvisioningClient};
pub use error::{AuthenticationError, ProvisioningError};
pub use identity::{IdentityContext, UserClaims};
pub use oidc::OidcConfig;
pub use session::{SessionData, SessionId, TokenSet};
pub use store::{MemorySessionStore, SessionStore};
