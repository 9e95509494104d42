//! In-process collaborator fakes shared by the gate and route tests.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use supersaas_connector_access::{
    AuthenticationError, IdentityClient, IdentityContext, ProvisioningClient, ProvisioningError,
    TokenSet, UserClaims,
};

/// Authorization endpoint URL advertised by the fake provider.
pub const AUTHORIZE_URL: &str = "https://idp.test/authorize?client_id=connector";

/// End-session URL advertised by the fake provider.
pub const LOGOUT_URL: &str = "https://idp.test/logout?client_id=connector";

/// Token set returned by the fake provider.
pub fn tokens() -> TokenSet {
    TokenSet::new(
        "access_123".to_string(),
        Some("refresh_456".to_string()),
        Some("id_789".to_string()),
    )
}

/// Claims returned by the fake provider.
pub fn claims() -> UserClaims {
    UserClaims::new("u@x.test".to_string(), "42".to_string())
}

/// Identity client returning canned responses.
pub struct StaticIdentityClient {
    exchange: Result<TokenSet, AuthenticationError>,
    userinfo: Result<UserClaims, AuthenticationError>,
    /// Number of exchange attempts observed.
    pub exchange_calls: Arc<AtomicUsize>,
}

impl StaticIdentityClient {
    /// A provider where exchange and userinfo both succeed.
    pub fn succeeding() -> Self {
        Self {
            exchange: Ok(tokens()),
            userinfo: Ok(claims()),
            exchange_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider that rejects every code.
    pub fn failing_exchange() -> Self {
        Self {
            exchange: Err(AuthenticationError::CodeExchange {
                reason: "invalid_grant".to_string(),
            }),
            userinfo: Ok(claims()),
            exchange_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider where the exchange succeeds but userinfo fails.
    pub fn failing_userinfo() -> Self {
        Self {
            exchange: Ok(tokens()),
            userinfo: Err(AuthenticationError::UserinfoFetch {
                reason: "timeout".to_string(),
            }),
            exchange_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl IdentityClient for StaticIdentityClient {
    fn authorization_url(&self) -> String {
        AUTHORIZE_URL.to_string()
    }

    fn logout_url(&self) -> String {
        LOGOUT_URL.to_string()
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenSet, AuthenticationError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.exchange.clone()
    }

    async fn fetch_userinfo(
        &self,
        _access_token: &str,
    ) -> Result<UserClaims, AuthenticationError> {
        self.userinfo.clone()
    }
}

/// Provisioning client recording the accounts it was asked to ensure.
pub struct CountingProvisioningClient {
    login_url: String,
    fail: bool,
    /// Number of ensure calls observed.
    pub calls: Arc<AtomicUsize>,
    /// Distinct uids provisioned so far.
    pub accounts: Arc<Mutex<HashSet<String>>>,
}

impl CountingProvisioningClient {
    /// A client that always returns the given login URL.
    pub fn returning(login_url: &str) -> Self {
        Self {
            login_url: login_url.to_string(),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
            accounts: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// A client whose ensure call always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning("https://app.example/login/unused")
        }
    }
}

#[async_trait]
impl ProvisioningClient for CountingProvisioningClient {
    async fn ensure_user(
        &self,
        identity: &IdentityContext,
    ) -> Result<String, ProvisioningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProvisioningError::Rejected { status: 500 });
        }
        self.accounts
            .lock()
            .expect("accounts lock")
            .insert(identity.uid.clone());
        Ok(self.login_url.clone())
    }
}
