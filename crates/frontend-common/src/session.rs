//! Authentication session
//!
//! An explicitly owned session context: the API client, the token store it
//! reads from, and the user record fetched with those tokens. Pages receive an
//! `AuthSession` instead of reaching for global state.

use arc_swap::ArcSwapOption;
use avatarmart_core::{RegisterRequest, Role, TokenStore, User};
use avatarmart_http::{ClientError, MarketClient};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Result of a login or registration, ready to render inline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Failure { error: String },
}

impl AuthOutcome {
    fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure { error } => Some(error),
        }
    }
}

/// Login state of the current user
pub struct AuthSession {
    client: MarketClient,
    user: ArcSwapOption<User>,
    initialized: AtomicBool,
}

impl AuthSession {
    pub fn new(client: MarketClient) -> Self {
        Self {
            client,
            user: ArcSwapOption::empty(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Client sharing this session's token store
    pub fn client(&self) -> &MarketClient {
        &self.client
    }

    fn tokens(&self) -> &Arc<dyn TokenStore> {
        self.client.token_store()
    }

    /// Log in and keep the returned tokens and user
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let response = match self.client.login(email, password).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Login failed");
                return AuthOutcome::failure(err.detail().unwrap_or(LOGIN_FAILED));
            }
        };

        if let Err(err) = self
            .tokens()
            .set_tokens(&response.access_token, &response.refresh_token)
        {
            warn!(error = %err, "Failed to persist session tokens");
            return AuthOutcome::failure(LOGIN_FAILED);
        }

        info!(user_id = response.user.id, role = %response.user.role, "Logged in");
        self.user.store(Some(Arc::new(response.user)));
        AuthOutcome::Success
    }

    /// Create an account, then log straight into it
    pub async fn register(&self, registration: &RegisterRequest) -> AuthOutcome {
        if let Err(err) = self.client.register(registration).await {
            warn!(error = %err, "Registration failed");
            return AuthOutcome::failure(err.detail().unwrap_or(REGISTRATION_FAILED));
        }

        debug!("Registration succeeded, logging in");
        self.login(&registration.email, &registration.password).await
    }

    /// Forget the user and both tokens. No network call.
    pub fn logout(&self) {
        self.clear();
        info!("Logged out");
    }

    fn clear(&self) {
        self.user.store(None);
        if let Err(err) = self.tokens().clear() {
            warn!(error = %err, "Failed to clear stored tokens");
        }
    }

    /// Refresh the cached user from the server
    ///
    /// Does nothing without an access token. The session is cleared when the
    /// server rejects the credentials (401); network errors and 5xx leave it
    /// intact so a flaky connection does not log the user out.
    pub async fn fetch_current_user(&self) -> Result<(), ClientError> {
        if self.tokens().access_token().is_none() {
            return Ok(());
        }

        match self.client.me().await {
            Ok(user) => {
                self.user.store(Some(Arc::new(user)));
                Ok(())
            }
            Err(err) => {
                if err.is_unauthorized() {
                    warn!(error = %err, "Stored credentials rejected, clearing session");
                    self.clear();
                } else if self.tokens().access_token().is_none() {
                    // The client wiped the tokens after a failed refresh
                    self.user.store(None);
                }
                Err(err)
            }
        }
    }

    /// Restore the session from persisted tokens, then mark it checked
    pub async fn initialize(&self) {
        if self.tokens().access_token().is_some() {
            if let Err(err) = self.fetch_current_user().await {
                debug!(error = %err, "Could not restore session");
            }
        }
        self.initialized.store(true, Ordering::Release);
    }

    /// Ask the server for the influencer role and keep the updated user
    pub async fn upgrade_to_seller(&self) -> Result<(), ClientError> {
        let user = self.client.upgrade_to_seller().await?;
        self.user.store(Some(Arc::new(user)));
        Ok(())
    }

    /// Replace the cached user after a refetch done elsewhere
    pub fn set_user(&self, user: User) {
        self.user.store(Some(Arc::new(user)));
    }

    /// Current user, `None` once the access token is gone
    ///
    /// The client wipes the tokens on its own when a refresh fails, so the
    /// cached record is only trusted while an access token is still stored.
    pub fn user(&self) -> Option<Arc<User>> {
        self.tokens().access_token()?;
        self.user.load_full()
    }

    /// Whether [`AuthSession::initialize`] has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user().is_some()
    }

    pub fn user_role(&self) -> Option<Role> {
        self.user().map(|user| user.role.clone())
    }

    /// Credits of the current user, 0 when logged out
    pub fn credit_balance(&self) -> i64 {
        self.user().map_or(0, |user| user.credit_balance)
    }

    pub fn is_buyer(&self) -> bool {
        self.user_role() == Some(Role::Buyer)
    }

    pub fn is_seller(&self) -> bool {
        self.user_role() == Some(Role::Influencer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatarmart_core::{Locale, MemoryTokenStore};

    fn session() -> AuthSession {
        let client = MarketClient::builder()
            .base_url("http://127.0.0.1:9")
            .token_store(Arc::new(MemoryTokenStore::with_tokens(Some("T1"), Some("T2"))))
            .build()
            .unwrap();
        AuthSession::new(client)
    }

    fn user(role: Role) -> User {
        User {
            id: 1,
            email: "a@b.com".into(),
            nickname: "alice".into(),
            role,
            locale: Locale::En,
            credit_balance: 12,
        }
    }

    #[test]
    fn test_outcome_accessors() {
        assert!(AuthOutcome::Success.is_success());
        assert_eq!(AuthOutcome::Success.error(), None);

        let failure = AuthOutcome::failure("nope");
        assert!(!failure.is_success());
        assert_eq!(failure.error(), Some("nope"));
    }

    #[test]
    fn test_derived_flags() {
        let session = session();
        assert!(!session.is_logged_in());
        assert_eq!(session.credit_balance(), 0);
        assert_eq!(session.user_role(), None);

        session.set_user(user(Role::Influencer));
        assert!(session.is_logged_in());
        assert!(session.is_seller());
        assert!(!session.is_buyer());
        assert_eq!(session.credit_balance(), 12);
    }

    #[test]
    fn test_user_hidden_without_access_token() {
        let session = session();
        session.set_user(user(Role::Buyer));
        session.tokens().clear().unwrap();

        assert!(!session.is_logged_in());
        assert!(session.user().is_none());
        assert!(!session.is_buyer());
        assert_eq!(session.user_role(), None);
        assert_eq!(session.credit_balance(), 0);
    }

    #[test]
    fn test_unknown_role_is_neither_buyer_nor_seller() {
        let session = session();
        session.set_user(user(Role::Other("admin".into())));

        assert!(!session.is_buyer());
        assert!(!session.is_seller());
    }

    #[test]
    fn test_logout_clears_everything() {
        let session = session();
        session.set_user(user(Role::Buyer));

        session.logout();

        assert!(session.user().is_none());
        assert_eq!(session.tokens().access_token(), None);
        assert_eq!(session.tokens().refresh_token(), None);
        assert!(!session.is_logged_in());
    }
}
