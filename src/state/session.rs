// SPDX-License-Identifier: MPL-2.0

use crate::api::{BoardClient, ClientError, User};

const ADMIN_ROLE: &str = "ADMIN";

/// The server calls a session depends on.
#[allow(async_fn_in_trait)]
pub trait AuthBackend {
    async fn login_check(&self) -> Result<bool, ClientError>;
    async fn user_info(&self) -> Result<Option<User>, ClientError>;
    async fn logout(&self) -> Result<(), ClientError>;
}

impl AuthBackend for BoardClient {
    async fn login_check(&self) -> Result<bool, ClientError> {
        BoardClient::login_check(self).await
    }

    async fn user_info(&self) -> Result<Option<User>, ClientError> {
        self.get_user_info().await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        BoardClient::logout(self).await
    }
}

/// Who is signed in. Created at startup and passed to whatever needs it.
///
/// The login itself is carried by the client's session cookie; this only
/// mirrors what the server says about it.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    user: Option<User>,
    loading: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == ADMIN_ROLE)
    }

    /// Username used to match comment authorship
    pub fn handle(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Ask the server who we are. Any failure leaves the session signed out.
    pub async fn refresh<A: AuthBackend>(&mut self, auth: &A) {
        self.loading = true;
        let user = match Self::fetch_user(auth).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "session check failed");
                None
            }
        };
        tracing::debug!(signed_in = user.is_some(), "session refreshed");
        self.user = user;
        self.loading = false;
    }

    async fn fetch_user<A: AuthBackend>(auth: &A) -> Result<Option<User>, ClientError> {
        if !auth.login_check().await? {
            return Ok(None);
        }
        auth.user_info().await
    }

    /// Sign out. The local session is cleared even if the request fails.
    pub async fn logout<A: AuthBackend>(&mut self, auth: &A) -> Result<(), ClientError> {
        let result = auth.logout().await;
        self.user = None;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn user(role: &str) -> User {
        User {
            id: 1,
            username: "kim".to_string(),
            email: "kim@example.com".to_string(),
            nickname: "Kim".to_string(),
            role: role.to_string(),
            profile: None,
            provider_key: None,
        }
    }

    #[test]
    fn test_signed_out_by_default() {
        let session = SessionContext::new();
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
        assert!(session.handle().is_none());
    }

    #[test]
    fn test_roles() {
        let mut session = SessionContext::new();
        session.set_user(Some(user("USER")));
        assert!(session.is_authenticated());
        assert!(!session.is_admin());
        assert_eq!(session.handle(), Some("kim"));

        session.set_user(Some(user("ADMIN")));
        assert!(session.is_admin());
    }

    /// In-memory backend; `None` answers fail like an unreachable server.
    struct StubAuth {
        signed_in: Option<bool>,
        user: Option<User>,
        logout_ok: bool,
        user_info_calls: Mutex<usize>,
    }

    impl StubAuth {
        fn new(signed_in: Option<bool>, user: Option<User>) -> Self {
            Self {
                signed_in,
                user,
                logout_ok: true,
                user_info_calls: Mutex::new(0),
            }
        }

        fn unreachable() -> ClientError {
            ClientError::Network("connection refused".to_string())
        }
    }

    impl AuthBackend for StubAuth {
        async fn login_check(&self) -> Result<bool, ClientError> {
            self.signed_in.ok_or_else(Self::unreachable)
        }

        async fn user_info(&self) -> Result<Option<User>, ClientError> {
            *self.user_info_calls.lock().unwrap() += 1;
            Ok(self.user.clone())
        }

        async fn logout(&self) -> Result<(), ClientError> {
            if self.logout_ok {
                Ok(())
            } else {
                Err(Self::unreachable())
            }
        }
    }

    #[tokio::test]
    async fn test_refresh_loads_user_when_signed_in() {
        let auth = StubAuth::new(Some(true), Some(user("ADMIN")));
        let mut session = SessionContext::new();

        session.refresh(&auth).await;
        assert!(session.is_admin());
        assert_eq!(session.handle(), Some("kim"));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_skips_user_info_when_signed_out() {
        let auth = StubAuth::new(Some(false), Some(user("USER")));
        let mut session = SessionContext::new();
        session.set_user(Some(user("USER")));

        session.refresh(&auth).await;
        assert!(!session.is_authenticated());
        assert_eq!(*auth.user_info_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_refresh_failure_signs_out() {
        let auth = StubAuth::new(None, Some(user("USER")));
        let mut session = SessionContext::new();
        session.set_user(Some(user("USER")));

        session.refresh(&auth).await;
        assert!(!session.is_authenticated());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_logout_clears_user_even_when_request_fails() {
        let mut auth = StubAuth::new(Some(true), None);
        auth.logout_ok = false;
        let mut session = SessionContext::new();
        session.set_user(Some(user("USER")));

        assert!(session.logout(&auth).await.is_err());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_success() {
        let auth = StubAuth::new(Some(true), None);
        let mut session = SessionContext::new();
        session.set_user(Some(user("USER")));

        assert!(session.logout(&auth).await.is_ok());
        assert!(session.user().is_none());
    }
}
