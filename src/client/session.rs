use crate::client::api::{ApiClient, Registration};
use crate::client::storage::TokenStorage;
use crate::client::ClientError;
use crate::models::User;

#[derive(Debug, Clone)]
pub enum SessionState {
    Anonymous,
    /// A login, registration or restore is in flight.
    Authenticating,
    Authenticated { user: User },
}

/// The signed-in user and their token, mirrored to `S`.
///
/// `login`, `register`, `restore` and `logout` are the only transitions:
/// `Anonymous -> Authenticating -> Authenticated | Anonymous` and
/// `Authenticated -> Anonymous`.
pub struct Session<S: TokenStorage> {
    api: ApiClient,
    storage: S,
    state: SessionState,
}

impl<S: TokenStorage> Session<S> {
    pub fn new(api: ApiClient, storage: S) -> Self {
        Self {
            api,
            storage,
            state: SessionState::Anonymous,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated { user } => Some(user),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.api.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.user().is_some()
    }

    /// Pick up a token saved by an earlier run. An unusable token is wiped
    /// and the session stays anonymous; only storage failures are errors.
    pub async fn restore(&mut self) -> Result<(), ClientError> {
        self.state = SessionState::Authenticating;

        let stored = match self.storage.load().await {
            Ok(stored) => stored,
            Err(e) => {
                self.become_anonymous();
                return Err(e);
            }
        };
        let Some(token) = stored else {
            self.become_anonymous();
            return Ok(());
        };

        self.api.set_token(Some(token));
        match self.api.current_user().await {
            Ok(user) => {
                self.state = SessionState::Authenticated { user };
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Stored token rejected: {e}");
                self.become_anonymous();
                self.storage.clear().await
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, ClientError> {
        self.state = SessionState::Authenticating;
        match self.api.login(email, password).await {
            Ok(auth) => self.authenticated(auth.access_token, auth.user).await,
            Err(e) => {
                self.become_anonymous();
                Err(e)
            }
        }
    }

    pub async fn register(&mut self, registration: &Registration) -> Result<&User, ClientError> {
        self.state = SessionState::Authenticating;
        match self.api.register(registration).await {
            Ok(auth) => self.authenticated(auth.access_token, auth.user).await,
            Err(e) => {
                self.become_anonymous();
                Err(e)
            }
        }
    }

    /// Always ends anonymous. A failed server call is logged, not returned,
    /// so a dead server cannot keep a user signed in locally.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        if self.api.token().is_some() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!("Logout request failed: {e}");
            }
        }
        self.become_anonymous();
        self.storage.clear().await
    }

    /// Pass an API result through the session. A 401 means the token is dead
    /// server-side, so the session drops to anonymous and forgets it; the
    /// result is handed back unchanged either way.
    pub async fn check<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(e) = &result {
            if e.status() == Some(401) && self.api.token().is_some() {
                tracing::info!("Token rejected by server, signing out");
                self.become_anonymous();
                if let Err(clear) = self.storage.clear().await {
                    tracing::warn!("Failed to clear stored token: {clear}");
                }
            }
        }
        result
    }

    async fn authenticated(&mut self, token: String, user: User) -> Result<&User, ClientError> {
        if let Err(e) = self.storage.save(&token).await {
            self.become_anonymous();
            return Err(e);
        }
        self.api.set_token(Some(token));
        self.state = SessionState::Authenticated { user };
        self.user().ok_or(ClientError::NotAuthenticated)
    }

    fn become_anonymous(&mut self) {
        self.api.set_token(None);
        self.state = SessionState::Anonymous;
    }
}
