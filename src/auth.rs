use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::api::CrecheApi;
use crate::api::dto::{LoginRequest, User};
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::preferences::{AUTH_TOKEN_KEY, PreferenceStore};

#[derive(Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
    requires_login: bool,
}

/// Current user and bearer token. The token is cached in the preference store
/// so a restart resumes the session.
pub struct AuthSession {
    store: Arc<dyn PreferenceStore>,
    state: RwLock<SessionState>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState {
                requires_login: true,
                ..SessionState::default()
            }),
        }
    }

    /// Picks up a previously cached token, if any.
    pub async fn restore(store: Arc<dyn PreferenceStore>) -> Self {
        let token = match store.get(AUTH_TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read cached token: {}", e);
                None
            }
        };
        let session = Self::new(store);
        if let Some(token) = token {
            let mut state = session.write();
            state.requires_login = false;
            state.token = Some(token);
        }
        session
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    /// True once the session ended; the shell should show the login screen.
    pub fn requires_login(&self) -> bool {
        self.read().requires_login
    }

    pub async fn login(
        &self,
        api: &dyn CrecheApi,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "L'email et le mot de passe sont requis.".to_string(),
            ));
        }

        let response = api
            .login(&LoginRequest {
                email: email.to_string(),
                mot_de_passe: password.to_string(),
            })
            .await?;

        if let Err(e) = self.store.set(AUTH_TOKEN_KEY, &response.token).await {
            warn!("Failed to cache token: {}", e);
        }
        {
            let mut state = self.write();
            state.token = Some(response.token);
            state.user = Some(response.user.clone());
            state.requires_login = false;
        }
        info!("Logged in as {}", response.user.email);
        Ok(response.user)
    }

    pub async fn logout(&self) {
        self.clear().await;
        info!("Logged out");
    }

    /// Asks for confirmation first; returns whether the session was closed.
    pub async fn logout_with_confirmation(&self, notifier: &dyn Notifier) -> bool {
        if !notifier
            .confirm("Déconnexion", "Voulez-vous vraiment vous déconnecter ?")
            .await
        {
            return false;
        }
        self.logout().await;
        true
    }

    /// Called when the api rejects the token.
    pub async fn expire(&self) {
        if self.is_authenticated() {
            warn!("Session expired");
        }
        self.clear().await;
    }

    async fn clear(&self) {
        {
            let mut state = self.write();
            state.token = None;
            state.user = None;
            state.requires_login = true;
        }
        if let Err(e) = self.store.remove(AUTH_TOKEN_KEY).await {
            warn!("Failed to remove cached token: {}", e);
        }
    }
}
