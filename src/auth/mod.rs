//! Session view-model over the hosted auth API.
//!
//! `AuthContext` keeps the signed-in user, their profile and favorite ids,
//! and announces changes on a broadcast channel.

use crate::backend::{AuthUser, Backend, BackendError, OAuthProvider, Session, SignUpData};
use crate::models::{Favorite, SavedSearch, UserPreferences, UserProfile};
use crate::search::SearchFilters;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("You need to sign in first")]
    NotSignedIn,

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Password must be at least {} characters", MIN_PASSWORD_LEN)]
    WeakPassword,

    #[error("Saved search {0} not found")]
    SavedSearchNotFound(Uuid),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Uuid),
    SignedOut,
    TokenRefreshed(Uuid),
    UserUpdated(Uuid),
    PasswordRecovery(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignUpStatus {
    SignedIn(UserProfile),
    /// Account created; the user must follow the emailed link first
    ConfirmationRequired { email: String },
}

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub session: Option<Session>,
    pub user: Option<AuthUser>,
    pub profile: Option<UserProfile>,
    pub favorites: HashSet<String>,
    /// A sign-in, sign-up or token refresh is in flight
    pub loading: bool,
}

/// Profile fields a signed-in user may change
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub preferences: Option<UserPreferences>,
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .map_or(false, |(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        });
    if !valid {
        return Err(AuthError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    validate_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

pub struct AuthContext {
    backend: Arc<dyn Backend>,
    state: RwLock<AuthState>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthContext {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            state: RwLock::new(AuthState::default()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: AuthEvent) {
        debug!("Auth event {:?}", event);
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.session.is_some()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn current_user(&self) -> Option<AuthUser> {
        self.state.read().await.user.clone()
    }

    async fn set_loading(&self, loading: bool) {
        self.state.write().await.loading = loading;
    }

    pub async fn profile(&self) -> Option<UserProfile> {
        self.state.read().await.profile.clone()
    }

    /// Token and user id of the current session
    async fn credentials(&self) -> Result<(String, Uuid), AuthError> {
        let state = self.state.read().await;
        state
            .session
            .as_ref()
            .map(|s| (s.access_token.clone(), s.user.id))
            .ok_or(AuthError::NotSignedIn)
    }

    /// Loads the profile row, creating it from sign-up metadata when absent
    async fn load_profile(&self, session: &Session) -> Result<UserProfile, AuthError> {
        let token = session.access_token.as_str();
        let user = &session.user;
        if let Some(profile) = self.backend.get_profile(token, user.id).await? {
            return Ok(profile);
        }

        info!("No profile for {}, creating one", user.id);
        let mut profile = UserProfile::new(
            user.id,
            user.email.clone().unwrap_or_default(),
            user.display_name(),
        );
        profile.phone = user.phone();
        profile.role = user.role();
        Ok(self.backend.upsert_profile(token, &profile).await?)
    }

    async fn establish(&self, session: Session) -> Result<UserProfile, AuthError> {
        let profile = self.load_profile(&session).await?;
        let favorites = self
            .backend
            .list_favorites(&session.access_token, session.user.id)
            .await?
            .into_iter()
            .map(|f| f.property_id)
            .collect();

        let user_id = session.user.id;
        *self.state.write().await = AuthState {
            user: Some(session.user.clone()),
            session: Some(session),
            profile: Some(profile.clone()),
            favorites,
            loading: false,
        };
        self.emit(AuthEvent::SignedIn(user_id));
        Ok(profile)
    }

    pub async fn sign_up(&self, data: SignUpData) -> Result<SignUpStatus, AuthError> {
        validate_credentials(&data.email, &data.password)?;
        self.set_loading(true).await;
        let result = self.register(data).await;
        self.set_loading(false).await;
        result
    }

    async fn register(&self, data: SignUpData) -> Result<SignUpStatus, AuthError> {
        let outcome = self.backend.sign_up(&data).await?;

        match outcome.session {
            Some(session) => Ok(SignUpStatus::SignedIn(self.establish(session).await?)),
            None => {
                info!("Sign-up for {} needs email confirmation", data.email);
                Ok(SignUpStatus::ConfirmationRequired {
                    email: data.email.trim().to_string(),
                })
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        self.set_loading(true).await;
        let result = self.authenticate(email.trim(), password).await;
        self.set_loading(false).await;
        result
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let session = self.backend.sign_in_with_password(email, password).await?;
        info!("Signed in {}", session.user.id);
        self.establish(session).await
    }

    pub async fn refresh_session(&self) -> Result<(), AuthError> {
        let refresh_token = {
            let state = self.state.read().await;
            state
                .session
                .as_ref()
                .map(|s| s.refresh_token.clone())
                .ok_or(AuthError::NotSignedIn)?
        };

        self.set_loading(true).await;
        let refreshed = self.backend.refresh_session(&refresh_token).await;
        let mut state = self.state.write().await;
        state.loading = false;
        let session = refreshed?;
        let user_id = session.user.id;
        state.user = Some(session.user.clone());
        state.session = Some(session);
        drop(state);
        self.emit(AuthEvent::TokenRefreshed(user_id));
        Ok(())
    }

    /// Local state is cleared even if the backend call fails
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = std::mem::take(&mut *self.state.write().await).session;
        let Some(session) = session else {
            return Ok(());
        };

        if let Err(e) = self.backend.sign_out(&session.access_token).await {
            warn!("Backend sign-out failed, local session cleared anyway: {}", e);
        }
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    pub async fn reset_password(&self, email: &str, redirect_to: Option<&str>) -> Result<(), AuthError> {
        let email = email.trim();
        validate_email(email)?;
        self.backend.reset_password_for_email(email, redirect_to).await?;
        self.emit(AuthEvent::PasswordRecovery(email.to_string()));
        Ok(())
    }

    pub async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        let (token, user_id) = self.credentials().await?;
        let user = self.backend.update_user_password(&token, new_password).await?;

        let mut state = self.state.write().await;
        if let Some(session) = state.session.as_mut() {
            session.user = user.clone();
        }
        state.user = Some(user);
        drop(state);
        self.emit(AuthEvent::UserUpdated(user_id));
        Ok(())
    }

    pub fn oauth_url(&self, provider: OAuthProvider, redirect_to: &str) -> Result<String, AuthError> {
        Ok(self.backend.oauth_authorize_url(provider, redirect_to)?)
    }

    pub async fn refresh_profile(&self) -> Result<UserProfile, AuthError> {
        let session = self
            .state
            .read()
            .await
            .session
            .clone()
            .ok_or(AuthError::NotSignedIn)?;
        let profile = self.load_profile(&session).await?;
        self.state.write().await.profile = Some(profile.clone());
        Ok(profile)
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, AuthError> {
        let (token, user_id) = self.credentials().await?;
        let mut profile = match self.profile().await {
            Some(profile) => profile,
            None => self.refresh_profile().await?,
        };

        if let Some(full_name) = update.full_name {
            profile.full_name = full_name;
        }
        if let Some(phone) = update.phone {
            profile.phone = Some(phone).filter(|p| !p.trim().is_empty());
        }
        if let Some(preferences) = update.preferences {
            profile.preferences = preferences;
        }
        profile.updated_at = Utc::now();

        let saved = self.backend.upsert_profile(&token, &profile).await?;
        self.state.write().await.profile = Some(saved.clone());
        self.emit(AuthEvent::UserUpdated(user_id));
        Ok(saved)
    }

    /// Uploads the image and points the profile at it
    pub async fn upload_avatar(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AuthError> {
        let (token, user_id) = self.credentials().await?;
        let url = self
            .backend
            .upload_avatar(&token, user_id, file_name, content_type, bytes)
            .await?;

        let mut profile = match self.profile().await {
            Some(profile) => profile,
            None => self.refresh_profile().await?,
        };
        profile.avatar_url = Some(url.clone());
        profile.updated_at = Utc::now();
        let saved = self.backend.upsert_profile(&token, &profile).await?;
        self.state.write().await.profile = Some(saved);
        self.emit(AuthEvent::UserUpdated(user_id));
        Ok(url)
    }

    pub async fn favorites(&self) -> HashSet<String> {
        self.state.read().await.favorites.clone()
    }

    pub async fn is_favorite(&self, property_id: &str) -> bool {
        self.state.read().await.favorites.contains(property_id)
    }

    /// Returns whether the property is a favorite afterwards
    pub async fn toggle_favorite(&self, property_id: &str) -> Result<bool, AuthError> {
        let (token, user_id) = self.credentials().await?;

        if self.is_favorite(property_id).await {
            self.backend.remove_favorite(&token, user_id, property_id).await?;
            self.state.write().await.favorites.remove(property_id);
            Ok(false)
        } else {
            let favorite = Favorite::new(user_id, property_id);
            match self.backend.add_favorite(&token, &favorite).await {
                // Added from another tab; the row exists so treat as success
                Ok(()) | Err(BackendError::Conflict(_)) => {}
                Err(e) => return Err(e.into()),
            }
            self.state.write().await.favorites.insert(property_id.to_string());
            Ok(true)
        }
    }

    pub async fn save_search(&self, name: &str, filters: SearchFilters) -> Result<SavedSearch, AuthError> {
        let (token, user_id) = self.credentials().await?;
        let search = SavedSearch::new(user_id, name.trim(), filters);
        Ok(self.backend.create_saved_search(&token, &search).await?)
    }

    pub async fn saved_searches(&self) -> Result<Vec<SavedSearch>, AuthError> {
        let (token, user_id) = self.credentials().await?;
        Ok(self.backend.list_saved_searches(&token, user_id).await?)
    }

    pub async fn delete_saved_search(&self, id: Uuid) -> Result<(), AuthError> {
        let (token, _) = self.credentials().await?;
        Ok(self.backend.delete_saved_search(&token, id).await?)
    }

    pub async fn set_search_alerts(&self, id: Uuid, enabled: bool) -> Result<SavedSearch, AuthError> {
        let (token, user_id) = self.credentials().await?;
        let mut search = self
            .backend
            .list_saved_searches(&token, user_id)
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or(AuthError::SavedSearchNotFound(id))?;
        search.alerts_enabled = enabled;
        Ok(self.backend.update_saved_search(&token, &search).await?)
    }
}
