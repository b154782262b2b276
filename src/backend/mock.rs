use crate::backend::supabase::avatar_path;
use crate::backend::traits::{Backend, BackendResult};
use crate::backend::types::{AuthUser, OAuthProvider, Session, SignUpData, SignUpOutcome};
use crate::backend::BackendError;
use crate::config::BackendMode;
use crate::models::{Favorite, SavedSearch, UserProfile, UserRole};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "demo1234";

const SESSION_SECONDS: i64 = 3600;

#[derive(Debug, Clone)]
struct MockAccount {
    user: AuthUser,
    password: String,
}

#[derive(Debug, Default)]
struct MockState {
    /// Keyed by lowercased email
    accounts: HashMap<String, MockAccount>,
    /// Access token -> user id
    sessions: HashMap<String, Uuid>,
    /// Refresh token -> user id
    refresh_tokens: HashMap<String, Uuid>,
    profiles: HashMap<Uuid, UserProfile>,
    favorites: Vec<Favorite>,
    saved_searches: HashMap<Uuid, SavedSearch>,
    avatars: HashMap<String, Vec<u8>>,
    password_resets: Vec<String>,
}

impl MockState {
    fn user_for(&self, token: &str) -> BackendResult<Uuid> {
        self.sessions
            .get(token)
            .copied()
            .ok_or(BackendError::Unauthenticated)
    }

    /// Same check row-level security would make
    fn owner(&self, token: &str, user_id: Uuid) -> BackendResult<Uuid> {
        let caller = self.user_for(token)?;
        if caller != user_id {
            return Err(BackendError::Forbidden(format!(
                "{} may not access rows of {}",
                caller, user_id
            )));
        }
        Ok(caller)
    }

    fn issue_session(&mut self, user: &AuthUser) -> Session {
        let access_token = format!("mock-access-{}", Uuid::new_v4());
        let refresh_token = format!("mock-refresh-{}", Uuid::new_v4());
        self.sessions.insert(access_token.clone(), user.id);
        self.refresh_tokens.insert(refresh_token.clone(), user.id);
        Session {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in: SESSION_SECONDS,
            user: user.clone(),
        }
    }

    fn account_by_id(&self, user_id: Uuid) -> Option<&MockAccount> {
        self.accounts.values().find(|a| a.user.id == user_id)
    }
}

/// In-memory stand-in used when no hosted backend is configured
#[derive(Debug)]
pub struct MockBackend {
    state: RwLock<MockState>,
    require_confirmation: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Mock with the demo account registered and sign-ups confirmed instantly
    pub fn new() -> Self {
        let mut state = MockState::default();
        let now = Utc::now();
        let demo = AuthUser {
            id: Uuid::new_v4(),
            email: Some(DEMO_EMAIL.to_string()),
            user_metadata: serde_json::json!({ "full_name": "Demo User", "role": UserRole::Buyer }),
            created_at: Some(now),
            email_confirmed_at: Some(now),
        };
        state
            .profiles
            .insert(demo.id, UserProfile::new(demo.id, DEMO_EMAIL, "Demo User"));
        state.accounts.insert(
            DEMO_EMAIL.to_string(),
            MockAccount {
                user: demo,
                password: DEMO_PASSWORD.to_string(),
            },
        );
        info!("Mock backend ready, demo account {}", DEMO_EMAIL);

        Self {
            state: RwLock::new(state),
            require_confirmation: false,
        }
    }

    /// Sign-ups return no session, as with email confirmation enabled
    pub fn requiring_confirmation() -> Self {
        Self {
            require_confirmation: true,
            ..Self::new()
        }
    }

    pub async fn password_reset_requests(&self) -> Vec<String> {
        self.state.read().await.password_resets.clone()
    }

    pub async fn avatar(&self, path: &str) -> Option<Vec<u8>> {
        self.state.read().await.avatars.get(path).cloned()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Mock
    }

    async fn sign_up(&self, data: &SignUpData) -> BackendResult<SignUpOutcome> {
        let mut state = self.state.write().await;
        let key = data.email.trim().to_lowercase();
        if state.accounts.contains_key(&key) {
            return Err(BackendError::Conflict(format!("{} is already registered", data.email)));
        }

        let now = Utc::now();
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(key.clone()),
            user_metadata: data.metadata(),
            created_at: Some(now),
            email_confirmed_at: if self.require_confirmation { None } else { Some(now) },
        };
        state.accounts.insert(
            key,
            MockAccount {
                user: user.clone(),
                password: data.password.clone(),
            },
        );
        debug!("Mock sign-up for {}", data.email);

        let session = if self.require_confirmation {
            None
        } else {
            Some(state.issue_session(&user))
        };
        Ok(SignUpOutcome { user, session })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|a| a.password == password)
            .cloned()
            .ok_or(BackendError::InvalidCredentials)?;

        if account.user.email_confirmed_at.is_none() {
            return Err(BackendError::EmailNotConfirmed);
        }
        Ok(state.issue_session(&account.user))
    }

    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session> {
        let mut state = self.state.write().await;
        let user_id = state
            .refresh_tokens
            .remove(refresh_token)
            .ok_or(BackendError::Unauthenticated)?;
        let user = state
            .account_by_id(user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| BackendError::NotFound(format!("user {}", user_id)))?;
        Ok(state.issue_session(&user))
    }

    async fn sign_out(&self, token: &str) -> BackendResult<()> {
        let mut state = self.state.write().await;
        let user_id = state.user_for(token)?;
        state.sessions.retain(|_, id| *id != user_id);
        state.refresh_tokens.retain(|_, id| *id != user_id);
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, _redirect_to: Option<&str>) -> BackendResult<()> {
        // Unknown addresses succeed too, so the endpoint cannot be used to discover accounts
        self.state.write().await.password_resets.push(email.trim().to_lowercase());
        Ok(())
    }

    async fn update_user_password(&self, token: &str, password: &str) -> BackendResult<AuthUser> {
        let mut state = self.state.write().await;
        let user_id = state.user_for(token)?;
        let account = state
            .accounts
            .values_mut()
            .find(|a| a.user.id == user_id)
            .ok_or_else(|| BackendError::NotFound(format!("user {}", user_id)))?;
        account.password = password.to_string();
        Ok(account.user.clone())
    }

    fn oauth_authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> BackendResult<String> {
        Ok(format!("{}?mock_oauth={}", redirect_to, provider))
    }

    async fn get_profile(&self, token: &str, user_id: Uuid) -> BackendResult<Option<UserProfile>> {
        let state = self.state.read().await;
        state.owner(token, user_id)?;
        Ok(state.profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, token: &str, profile: &UserProfile) -> BackendResult<UserProfile> {
        let mut state = self.state.write().await;
        state.owner(token, profile.id)?;
        state.profiles.insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn list_favorites(&self, token: &str, user_id: Uuid) -> BackendResult<Vec<Favorite>> {
        let state = self.state.read().await;
        state.owner(token, user_id)?;
        let mut favorites: Vec<Favorite> = state
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(favorites)
    }

    async fn add_favorite(&self, token: &str, favorite: &Favorite) -> BackendResult<()> {
        let mut state = self.state.write().await;
        state.owner(token, favorite.user_id)?;
        let exists = state
            .favorites
            .iter()
            .any(|f| f.user_id == favorite.user_id && f.property_id == favorite.property_id);
        if exists {
            return Err(BackendError::Conflict(format!(
                "{} is already a favorite",
                favorite.property_id
            )));
        }
        state.favorites.push(favorite.clone());
        Ok(())
    }

    async fn remove_favorite(&self, token: &str, user_id: Uuid, property_id: &str) -> BackendResult<()> {
        let mut state = self.state.write().await;
        state.owner(token, user_id)?;
        state
            .favorites
            .retain(|f| !(f.user_id == user_id && f.property_id == property_id));
        Ok(())
    }

    async fn list_saved_searches(&self, token: &str, user_id: Uuid) -> BackendResult<Vec<SavedSearch>> {
        let state = self.state.read().await;
        state.owner(token, user_id)?;
        let mut searches: Vec<SavedSearch> = state
            .saved_searches
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        searches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(searches)
    }

    async fn create_saved_search(&self, token: &str, search: &SavedSearch) -> BackendResult<SavedSearch> {
        let mut state = self.state.write().await;
        state.owner(token, search.user_id)?;
        if state.saved_searches.contains_key(&search.id) {
            return Err(BackendError::Conflict(format!("saved search {}", search.id)));
        }
        state.saved_searches.insert(search.id, search.clone());
        Ok(search.clone())
    }

    async fn update_saved_search(&self, token: &str, search: &SavedSearch) -> BackendResult<SavedSearch> {
        let mut state = self.state.write().await;
        let caller = state.user_for(token)?;
        let stored = state
            .saved_searches
            .get_mut(&search.id)
            .filter(|s| s.user_id == caller)
            .ok_or_else(|| BackendError::NotFound(format!("saved search {}", search.id)))?;

        stored.name = search.name.clone();
        stored.filters = search.filters.clone();
        stored.alerts_enabled = search.alerts_enabled;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_saved_search(&self, token: &str, id: Uuid) -> BackendResult<()> {
        let mut state = self.state.write().await;
        let caller = state.user_for(token)?;
        let owned = state
            .saved_searches
            .get(&id)
            .map_or(false, |s| s.user_id == caller);
        if owned {
            state.saved_searches.remove(&id);
        }
        Ok(())
    }

    async fn upload_avatar(
        &self,
        token: &str,
        user_id: Uuid,
        file_name: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<String> {
        let mut state = self.state.write().await;
        state.owner(token, user_id)?;
        let path = avatar_path(user_id, file_name);
        state.avatars.insert(path.clone(), bytes);
        Ok(format!("mock://avatars/{}", path))
    }
}
