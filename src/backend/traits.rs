use crate::backend::types::{AuthUser, OAuthProvider, Session, SignUpData, SignUpOutcome};
use crate::backend::BackendError;
use crate::config::BackendMode;
use crate::models::{Favorite, SavedSearch, UserProfile};
use async_trait::async_trait;
use uuid::Uuid;

pub type BackendResult<T> = Result<T, BackendError>;

/// Hosted auth, table and storage operations.
///
/// `token` is the caller's access token; row-level access is enforced by the
/// backend, not by callers.
#[async_trait]
pub trait Backend: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn sign_up(&self, data: &SignUpData) -> BackendResult<SignUpOutcome>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session>;

    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session>;

    async fn sign_out(&self, token: &str) -> BackendResult<()>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> BackendResult<()>;

    async fn update_user_password(&self, token: &str, password: &str) -> BackendResult<AuthUser>;

    /// URL the browser is sent to for a third-party sign-in
    fn oauth_authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> BackendResult<String>;

    async fn get_profile(&self, token: &str, user_id: Uuid) -> BackendResult<Option<UserProfile>>;

    async fn upsert_profile(&self, token: &str, profile: &UserProfile) -> BackendResult<UserProfile>;

    async fn list_favorites(&self, token: &str, user_id: Uuid) -> BackendResult<Vec<Favorite>>;

    async fn add_favorite(&self, token: &str, favorite: &Favorite) -> BackendResult<()>;

    async fn remove_favorite(&self, token: &str, user_id: Uuid, property_id: &str) -> BackendResult<()>;

    /// Newest first
    async fn list_saved_searches(&self, token: &str, user_id: Uuid) -> BackendResult<Vec<SavedSearch>>;

    async fn create_saved_search(&self, token: &str, search: &SavedSearch) -> BackendResult<SavedSearch>;

    async fn update_saved_search(&self, token: &str, search: &SavedSearch) -> BackendResult<SavedSearch>;

    async fn delete_saved_search(&self, token: &str, id: Uuid) -> BackendResult<()>;

    /// Stores the file in the avatars bucket and returns its public URL
    async fn upload_avatar(
        &self,
        token: &str,
        user_id: Uuid,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<String>;
}
