use crate::backend::traits::{Backend, BackendResult};
use crate::backend::types::{AuthUser, OAuthProvider, Session, SignUpData, SignUpOutcome};
use crate::backend::BackendError;
use crate::config::{parse_backend_url, BackendMode, ConfigError};
use crate::models::{Favorite, SavedSearch, UserProfile};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const PROFILES_TABLE: &str = "user_profiles";
pub const FAVORITES_TABLE: &str = "user_favorites";
pub const SAVED_SEARCHES_TABLE: &str = "saved_searches";
pub const AVATAR_BUCKET: &str = "avatars";

/// REST client for a Supabase-compatible project
#[derive(Clone)]
pub struct SupabaseBackend {
    client: Client,
    url: String,
    anon_key: String,
}

impl SupabaseBackend {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> BackendResult<Self> {
        let url = url.into().trim_end_matches('/').to_string();
        let anon_key = anon_key.into();
        parse_backend_url(&url)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&anon_key).map_err(|_| ConfigError::InvalidAnonKey)?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        info!("Hosted backend client ready for {}", url);
        Ok(Self { client, url, anon_key })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, AVATAR_BUCKET, path)
    }

    pub fn public_object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.url, AVATAR_BUCKET, path)
    }

    /// Bearer is the user's token when given, the anon key otherwise
    fn bearer(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let token = token.unwrap_or(&self.anon_key);
        request.header(AUTHORIZATION, format!("Bearer {}", token))
    }

    async fn check(response: Response) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!("Backend returned {}: {}", status, body);
        Err(BackendError::from_status(status, body))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
        let response = Self::check(response).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// PostgREST returns arrays even for single-row writes
    fn first_row<T>(rows: Vec<T>, what: &str) -> BackendResult<T> {
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(what.to_string()))
    }
}

impl BackendError {
    fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => BackendError::Unauthenticated,
            StatusCode::FORBIDDEN => BackendError::Forbidden(body),
            StatusCode::CONFLICT => BackendError::Conflict(body),
            StatusCode::NOT_FOUND => BackendError::NotFound(body),
            _ => BackendError::Http {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// The token endpoint answers 400 for both bad credentials and
    /// unconfirmed accounts; the body's error code tells them apart
    fn from_sign_in_rejection(body: String) -> Self {
        fn field<'a>(value: &'a serde_json::Value, key: &str) -> &'a str {
            value.get(key).and_then(|v| v.as_str()).unwrap_or_default()
        }

        let value: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
        let code = Some(field(&value, "error_code"))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| field(&value, "error"));
        let description = Some(field(&value, "error_description"))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| field(&value, "msg"))
            .to_lowercase();

        match code {
            "email_not_confirmed" => BackendError::EmailNotConfirmed,
            "invalid_grant" if description.contains("not confirmed") => BackendError::EmailNotConfirmed,
            "invalid_grant" | "invalid_credentials" => BackendError::InvalidCredentials,
            _ => {
                warn!("Unrecognised sign-in rejection: {}", body);
                BackendError::Http { status: 400, body }
            }
        }
    }
}

#[async_trait]
impl Backend for SupabaseBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Hosted
    }

    #[tracing::instrument(skip(self, data), fields(email = %data.email))]
    async fn sign_up(&self, data: &SignUpData) -> BackendResult<SignUpOutcome> {
        let body = json!({
            "email": data.email,
            "password": data.password,
            "data": data.metadata(),
        });
        let response = self
            .bearer(self.client.post(self.auth_url("signup")), None)
            .json(&body)
            .send()
            .await?;
        let value: serde_json::Value = Self::json(response).await?;

        // With email confirmation on, the endpoint answers with the bare user
        if value.get("access_token").is_some() {
            let session: Session = serde_json::from_value(value)?;
            Ok(SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user: AuthUser = serde_json::from_value(value)?;
            debug!("Sign-up for {} awaits email confirmation", data.email);
            Ok(SignUpOutcome { user, session: None })
        }
    }

    #[tracing::instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let response = self
            .bearer(self.client.post(self.auth_url("token")), None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::from_sign_in_rejection(body));
        }
        Self::json(response).await
    }

    #[tracing::instrument(skip(self, refresh_token))]
    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session> {
        let response = self
            .bearer(self.client.post(self.auth_url("token")), None)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        Self::json(response).await
    }

    #[tracing::instrument(skip(self, token))]
    async fn sign_out(&self, token: &str) -> BackendResult<()> {
        let response = self
            .bearer(self.client.post(self.auth_url("logout")), Some(token))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> BackendResult<()> {
        let mut request = self
            .bearer(self.client.post(self.auth_url("recover")), None)
            .json(&json!({ "email": email }));
        if let Some(redirect) = redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }
        Self::check(request.send().await?).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, token, password))]
    async fn update_user_password(&self, token: &str, password: &str) -> BackendResult<AuthUser> {
        let response = self
            .bearer(self.client.put(self.auth_url("user")), Some(token))
            .json(&json!({ "password": password }))
            .send()
            .await?;
        Self::json(response).await
    }

    fn oauth_authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> BackendResult<String> {
        let provider = provider.to_string();
        let url = Url::parse_with_params(
            &self.auth_url("authorize"),
            &[("provider", provider.as_str()), ("redirect_to", redirect_to)],
        )
        .map_err(|_| ConfigError::InvalidBackendUrl(self.url.clone()))?;
        Ok(url.to_string())
    }

    #[tracing::instrument(skip(self, token))]
    async fn get_profile(&self, token: &str, user_id: Uuid) -> BackendResult<Option<UserProfile>> {
        let response = self
            .bearer(self.client.get(self.rest_url(PROFILES_TABLE)), Some(token))
            .query(&[("id", format!("eq.{}", user_id)), ("select", "*".to_string())])
            .send()
            .await?;
        let rows: Vec<UserProfile> = Self::json(response).await?;
        Ok(rows.into_iter().next())
    }

    #[tracing::instrument(skip(self, token, profile), fields(id = %profile.id))]
    async fn upsert_profile(&self, token: &str, profile: &UserProfile) -> BackendResult<UserProfile> {
        let response = self
            .bearer(self.client.post(self.rest_url(PROFILES_TABLE)), Some(token))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(profile)
            .send()
            .await?;
        let rows: Vec<UserProfile> = Self::json(response).await?;
        Self::first_row(rows, "profile")
    }

    #[tracing::instrument(skip(self, token))]
    async fn list_favorites(&self, token: &str, user_id: Uuid) -> BackendResult<Vec<Favorite>> {
        let response = self
            .bearer(self.client.get(self.rest_url(FAVORITES_TABLE)), Some(token))
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;
        Self::json(response).await
    }

    #[tracing::instrument(skip(self, token, favorite), fields(property = %favorite.property_id))]
    async fn add_favorite(&self, token: &str, favorite: &Favorite) -> BackendResult<()> {
        let response = self
            .bearer(self.client.post(self.rest_url(FAVORITES_TABLE)), Some(token))
            .json(favorite)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, token))]
    async fn remove_favorite(&self, token: &str, user_id: Uuid, property_id: &str) -> BackendResult<()> {
        let response = self
            .bearer(self.client.delete(self.rest_url(FAVORITES_TABLE)), Some(token))
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("property_id", format!("eq.{}", property_id)),
            ])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, token))]
    async fn list_saved_searches(&self, token: &str, user_id: Uuid) -> BackendResult<Vec<SavedSearch>> {
        let response = self
            .bearer(self.client.get(self.rest_url(SAVED_SEARCHES_TABLE)), Some(token))
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;
        Self::json(response).await
    }

    #[tracing::instrument(skip(self, token, search), fields(name = %search.name))]
    async fn create_saved_search(&self, token: &str, search: &SavedSearch) -> BackendResult<SavedSearch> {
        let response = self
            .bearer(self.client.post(self.rest_url(SAVED_SEARCHES_TABLE)), Some(token))
            .header("Prefer", "return=representation")
            .json(search)
            .send()
            .await?;
        let rows: Vec<SavedSearch> = Self::json(response).await?;
        Self::first_row(rows, "saved search")
    }

    #[tracing::instrument(skip(self, token, search), fields(id = %search.id))]
    async fn update_saved_search(&self, token: &str, search: &SavedSearch) -> BackendResult<SavedSearch> {
        let body = json!({
            "name": search.name,
            "filters": search.filters,
            "alerts_enabled": search.alerts_enabled,
            "updated_at": Utc::now(),
        });
        let response = self
            .bearer(self.client.patch(self.rest_url(SAVED_SEARCHES_TABLE)), Some(token))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", search.id))])
            .json(&body)
            .send()
            .await?;
        let rows: Vec<SavedSearch> = Self::json(response).await?;
        Self::first_row(rows, "saved search")
    }

    #[tracing::instrument(skip(self, token))]
    async fn delete_saved_search(&self, token: &str, id: Uuid) -> BackendResult<()> {
        let response = self
            .bearer(self.client.delete(self.rest_url(SAVED_SEARCHES_TABLE)), Some(token))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, token, bytes), fields(size = bytes.len()))]
    async fn upload_avatar(
        &self,
        token: &str,
        user_id: Uuid,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<String> {
        let path = avatar_path(user_id, file_name);
        let response = self
            .bearer(self.client.post(self.object_url(&path)), Some(token))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(self.public_object_url(&path))
    }
}

/// `<user id>/<file name>` with any directory part of the name stripped
pub fn avatar_path(user_id: Uuid, file_name: &str) -> String {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("avatar");
    format!("{}/{}", user_id, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchFilters;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn backend() -> SupabaseBackend {
        SupabaseBackend::new("https://demo.supabase.co/", "anon-key").unwrap()
    }

    /// Reads one request: headers plus a `content-length` body
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serves a single canned response and hands back the raw request
    async fn serve_once(status: &'static str, body: String) -> (SupabaseBackend, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (SupabaseBackend::new(url, "anon-key").unwrap(), handle)
    }

    fn session_json(user_id: Uuid) -> String {
        json!({
            "access_token": "user-token",
            "refresh_token": "refresh-1",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": { "id": user_id, "email": "ada@example.com" },
        })
        .to_string()
    }

    #[tokio::test]
    async fn sign_in_posts_password_grant_with_anon_bearer() {
        let user_id = Uuid::new_v4();
        let (backend, request) = serve_once("200 OK", session_json(user_id)).await;

        let session = backend
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.user.id, user_id);
        assert_eq!(session.access_token, "user-token");

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /auth/v1/token?grant_type=password "));
        assert!(request.contains("apikey: anon-key"));
        assert!(request.contains("authorization: bearer anon-key"));
        assert!(request.contains(r#""email":"ada@example.com""#));
    }

    #[tokio::test]
    async fn sign_in_reports_unconfirmed_email() {
        let body = json!({
            "code": 400,
            "error_code": "email_not_confirmed",
            "msg": "Email not confirmed",
        });
        let (backend, _request) = serve_once("400 Bad Request", body.to_string()).await;

        let err = backend
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::EmailNotConfirmed));
    }

    #[tokio::test]
    async fn sign_in_reports_bad_credentials() {
        let body = json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials",
        });
        let (backend, _request) = serve_once("400 Bad Request", body.to_string()).await;

        let err = backend
            .sign_in_with_password("ada@example.com", "wrong-pw")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidCredentials));
    }

    #[test]
    fn classifies_sign_in_rejections() {
        let legacy = json!({ "error": "invalid_grant", "error_description": "Email not confirmed" });
        assert!(matches!(
            BackendError::from_sign_in_rejection(legacy.to_string()),
            BackendError::EmailNotConfirmed
        ));
        let coded = json!({ "error_code": "invalid_credentials", "msg": "Invalid login credentials" });
        assert!(matches!(
            BackendError::from_sign_in_rejection(coded.to_string()),
            BackendError::InvalidCredentials
        ));
        assert!(matches!(
            BackendError::from_sign_in_rejection("not json".into()),
            BackendError::Http { status: 400, .. }
        ));
    }

    #[tokio::test]
    async fn duplicate_favorite_is_a_conflict() {
        let body = json!({ "code": "23505", "message": "duplicate key value" });
        let (backend, request) = serve_once("409 Conflict", body.to_string()).await;

        let favorite = Favorite::new(Uuid::new_v4(), "prop-1");
        let err = backend.add_favorite("user-token", &favorite).await.unwrap_err();
        assert!(matches!(err, BackendError::Conflict(body) if body.contains("23505")));

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /rest/v1/user_favorites "));
        assert!(request.contains("authorization: bearer user-token"));
        assert!(request.contains("apikey: anon-key"));
    }

    #[tokio::test]
    async fn created_saved_search_is_unwrapped_from_row_array() {
        let user_id = Uuid::new_v4();
        let search = SavedSearch::new(user_id, "Lake houses", SearchFilters::default());
        let body = serde_json::to_string(&vec![&search]).unwrap();
        let (backend, request) = serve_once("201 Created", body).await;

        let created = backend.create_saved_search("user-token", &search).await.unwrap();
        assert_eq!(created.id, search.id);
        assert_eq!(created.name, "Lake houses");

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /rest/v1/saved_searches "));
        assert!(request.contains("prefer: return=representation"));
    }

    #[tokio::test]
    async fn empty_row_array_is_not_found() {
        let (backend, _request) = serve_once("200 OK", "[]".to_string()).await;
        let search = SavedSearch::new(Uuid::new_v4(), "Gone", SearchFilters::default());

        let err = backend.update_saved_search("user-token", &search).await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[tokio::test]
    async fn profile_upsert_merges_duplicates() {
        let profile = UserProfile::new(Uuid::new_v4(), "ada@example.com", "Ada");
        let body = serde_json::to_string(&vec![&profile]).unwrap();
        let (backend, request) = serve_once("201 Created", body).await;

        let saved = backend.upsert_profile("user-token", &profile).await.unwrap();
        assert_eq!(saved.id, profile.id);

        let request = request.await.unwrap().to_lowercase();
        assert!(request.contains("prefer: resolution=merge-duplicates,return=representation"));
    }

    #[test]
    fn builds_endpoint_urls() {
        let b = backend();
        assert_eq!(b.auth_url("signup"), "https://demo.supabase.co/auth/v1/signup");
        assert_eq!(b.rest_url(FAVORITES_TABLE), "https://demo.supabase.co/rest/v1/user_favorites");
        assert_eq!(
            b.public_object_url("u/a.png"),
            "https://demo.supabase.co/storage/v1/object/public/avatars/u/a.png"
        );
    }

    #[test]
    fn oauth_url_encodes_redirect() {
        let url = backend()
            .oauth_authorize_url(OAuthProvider::Github, "https://app.example.com/auth/callback?next=/")
            .unwrap();
        assert!(url.starts_with("https://demo.supabase.co/auth/v1/authorize?provider=github&redirect_to="));
        assert!(url.contains("https%3A%2F%2Fapp.example.com%2Fauth%2Fcallback%3Fnext%3D%2F"));
    }

    #[test]
    fn avatar_path_strips_directories() {
        let id = Uuid::nil();
        assert_eq!(avatar_path(id, "../../etc/me.png"), format!("{}/me.png", id));
        assert_eq!(avatar_path(id, "C:\\pics\\me.jpg"), format!("{}/me.jpg", id));
        assert_eq!(avatar_path(id, "dir/"), format!("{}/avatar", id));
    }

    #[test]
    fn maps_status_codes() {
        assert!(matches!(
            BackendError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            BackendError::Unauthenticated
        ));
        assert!(matches!(
            BackendError::from_status(StatusCode::CONFLICT, "dup".into()),
            BackendError::Conflict(body) if body == "dup"
        ));
        assert!(matches!(
            BackendError::from_status(StatusCode::BAD_GATEWAY, "down".into()),
            BackendError::Http { status: 502, .. }
        ));
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            SupabaseBackend::new("https://demo.supabase.co", "bad\nkey"),
            Err(BackendError::Config(ConfigError::InvalidAnonKey))
        ));
        assert!(matches!(
            SupabaseBackend::new("demo.supabase.co", "anon-key"),
            Err(BackendError::Config(ConfigError::InvalidBackendUrl(_)))
        ));
    }
}
