use crate::models::Currency;
use crate::search::SearchFilters;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Buyer,
    Seller,
    Agent,
    Admin,
}

/// Free-form preference bag stored alongside the profile row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    #[serde(default)]
    pub currency: Currency,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_true")]
    pub email_notifications: bool,
    #[serde(default)]
    pub sms_notifications: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            language: default_language(),
            email_notifications: true,
            sms_notifications: false,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

/// Row of the `user_profiles` table; `id` equals the auth user id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: Uuid, email: impl Into<String>, full_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            full_name: full_name.into(),
            phone: None,
            avatar_url: None,
            role: UserRole::default(),
            preferences: UserPreferences::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Row of the `saved_searches` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedSearch {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub filters: SearchFilters,
    #[serde(default)]
    pub alerts_enabled: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl SavedSearch {
    pub fn new(user_id: Uuid, name: impl Into<String>, filters: SearchFilters) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            filters,
            alerts_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Row of the `user_favorites` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub user_id: Uuid,
    pub property_id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    pub fn new(user_id: Uuid, property_id: impl Into<String>) -> Self {
        Self {
            user_id,
            property_id: property_id.into(),
            created_at: Utc::now(),
        }
    }
}
