use crate::i18n::Locale;
use crate::map::MapConfig;
use reqwest::Url;
use thiserror::Error;
use tracing::{info, warn};

/// Values that mean "not configured yet" in starter `.env` files
const PLACEHOLDERS: [&str; 3] = ["your-project-url", "your-anon-key", "your_supabase_url"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Hosted mode needs both a backend URL and an anon key")]
    MissingCredentials,

    #[error("Backend URL '{0}' is not an http(s) URL")]
    InvalidBackendUrl(String),

    #[error("Anon key is not a valid header value")]
    InvalidAnonKey,
}

/// Parses a project URL, accepting only http and https
pub fn parse_backend_url(url: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(url).map_err(|_| ConfigError::InvalidBackendUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::InvalidBackendUrl(url.to_string()));
    }
    Ok(parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Hosted,
    Mock,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: Option<String>,
    pub anon_key: Option<String>,
    pub mode: BackendMode,
    pub locale: Locale,
    pub map: MapConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .or_else(|| lookup(&format!("NEXT_PUBLIC_{}", name)))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && !PLACEHOLDERS.iter().any(|p| v.contains(p)))
        };

        let backend_url = read("SUPABASE_URL").map(|url| url.trim_end_matches('/').to_string());
        let anon_key = read("SUPABASE_ANON_KEY");

        let mode = if backend_url.is_some() && anon_key.is_some() {
            info!("Backend configured, using hosted mode");
            BackendMode::Hosted
        } else {
            warn!("Backend URL or anon key missing, running in mock mode");
            BackendMode::Mock
        };

        let locale = match lookup("APP_LOCALE") {
            Some(tag) => Locale::from_tag(&tag).unwrap_or_else(|| {
                warn!("Unsupported locale '{}', using en", tag);
                Locale::En
            }),
            None => Locale::En,
        };

        Self {
            backend_url,
            anon_key,
            mode,
            locale,
            map: MapConfig::default(),
        }
    }

    pub fn is_mock(&self) -> bool {
        self.mode == BackendMode::Mock
    }

    /// URL and anon key for the hosted client, checked for shape
    pub fn hosted_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let (Some(url), Some(key)) = (self.backend_url.as_deref(), self.anon_key.as_deref()) else {
            return Err(ConfigError::MissingCredentials);
        };
        parse_backend_url(url)?;
        Ok((url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn hosted_when_both_values_present() {
        let cfg = config(&[
            ("SUPABASE_URL", "https://abc.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]);
        assert_eq!(cfg.mode, BackendMode::Hosted);
        assert_eq!(cfg.backend_url.as_deref(), Some("https://abc.supabase.co"));
    }

    #[test]
    fn accepts_public_prefix() {
        let cfg = config(&[
            ("NEXT_PUBLIC_SUPABASE_URL", "https://abc.supabase.co"),
            ("NEXT_PUBLIC_SUPABASE_ANON_KEY", "anon"),
        ]);
        assert!(!cfg.is_mock());
    }

    #[test]
    fn mock_when_missing_or_placeholder() {
        assert!(config(&[]).is_mock());
        assert!(config(&[("SUPABASE_URL", "https://abc.supabase.co")]).is_mock());
        assert!(config(&[
            ("SUPABASE_URL", "https://your-project-url.supabase.co"),
            ("SUPABASE_ANON_KEY", "your-anon-key"),
        ])
        .is_mock());
        assert!(config(&[("SUPABASE_URL", "  "), ("SUPABASE_ANON_KEY", "anon")]).is_mock());
    }

    #[test]
    fn hosted_credentials_are_checked() {
        let cfg = config(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]);
        assert_eq!(cfg.hosted_credentials(), Ok(("https://abc.supabase.co", "anon")));

        let cfg = config(&[("SUPABASE_URL", "abc.supabase.co"), ("SUPABASE_ANON_KEY", "anon")]);
        assert_eq!(
            cfg.hosted_credentials(),
            Err(ConfigError::InvalidBackendUrl("abc.supabase.co".to_string()))
        );

        assert_eq!(config(&[]).hosted_credentials(), Err(ConfigError::MissingCredentials));
    }

    #[test]
    fn backend_url_must_be_http() {
        assert!(parse_backend_url("http://localhost:54321").is_ok());
        assert!(parse_backend_url("ftp://abc.supabase.co").is_err());
        assert!(parse_backend_url("").is_err());
    }

    #[test]
    fn reads_locale() {
        assert_eq!(config(&[("APP_LOCALE", "fr-FR")]).locale, Locale::Fr);
        assert_eq!(config(&[("APP_LOCALE", "xx")]).locale, Locale::En);
        assert_eq!(config(&[]).locale, Locale::En);
    }
}
