//! Dictionary lookup for UI strings.
//!
//! Dictionaries are nested JSON objects addressed by dotted keys such as
//! `"search.title"`. Lookups fall back to English, then to the key itself.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

const EN_JSON: &str = include_str!("../../locales/en.json");
const FR_JSON: &str = include_str!("../../locales/fr.json");

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Fr];

    /// Parses a language tag such as `fr` or `fr-CA`; unknown tags give `None`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "fr" => Some(Locale::Fr),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One locale's nested string table
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    root: Value,
}

impl Dictionary {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json).context("Failed to parse dictionary JSON")?;
        if !root.is_object() {
            anyhow::bail!("Dictionary root must be a JSON object");
        }
        Ok(Self { root })
    }

    /// String leaf at a dotted path; objects and non-strings count as missing
    pub fn lookup(&self, key: &str) -> Option<&str> {
        key.split('.')
            .try_fold(&self.root, |node, segment| node.get(segment))
            .and_then(Value::as_str)
    }
}

/// Replaces `{{name}}` placeholders in one pass over the template.
/// Placeholders without a value are kept, and substituted values are
/// never scanned again.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match params.iter().find(|(param, _)| *param == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Active locale plus every loaded dictionary
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    dictionaries: HashMap<Locale, Dictionary>,
}

impl Translator {
    /// Translator over the dictionaries compiled into the crate
    pub fn new(locale: Locale) -> Result<Self> {
        let mut dictionaries = HashMap::new();
        dictionaries.insert(
            Locale::En,
            Dictionary::from_json_str(EN_JSON).context("Bundled English dictionary is invalid")?,
        );
        dictionaries.insert(
            Locale::Fr,
            Dictionary::from_json_str(FR_JSON).context("Bundled French dictionary is invalid")?,
        );
        Ok(Self { locale, dictionaries })
    }

    /// Replaces bundled dictionaries with `<tag>.json` files found in `dir`
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut loaded = 0;
        for locale in Locale::ALL {
            let path = dir.join(format!("{}.json", locale.tag()));
            if !path.exists() {
                continue;
            }
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let dictionary = Dictionary::from_json_str(&json)
                .with_context(|| format!("Invalid dictionary {}", path.display()))?;
            self.dictionaries.insert(locale, dictionary);
            loaded += 1;
        }
        debug!("Loaded {} dictionaries from {}", loaded, dir.display());
        Ok(loaded)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn available_locales(&self) -> Vec<Locale> {
        Locale::ALL
            .into_iter()
            .filter(|l| self.dictionaries.contains_key(l))
            .collect()
    }

    fn resolve(&self, key: &str) -> Option<&str> {
        let active = self.dictionaries.get(&self.locale).and_then(|d| d.lookup(key));
        if active.is_some() {
            return active;
        }
        if self.locale != Locale::En {
            debug!("Key '{}' missing in {}, falling back to en", key, self.locale);
        }
        self.dictionaries.get(&Locale::En).and_then(|d| d.lookup(key))
    }

    /// Translated string, or the key itself when no dictionary has it
    pub fn t(&self, key: &str) -> String {
        match self.resolve(key) {
            Some(text) => text.to_string(),
            None => {
                warn!("Missing translation for '{}'", key);
                key.to_string()
            }
        }
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        interpolate(&self.t(key), params)
    }
}
