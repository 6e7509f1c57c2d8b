//! Process configuration read from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::generation::http::DEFAULT_ENDPOINT;
use crate::generation::DEFAULT_MODEL;

/// Where generated content is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    Sqlite(PathBuf),
}

/// Settings for the server binary.
///
/// | Variable | Default |
/// |---|---|
/// | `PORT` | `8080` |
/// | `MENTOR_CATALOG` | embedded catalog |
/// | `MENTOR_GENERATION_URL` | OpenRouter chat completions |
/// | `MENTOR_GENERATION_API_KEY` | unset (generation disabled) |
/// | `MENTOR_GENERATION_MODEL` | `google/gemini-2.0-flash-001` |
/// | `MENTOR_GENERATION_TIMEOUT_SECS` | `120` |
/// | `MENTOR_GENERATION_MAX_RETRIES` | `2` |
/// | `MENTOR_STORE` | `memory`, or a SQLite file path |
#[derive(Debug, Clone, PartialEq)]
pub struct MentorConfig {
    pub port: u16,
    pub catalog_path: Option<PathBuf>,
    pub generation_url: String,
    pub generation_api_key: Option<String>,
    pub generation_model: String,
    pub generation_timeout: Duration,
    pub generation_max_retries: u32,
    pub store: StoreLocation,
}

impl Default for MentorConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl MentorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset; unparsable
    /// numbers fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            port: parse_or(get("PORT"), "PORT", 8080),
            catalog_path: get("MENTOR_CATALOG").map(PathBuf::from),
            generation_url: get("MENTOR_GENERATION_URL")
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            generation_api_key: get("MENTOR_GENERATION_API_KEY"),
            generation_model: get("MENTOR_GENERATION_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            generation_timeout: Duration::from_secs(parse_or(
                get("MENTOR_GENERATION_TIMEOUT_SECS"),
                "MENTOR_GENERATION_TIMEOUT_SECS",
                120,
            )),
            generation_max_retries: parse_or(
                get("MENTOR_GENERATION_MAX_RETRIES"),
                "MENTOR_GENERATION_MAX_RETRIES",
                2,
            ),
            store: match get("MENTOR_STORE") {
                None => StoreLocation::Memory,
                Some(v) if v.eq_ignore_ascii_case("memory") => StoreLocation::Memory,
                Some(path) => StoreLocation::Sqlite(PathBuf::from(path)),
            },
        }
    }

    pub fn generation_enabled(&self) -> bool {
        self.generation_api_key.is_some()
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparsable {}={:?}", key, raw);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MentorConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.catalog_path, None);
        assert_eq!(config.generation_url, DEFAULT_ENDPOINT);
        assert_eq!(config.generation_model, DEFAULT_MODEL);
        assert_eq!(config.generation_timeout, Duration::from_secs(120));
        assert_eq!(config.generation_max_retries, 2);
        assert_eq!(config.store, StoreLocation::Memory);
        assert!(!config.generation_enabled());
    }

    #[test]
    fn test_overrides() {
        let config = MentorConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("MENTOR_CATALOG", "/etc/mentor/catalog.yaml"),
            ("MENTOR_GENERATION_API_KEY", "sk-test"),
            ("MENTOR_GENERATION_MAX_RETRIES", "5"),
            ("MENTOR_STORE", "/var/lib/mentor/content.db"),
        ]));
        assert_eq!(config.port, 9000);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/etc/mentor/catalog.yaml")));
        assert!(config.generation_enabled());
        assert_eq!(config.generation_max_retries, 5);
        assert_eq!(
            config.store,
            StoreLocation::Sqlite(PathBuf::from("/var/lib/mentor/content.db"))
        );
    }

    #[test]
    fn test_bad_and_blank_values_use_defaults() {
        let config = MentorConfig::from_lookup(lookup(&[
            ("PORT", "not-a-port"),
            ("MENTOR_GENERATION_API_KEY", "  "),
            ("MENTOR_STORE", "MEMORY"),
        ]));
        assert_eq!(config.port, 8080);
        assert!(!config.generation_enabled());
        assert_eq!(config.store, StoreLocation::Memory);
    }
}
