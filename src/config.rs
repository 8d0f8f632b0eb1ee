//! Runtime configuration from environment variables

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use directories::ProjectDirs;

use crate::domain::entities::query::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};

pub const DEFAULT_DEBOUNCE_MS: u64 = 800;
pub const DEFAULT_SEARCH_MIN_CHARS: usize = 5;
pub const DEFAULT_BANNER_DELAY_MS: u64 = 5000;
pub const DEFAULT_POS_ID: &str = "pos-roma-01";
pub const DEFAULT_INITIATIVE_ID: &str = "bonus-elettrodomestici";
pub const DEFAULT_LOG_FILTER: &str = "esercente=info,warn";

/// A variable that was set but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSetting {
    pub key: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    pub db_path: PathBuf,
    pub page_size: u32,
    pub debounce: Duration,
    pub search_min_chars: usize,
    pub banner_delay: Duration,
    pub pos_id: String,
    pub initiative_id: String,
    /// Bearer token handed to the session, if the merchant is signed in.
    pub session_token: Option<String>,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Collected while parsing; reported once logging is up.
    pub invalid: Vec<InvalidSetting>,
}

pub fn default_db_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("it", "esercente", "portal")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join("portal.sqlite"))
}

impl PortalConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut invalid = Vec::new();
        // Only sizes the table's page-size selector offers.
        let page_size = match lookup("ESERCENTE_PAGE_SIZE") {
            None => DEFAULT_PAGE_SIZE,
            Some(value) => match value.trim().parse::<u32>() {
                Ok(size) if PAGE_SIZE_OPTIONS.contains(&size) => size,
                _ => {
                    invalid.push(InvalidSetting {
                        key: "ESERCENTE_PAGE_SIZE",
                        value,
                    });
                    DEFAULT_PAGE_SIZE
                }
            },
        };
        let mut parsed = |key: &'static str| -> Option<u64> {
            let value = lookup(key)?;
            match value.trim().parse::<u64>() {
                Ok(number) if number > 0 => Some(number),
                _ => {
                    invalid.push(InvalidSetting { key, value });
                    None
                }
            }
        };

        let debounce_ms = parsed("ESERCENTE_DEBOUNCE_MS").unwrap_or(DEFAULT_DEBOUNCE_MS);
        let search_min_chars = parsed("ESERCENTE_SEARCH_MIN_CHARS")
            .and_then(|chars| usize::try_from(chars).ok())
            .unwrap_or(DEFAULT_SEARCH_MIN_CHARS);
        let banner_delay_ms =
            parsed("ESERCENTE_BANNER_DELAY_MS").unwrap_or(DEFAULT_BANNER_DELAY_MS);

        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let db_path = match non_empty("ESERCENTE_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        Ok(Self {
            db_path,
            page_size,
            debounce: Duration::from_millis(debounce_ms),
            search_min_chars,
            banner_delay: Duration::from_millis(banner_delay_ms),
            pos_id: non_empty("ESERCENTE_POS_ID").unwrap_or_else(|| DEFAULT_POS_ID.to_string()),
            initiative_id: non_empty("ESERCENTE_INITIATIVE_ID")
                .unwrap_or_else(|| DEFAULT_INITIATIVE_ID.to_string()),
            session_token: non_empty("ESERCENTE_SESSION_TOKEN"),
            log_filter: non_empty("ESERCENTE_LOG")
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            invalid,
        })
    }

    /// Directory holding the database, the WebView profile lives next to it.
    pub fn data_dir(&self) -> &Path {
        self.db_path.parent().unwrap_or_else(|| Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = PortalConfig::from_lookup(lookup_from(&[("ESERCENTE_DB_PATH", "/tmp/p.sqlite")]))
            .expect("config should load");

        assert_eq!(config.db_path, PathBuf::from("/tmp/p.sqlite"));
        assert_eq!(config.page_size, 10);
        assert_eq!(config.debounce, Duration::from_millis(800));
        assert_eq!(config.search_min_chars, 5);
        assert_eq!(config.banner_delay, Duration::from_millis(5000));
        assert_eq!(config.pos_id, DEFAULT_POS_ID);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.session_token, None);
        assert!(config.invalid.is_empty());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = PortalConfig::from_lookup(lookup_from(&[
            ("ESERCENTE_DB_PATH", "/tmp/p.sqlite"),
            ("ESERCENTE_PAGE_SIZE", "25"),
            ("ESERCENTE_DEBOUNCE_MS", " 300 "),
            ("ESERCENTE_POS_ID", "pos-milano-02"),
            ("ESERCENTE_LOG", "esercente=debug"),
            ("ESERCENTE_SESSION_TOKEN", "abc123"),
        ]))
        .expect("config should load");

        assert_eq!(config.page_size, 25);
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.pos_id, "pos-milano-02");
        assert_eq!(config.log_filter, "esercente=debug");
        assert_eq!(config.session_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn invalid_values_fall_back_and_are_reported() {
        let config = PortalConfig::from_lookup(lookup_from(&[
            ("ESERCENTE_DB_PATH", "/tmp/p.sqlite"),
            ("ESERCENTE_PAGE_SIZE", "0"),
            ("ESERCENTE_BANNER_DELAY_MS", "soon"),
        ]))
        .expect("config should load");

        assert_eq!(config.page_size, 10);
        assert_eq!(config.banner_delay, Duration::from_millis(5000));
        let keys: Vec<_> = config.invalid.iter().map(|setting| setting.key).collect();
        assert_eq!(keys, vec!["ESERCENTE_PAGE_SIZE", "ESERCENTE_BANNER_DELAY_MS"]);
    }

    #[test]
    fn page_size_must_be_one_of_the_selectable_sizes() {
        let odd = PortalConfig::from_lookup(lookup_from(&[
            ("ESERCENTE_DB_PATH", "/tmp/p.sqlite"),
            ("ESERCENTE_PAGE_SIZE", "7"),
        ]))
        .expect("config should load");
        let large = PortalConfig::from_lookup(lookup_from(&[
            ("ESERCENTE_DB_PATH", "/tmp/p.sqlite"),
            ("ESERCENTE_PAGE_SIZE", "50"),
        ]))
        .expect("config should load");

        assert_eq!(odd.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(
            odd.invalid,
            vec![InvalidSetting {
                key: "ESERCENTE_PAGE_SIZE",
                value: "7".to_string(),
            }]
        );
        assert_eq!(large.page_size, 50);
        assert!(large.invalid.is_empty());
    }

    #[test]
    fn default_db_path_uses_portal_app_directory() {
        let db_path = default_db_path().expect("default db path should resolve");
        assert_eq!(
            db_path.file_name().and_then(|name| name.to_str()),
            Some("portal.sqlite")
        );
    }
}
