//! Environment-driven configuration.

use crate::error::ConfigError;
use crate::pipeline::DEFAULT_PAGE_SIZE;

pub const BASE_URL_VAR: &str = "STUDENT_API_BASE_URL";
pub const PAGE_SIZE_VAR: &str = "ROSTER_PAGE_SIZE";
pub const DEFAULT_BASE_URL: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the student service, without a trailing slash.
    pub base_url: String,
    pub page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let base_url = get(BASE_URL_VAR)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let page_size = match get(PAGE_SIZE_VAR) {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidNumber {
                    name: PAGE_SIZE_VAR,
                    value: raw,
                })?,
        };

        Ok(Self { base_url, page_size })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.base_url, "/api");
        assert_eq!(config.page_size, 8);
    }

    #[test]
    fn override_strips_trailing_slash() {
        let config = ApiConfig::from_lookup(lookup(&[(BASE_URL_VAR, "http://school.test/api/")])).unwrap();
        assert_eq!(config.base_url, "http://school.test/api");
    }

    #[test]
    fn empty_override_falls_back_to_default() {
        let config = ApiConfig::from_lookup(lookup(&[(BASE_URL_VAR, "")])).unwrap();
        assert_eq!(config.base_url, "/api");
    }

    #[test]
    fn page_size_must_be_positive() {
        let err = ApiConfig::from_lookup(lookup(&[(PAGE_SIZE_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
        let config = ApiConfig::from_lookup(lookup(&[(PAGE_SIZE_VAR, "20")])).unwrap();
        assert_eq!(config.page_size, 20);
    }
}
