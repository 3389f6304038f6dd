use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading settings from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set in .env file")]
    Missing(&'static str),
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Dashboard settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub page_size: u32,
    pub max_visible_pages: u32,
    pub request_timeout: Duration,
    pub show_fiat: bool,
}

impl Config {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;
    pub const DEFAULT_MAX_VISIBLE_PAGES: u32 = 5;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Read settings from the process environment (after `.env` has been loaded)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = get("DASHBOARD_API_URL").ok_or(ConfigError::Missing("DASHBOARD_API_URL"))?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "DASHBOARD_API_URL",
                value: api_url,
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }

        let page_size = parse_positive(
            get("DASHBOARD_PAGE_SIZE"),
            "DASHBOARD_PAGE_SIZE",
            Self::DEFAULT_PAGE_SIZE,
        )?;
        let max_visible_pages = parse_positive(
            get("DASHBOARD_MAX_VISIBLE_PAGES"),
            "DASHBOARD_MAX_VISIBLE_PAGES",
            Self::DEFAULT_MAX_VISIBLE_PAGES,
        )?;
        let timeout_secs = parse_positive(
            get("DASHBOARD_REQUEST_TIMEOUT_SECS"),
            "DASHBOARD_REQUEST_TIMEOUT_SECS",
            Self::DEFAULT_TIMEOUT_SECS,
        )?;

        let show_fiat = match get("DASHBOARD_SHOW_FIAT") {
            None => false,
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "DASHBOARD_SHOW_FIAT",
                        value,
                        reason: "expected true or false".to_string(),
                    })
                }
            },
        };

        Ok(Self {
            api_url,
            api_token: get("DASHBOARD_API_TOKEN"),
            page_size,
            max_visible_pages,
            request_timeout: Duration::from_secs(timeout_secs),
            show_fiat,
        })
    }
}

fn parse_positive<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected a positive integer".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DASHBOARD_API_URL", "http://localhost:3000/api")]).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.max_visible_pages, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.api_token, None);
        assert!(!config.show_fiat);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DASHBOARD_API_URL", "https://node.example/api"),
            ("DASHBOARD_API_TOKEN", "abc"),
            ("DASHBOARD_PAGE_SIZE", "25"),
            ("DASHBOARD_SHOW_FIAT", "yes"),
        ])
        .unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert!(config.show_fiat);
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("DASHBOARD_API_URL"))));
        assert!(matches!(
            load(&[("DASHBOARD_API_URL", "localhost")]),
            Err(ConfigError::Invalid { key: "DASHBOARD_API_URL", .. })
        ));
        assert!(matches!(
            load(&[("DASHBOARD_API_URL", "http://x"), ("DASHBOARD_PAGE_SIZE", "0")]),
            Err(ConfigError::Invalid { key: "DASHBOARD_PAGE_SIZE", .. })
        ));
        assert!(matches!(
            load(&[("DASHBOARD_API_URL", "http://x"), ("DASHBOARD_SHOW_FIAT", "maybe")]),
            Err(ConfigError::Invalid { key: "DASHBOARD_SHOW_FIAT", .. })
        ));
    }
}
