use std::env;
use std::time::Duration;

/// Marker left in a deployment URL that was never filled in
pub const PLACEHOLDER_MARKER: &str = "YOUR_SCRIPT_ID";

/// Backend connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Apps Script web app URL; `None` when not configured
    pub url: Option<String>,
    /// Request timeout (native targets only)
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl BackendConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Load configuration from `.env` and environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let url = get("MARKSLIP_BACKEND_URL");
        let timeout_secs: u64 = get("MARKSLIP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()?;
        Ok(Self {
            url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// A blank URL or one still holding the placeholder does not count
    pub fn is_configured(&self) -> bool {
        self.endpoint().is_some()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty() && !u.contains(PLACEHOLDER_MARKER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BackendConfig::from_vars(vars(&[])).unwrap();
        assert!(!config.is_configured());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_configured_url() {
        let config = BackendConfig::from_vars(vars(&[
            ("MARKSLIP_BACKEND_URL", "https://script.google.com/macros/s/AKfy123/exec"),
            ("MARKSLIP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert!(config.is_configured());
        assert_eq!(
            config.endpoint(),
            Some("https://script.google.com/macros/s/AKfy123/exec")
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_placeholder_is_unconfigured() {
        let config = BackendConfig::new("https://script.google.com/macros/s/YOUR_SCRIPT_ID/exec");
        assert!(!config.is_configured());
        assert!(!BackendConfig::new("   ").is_configured());
    }

    #[test]
    fn test_bad_timeout() {
        let result = BackendConfig::from_vars(vars(&[("MARKSLIP_TIMEOUT_SECS", "soon")]));
        assert!(result.is_err());
    }
}
