use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const THEME_KEY: &str = "theme";
pub const AUTO_SAVE_KEY: &str = "autoSaveEnabled";

/// Colour theme of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Unknown values fall back to light
    pub fn parse(value: &str) -> Self {
        match value {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon of the toggle button: the theme you would switch to
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Light => "fa-moon",
            Theme::Dark => "fa-sun",
        }
    }
}

/// String key/value storage that outlives a page load (e.g. `localStorage`)
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store for tests and headless use
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// The two persisted preference flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub auto_save_enabled: bool,
}

impl Preferences {
    pub fn load(store: &impl PreferenceStore) -> Self {
        Self {
            theme: store
                .get(THEME_KEY)
                .map(|v| Theme::parse(&v))
                .unwrap_or_default(),
            auto_save_enabled: store.get(AUTO_SAVE_KEY).as_deref() == Some("true"),
        }
    }

    pub fn save_theme(store: &mut impl PreferenceStore, theme: Theme) {
        store.set(THEME_KEY, theme.as_str());
    }

    pub fn save_auto_save(store: &mut impl PreferenceStore, enabled: bool) {
        store.set(AUTO_SAVE_KEY, if enabled { "true" } else { "false" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let prefs = Preferences::load(&MemoryStore::new());
        assert_eq!(prefs.theme, Theme::Light);
        assert!(!prefs.auto_save_enabled);
    }

    #[test]
    fn test_saved_values_reload() {
        let mut store = MemoryStore::new();
        Preferences::save_theme(&mut store, Theme::Dark);
        Preferences::save_auto_save(&mut store, true);

        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        assert_eq!(store.get("autoSaveEnabled").as_deref(), Some("true"));

        let prefs = Preferences::load(&store);
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(prefs.auto_save_enabled);
    }

    #[test]
    fn test_garbage_values() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "purple");
        store.set(AUTO_SAVE_KEY, "yes");
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.theme, Theme::Light);
        assert!(!prefs.auto_save_enabled);
    }

    #[test]
    fn test_theme_toggle_and_icon() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.icon(), "fa-sun");
        assert_eq!(Theme::Light.icon(), "fa-moon");
    }
}
