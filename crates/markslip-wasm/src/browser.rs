use markslip_core::{Clock, Millis, PreferenceStore};
use web_sys::Storage;

/// Preferences kept in `window.localStorage`.
///
/// Private browsing can deny storage; reads then fall back to defaults and
/// writes are dropped with a console warning.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            tracing::warn!("localStorage unavailable, preferences will not persist");
        }
        Self { storage }
    }
}

impl PreferenceStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        let Some(storage) = &self.storage else {
            return;
        };
        if storage.set_item(key, value).is_err() {
            tracing::warn!(key, "could not store preference");
        }
    }
}

/// `Date.now()`
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> Millis {
        js_sys::Date::now().max(0.0) as Millis
    }
}
