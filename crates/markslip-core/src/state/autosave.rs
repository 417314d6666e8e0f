use serde::{Deserialize, Serialize};

use super::clock::Millis;

/// Quiet period after the last edit before an auto-save fires
pub const AUTO_SAVE_DEBOUNCE_MS: Millis = 2_000;
/// How long "Auto-saved" stays visible
pub const SAVED_VISIBLE_MS: Millis = 2_000;
/// How long "Auto-save failed" stays visible
pub const FAILED_VISIBLE_MS: Millis = 3_000;

/// Auto-save badge in the page header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AutoSaveIndicator {
    #[default]
    Hidden,
    Saving,
    Saved { hide_at: Millis },
    Failed { hide_at: Millis },
}

impl AutoSaveIndicator {
    pub fn is_visible(&self) -> bool {
        !matches!(self, AutoSaveIndicator::Hidden)
    }

    pub fn text(&self) -> &'static str {
        match self {
            AutoSaveIndicator::Hidden => "",
            AutoSaveIndicator::Saving => "Auto-saving...",
            AutoSaveIndicator::Saved { .. } => "Auto-saved",
            AutoSaveIndicator::Failed { .. } => "Auto-save failed",
        }
    }

    pub fn shows_spinner(&self) -> bool {
        matches!(self, AutoSaveIndicator::Saving)
    }
}

/// Debounced auto-save: edits push a deadline back, a due deadline fires once
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSaveState {
    enabled: bool,
    pending_until: Option<Millis>,
    indicator: AutoSaveIndicator,
}

impl AutoSaveState {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turning auto-save off drops any pending save and hides the badge
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending_until = None;
            self.indicator = AutoSaveIndicator::Hidden;
        }
    }

    /// Record an edit; restarts the quiet period when enabled
    pub fn note_edit(&mut self, now: Millis) {
        if self.enabled {
            self.pending_until = Some(now + AUTO_SAVE_DEBOUNCE_MS);
        }
    }

    pub fn pending_until(&self) -> Option<Millis> {
        self.pending_until
    }

    pub fn has_pending(&self) -> bool {
        self.pending_until.is_some()
    }

    /// Consume the pending save if its deadline has passed
    pub fn take_due(&mut self, now: Millis) -> bool {
        match self.pending_until {
            Some(deadline) if self.enabled && now >= deadline => {
                self.pending_until = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending deadline because a save is happening right now
    pub fn take_pending(&mut self) {
        self.pending_until = None;
    }

    pub fn begin(&mut self) {
        self.indicator = AutoSaveIndicator::Saving;
    }

    pub fn finish(&mut self, success: bool, now: Millis) {
        self.indicator = if success {
            AutoSaveIndicator::Saved {
                hide_at: now + SAVED_VISIBLE_MS,
            }
        } else {
            AutoSaveIndicator::Failed {
                hide_at: now + FAILED_VISIBLE_MS,
            }
        };
    }

    pub fn hide_indicator(&mut self) {
        self.indicator = AutoSaveIndicator::Hidden;
    }

    pub fn indicator(&self) -> AutoSaveIndicator {
        self.indicator
    }

    /// Hide a finished badge once its display time is over
    pub fn tick(&mut self, now: Millis) {
        match self.indicator {
            AutoSaveIndicator::Saved { hide_at } | AutoSaveIndicator::Failed { hide_at }
                if now >= hide_at =>
            {
                self.indicator = AutoSaveIndicator::Hidden;
            }
            _ => {}
        }
    }
}
