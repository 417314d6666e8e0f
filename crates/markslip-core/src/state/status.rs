use serde::{Deserialize, Serialize};

/// Outcome shown next to the smart check button
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SmartCheckStatus {
    #[default]
    Idle,
    Checking,
    /// A saved markslip exists and is being loaded
    LoadSaved { message: String, performance_ms: Option<u64> },
    /// No saved markslip; a fresh roster is being loaded
    LoadNew { message: String, performance_ms: Option<u64> },
    Failed { message: String },
}

impl SmartCheckStatus {
    pub fn is_checking(&self) -> bool {
        matches!(self, SmartCheckStatus::Checking)
    }

    pub fn icon(&self) -> Option<&'static str> {
        match self {
            SmartCheckStatus::Idle => None,
            SmartCheckStatus::Checking => Some("fa-clock"),
            SmartCheckStatus::LoadSaved { .. } => Some("fa-check-circle"),
            SmartCheckStatus::LoadNew { .. } => Some("fa-plus-circle"),
            SmartCheckStatus::Failed { .. } => Some("fa-exclamation-circle"),
        }
    }

    pub fn text(&self) -> String {
        match self {
            SmartCheckStatus::Idle => String::new(),
            SmartCheckStatus::Checking => "Performing smart ultra-fast check...".to_string(),
            SmartCheckStatus::LoadSaved { message, .. } => message.clone(),
            SmartCheckStatus::LoadNew { message, .. } => message.clone(),
            SmartCheckStatus::Failed { message } => format!("Error: {message}"),
        }
    }

    pub fn performance_text(&self) -> String {
        match self {
            SmartCheckStatus::Checking => "...".to_string(),
            SmartCheckStatus::LoadSaved { performance_ms: Some(ms), .. }
            | SmartCheckStatus::LoadNew { performance_ms: Some(ms), .. } => format!("{ms}ms"),
            _ => String::new(),
        }
    }
}

/// Where the marks in the entry grid came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    SavedData,
    MainSpreadsheet,
}

impl DataSource {
    pub fn from_saved(saved: bool) -> Self {
        if saved {
            DataSource::SavedData
        } else {
            DataSource::MainSpreadsheet
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataSource::SavedData => "Saved Data",
            DataSource::MainSpreadsheet => "Main Spreadsheet",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            DataSource::SavedData => "fa-save",
            DataSource::MainSpreadsheet => "fa-database",
        }
    }
}

/// Full-page loading overlay
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadingOverlay {
    pub visible: bool,
    pub text: String,
}

impl LoadingOverlay {
    pub fn show(&mut self, text: impl Into<String>) {
        self.visible = true;
        self.text = text.into();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}
