//! The backend's fixed action vocabulary and its response envelope.
//!
//! Reads travel as GET query parameters, writes as a POST JSON body. Every
//! response is `{success, data?, error?}`; some actions add top-level fields.

use markslip_core::{MarkslipData, MarkslipInfo, Selection, Student};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    GetDefaults,
    GetClasses,
    SmartCheck,
    LoadMarkslip,
    LoadStudents,
    SaveMarkslip,
    GenerateMarkslip,
    AutoSave,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GetDefaults => "getDefaults",
            Action::GetClasses => "getClasses",
            Action::SmartCheck => "smartCheck",
            Action::LoadMarkslip => "loadMarkslip",
            Action::LoadStudents => "loadStudents",
            Action::SaveMarkslip => "saveMarkslip",
            Action::GenerateMarkslip => "generateMarkslip",
            Action::AutoSave => "autoSave",
        }
    }

    /// Writes carry the markslip in a JSON body
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Action::SaveMarkslip | Action::GenerateMarkslip | Action::AutoSave
        )
    }
}

/// One call to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub action: Action,
    pub params: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn query(action: Action, params: Vec<(&'static str, String)>) -> Self {
        Self {
            action,
            params,
            body: None,
        }
    }

    /// POST `{action, markslipData}`
    pub fn write(action: Action, markslip: &MarkslipData) -> Result<Self, ApiError> {
        let body = json!({
            "action": action.as_str(),
            "markslipData": serde_json::to_value(markslip)?,
        });
        Ok(Self {
            action,
            params: Vec::new(),
            body: Some(body),
        })
    }

    pub fn get_defaults() -> Self {
        Self::query(Action::GetDefaults, Vec::new())
    }

    pub fn get_classes() -> Self {
        Self::query(Action::GetClasses, Vec::new())
    }

    pub fn smart_check(selection: &Selection) -> Self {
        Self::query(
            Action::SmartCheck,
            vec![
                ("className", selection.class_name.clone()),
                ("session", selection.session.clone()),
                ("examName", selection.exam_name.clone()),
                ("classTeacher", selection.class_teacher.clone()),
            ],
        )
    }

    pub fn load_markslip(markslip_id: &str) -> Self {
        Self::query(
            Action::LoadMarkslip,
            vec![("markslipId", markslip_id.to_string())],
        )
    }

    pub fn load_students(class_name: &str, session: &str) -> Self {
        Self::query(
            Action::LoadStudents,
            vec![
                ("className", class_name.to_string()),
                ("session", session.to_string()),
            ],
        )
    }

    /// Query string pairs, `action` first
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("action", self.action.as_str().to_string())];
        pairs.extend(self.params.iter().cloned());
        pairs
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Reject `success: false` envelopes, passing the backend's message through
pub fn check_envelope(body: Value) -> Result<Value, ApiError> {
    if body.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(body);
    }
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or("Unknown API error");
    Err(ApiError::Backend(message.to_string()))
}

/// Decode the envelope's `data` field
pub fn decode_data<T: DeserializeOwned>(mut body: Value) -> Result<T, ApiError> {
    match body.get_mut("data").map(Value::take) {
        Some(Value::Null) | None => Err(ApiError::MissingField("data")),
        Some(data) => Ok(serde_json::from_value(data)?),
    }
}

/// Timings are reported as JSON numbers, sometimes fractional
fn millis<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<f64>::deserialize(d)?;
    Ok(value.filter(|v| v.is_finite() && *v >= 0.0).map(|v| v.round() as u64))
}

/// Top-level fields of a `smartCheck` response
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartCheckOutcome {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub load_from_saved: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub markslip_info: Option<MarkslipInfo>,
    #[serde(default, deserialize_with = "millis")]
    pub performance_ms: Option<u64>,
}

impl SmartCheckOutcome {
    /// Only an existing markslip flagged for loading is reopened
    pub fn should_load_saved(&self) -> bool {
        self.exists && self.load_from_saved
    }
}

/// `getClasses` data: a bare list or `{classes: [...]}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ClassList {
    Bare(Vec<String>),
    Wrapped { classes: Vec<String> },
}

impl ClassList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ClassList::Bare(classes) | ClassList::Wrapped { classes } => classes,
        }
    }
}

/// `loadStudents` data
#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub students: Vec<Student>,
}

/// What the backend reports after a save, generate or auto-save
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "millis")]
    pub performance_ms: Option<u64>,
    #[serde(default)]
    pub markslip_info: Option<MarkslipInfo>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl WriteOutcome {
    /// File links, either top-level or inside `data`
    pub fn file_info(&self) -> Option<MarkslipInfo> {
        self.markslip_info.clone().or_else(|| {
            let data = self.data.as_ref()?;
            let info = data.get("markslipInfo").unwrap_or(data);
            serde_json::from_value(info.clone()).ok()
        })
    }
}
