use serde::{Deserialize, Serialize};

use crate::wire::string_or_number;

/// A student row from the class roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(deserialize_with = "string_or_number")]
    pub roll_no: String,
    #[serde(deserialize_with = "string_or_number", default)]
    pub admission_no: String,
    #[serde(default)]
    pub display_name: String,
}

impl Student {
    pub fn new(
        roll_no: impl Into<String>,
        admission_no: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            roll_no: roll_no.into(),
            admission_no: admission_no.into(),
            display_name: display_name.into(),
        }
    }

    /// A stored mark belongs to this student if either identifier matches
    pub fn matches(&self, roll_no: &str, admission_no: &str) -> bool {
        (!roll_no.is_empty() && self.roll_no == roll_no)
            || (!admission_no.is_empty() && self.admission_no == admission_no)
    }
}
