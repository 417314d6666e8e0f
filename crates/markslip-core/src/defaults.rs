use serde::{Deserialize, Serialize};

use crate::subject::SubjectMapping;

/// Dropdown choices and subject layout served by `getDefaults`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default)]
    pub sessions: Vec<String>,
    #[serde(default)]
    pub exams: Vec<String>,
    #[serde(default)]
    pub teachers: Vec<String>,
    #[serde(default)]
    pub subject_mapping: SubjectMapping,
}

impl Defaults {
    /// Built-in choices used when the backend is unconfigured or unreachable
    pub fn fallback() -> Self {
        Self {
            sessions: strings(&["2024-25", "2025-26", "2026-27"]),
            exams: strings(&["PT1", "HALFYEARLY", "PT2", "SSE"]),
            teachers: strings(&[
                "Ms. Sarah Johnson",
                "Mr. David Wilson",
                "Mrs. Emily Davis",
                "Mr. John Smith",
                "Ms. Lisa Brown",
                "Mr. Michael Jones",
            ]),
            subject_mapping: SubjectMapping::fallback(),
        }
    }
}

/// Class list used when the backend is unconfigured or unreachable
pub fn fallback_classes() -> Vec<String> {
    (1..=5)
        .flat_map(|grade| ["A", "B"].map(|section| format!("Class{grade}{section}")))
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_defaults() {
        let defaults = Defaults::fallback();
        assert_eq!(defaults.sessions, vec!["2024-25", "2025-26", "2026-27"]);
        assert_eq!(defaults.exams, vec!["PT1", "HALFYEARLY", "PT2", "SSE"]);
        assert_eq!(defaults.teachers.len(), 6);
        assert_eq!(defaults.subject_mapping.len(), 4);
    }

    #[test]
    fn test_fallback_classes() {
        let classes = fallback_classes();
        assert_eq!(classes.len(), 10);
        assert_eq!(classes[0], "Class1A");
        assert_eq!(classes[1], "Class1B");
        assert_eq!(classes[9], "Class5B");
    }

    #[test]
    fn test_deserialize_backend_defaults() {
        let defaults: Defaults = serde_json::from_str(
            r#"{
                "sessions": ["2025-26"],
                "exams": ["PT1"],
                "teachers": ["Mr. A"],
                "subjectMapping": {"Science": {"row": 12, "sheetName": "SCI"}}
            }"#,
        )
        .unwrap();
        assert_eq!(defaults.subject_mapping.first(), Some("Science"));
        assert_eq!(defaults.teachers, vec!["Mr. A"]);
    }
}
