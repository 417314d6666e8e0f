use serde::{Deserialize, Serialize};

use crate::ordered::OrderedMap;

/// Where a subject's marks live in the generated markslip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSlot {
    pub row: u32,
    pub sheet_name: String,
}

impl SubjectSlot {
    pub fn new(row: u32, sheet_name: impl Into<String>) -> Self {
        Self {
            row,
            sheet_name: sheet_name.into(),
        }
    }
}

/// Subject name to markslip slot, in tab order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectMapping(OrderedMap<SubjectSlot>);

impl SubjectMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping used when the backend cannot be reached
    pub fn fallback() -> Self {
        let mut mapping = Self::new();
        mapping.insert("Hindi", SubjectSlot::new(6, "HINDI"));
        mapping.insert("Maths", SubjectSlot::new(7, "MATHS"));
        mapping.insert("English", SubjectSlot::new(8, "ENGLISH"));
        mapping.insert("TWAU", SubjectSlot::new(9, "TWAU"));
        mapping
    }

    pub fn insert(&mut self, subject: impl Into<String>, slot: SubjectSlot) {
        self.0.insert(subject, slot);
    }

    pub fn get(&self, subject: &str) -> Option<&SubjectSlot> {
        self.0.get(subject)
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.0.contains_key(subject)
    }

    /// Subject names in tab order
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first_key()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_order() {
        let mapping = SubjectMapping::fallback();
        let subjects: Vec<_> = mapping.subjects().collect();
        assert_eq!(subjects, vec!["Hindi", "Maths", "English", "TWAU"]);
        assert_eq!(mapping.get("Maths"), Some(&SubjectSlot::new(7, "MATHS")));
        assert_eq!(mapping.first(), Some("Hindi"));
    }

    #[test]
    fn test_deserialize_keeps_key_order() {
        let json = r#"{
            "Science": {"row": 10, "sheetName": "SCIENCE"},
            "Art": {"row": 3, "sheetName": "ART"},
            "Maths": {"row": 7, "sheetName": "MATHS"}
        }"#;
        let mapping: SubjectMapping = serde_json::from_str(json).unwrap();
        let subjects: Vec<_> = mapping.subjects().collect();
        assert_eq!(subjects, vec!["Science", "Art", "Maths"]);
        assert!(mapping.contains("Art"));
        assert!(!mapping.contains("Hindi"));
    }

    #[test]
    fn test_serialize_as_object() {
        let mapping = SubjectMapping::fallback();
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["English"]["sheetName"], "ENGLISH");
        assert_eq!(json["TWAU"]["row"], 9);
    }
}
