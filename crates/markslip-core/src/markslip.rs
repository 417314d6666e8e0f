use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MarkError;
use crate::marks::{deserialize_marks, MarkEntry};
use crate::ordered::OrderedMap;
use crate::student::Student;
use crate::subject::SubjectMapping;
use crate::wire::{blank_date, blank_u32, lenient_datetime};

/// The four choices that identify a markslip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub class_name: String,
    pub session: String,
    pub exam_name: String,
    pub class_teacher: String,
}

/// Header fields and marks for one subject
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectData {
    #[serde(with = "blank_u32", default)]
    pub max_marks: Option<u32>,
    #[serde(default)]
    pub subject_teacher: String,
    #[serde(with = "blank_date", default)]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_marks")]
    pub marks: Vec<MarkEntry>,
}

impl SubjectData {
    /// Find the stored mark of a student.
    ///
    /// An entry carrying both of the student's numbers wins, then one with the
    /// same admission number, then one with the same roll number.
    pub fn mark_for(&self, student: &Student) -> Option<&MarkEntry> {
        self.marks
            .iter()
            .find(|m| m.roll_no == student.roll_no && m.admission_no == student.admission_no)
            .or_else(|| {
                self.marks.iter().find(|m| {
                    !m.admission_no.is_empty() && m.admission_no == student.admission_no
                })
            })
            .or_else(|| {
                self.marks
                    .iter()
                    .find(|m| student.matches(&m.roll_no, &m.admission_no))
            })
    }
}

/// Subject name to subject data, in subject order
pub type Subjects = OrderedMap<SubjectData>;

/// Links to a markslip file the backend already produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkslipInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub download_url: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Everything the backend needs to save or generate a markslip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkslipData {
    pub class_name: String,
    pub session: String,
    pub exam_name: String,
    #[serde(default)]
    pub class_teacher: String,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub subjects: Subjects,
    #[serde(default)]
    pub loaded_from_saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markslip_info: Option<MarkslipInfo>,
    /// Fields of a saved payload this client does not interpret; echoed back on save
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MarkslipData {
    /// Blank markslip for a freshly loaded roster, one empty subject per mapping entry
    pub fn fresh(selection: &Selection, students: Vec<Student>, mapping: &SubjectMapping) -> Self {
        Self {
            class_name: selection.class_name.clone(),
            session: selection.session.clone(),
            exam_name: selection.exam_name.clone(),
            class_teacher: selection.class_teacher.clone(),
            students,
            subjects: mapping
                .subjects()
                .map(|s| (s, SubjectData::default()))
                .collect(),
            loaded_from_saved: false,
            markslip_info: None,
            extra: Map::new(),
        }
    }

    pub fn selection(&self) -> Selection {
        Selection {
            class_name: self.class_name.clone(),
            session: self.session.clone(),
            exam_name: self.exam_name.clone(),
            class_teacher: self.class_teacher.clone(),
        }
    }

    pub fn subject(&self, subject: &str) -> Result<&SubjectData, MarkError> {
        self.subjects
            .get(subject)
            .ok_or_else(|| MarkError::UnknownSubject(subject.to_string()))
    }
}
