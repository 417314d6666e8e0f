use serde::{Deserialize, Serialize};

use crate::defaults::Defaults;
use crate::error::MarkError;
use crate::markslip::Selection;

/// One of the four dropdowns in the configuration panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionField {
    Class,
    Session,
    Exam,
    ClassTeacher,
}

impl SelectionField {
    pub const ALL: [SelectionField; 4] = [
        SelectionField::Class,
        SelectionField::Session,
        SelectionField::Exam,
        SelectionField::ClassTeacher,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SelectionField::Class => "Class",
            SelectionField::Session => "Session",
            SelectionField::Exam => "Exam",
            SelectionField::ClassTeacher => "Class Teacher",
        }
    }

    /// Parse the JS-side field name (`class`, `session`, `exam`, `classTeacher`)
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "class" | "className" => Some(SelectionField::Class),
            "session" => Some(SelectionField::Session),
            "exam" | "examName" => Some(SelectionField::Exam),
            "classTeacher" | "teacher" => Some(SelectionField::ClassTeacher),
            _ => None,
        }
    }
}

/// Choices offered by the four dropdowns
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DropdownOptions {
    pub classes: Vec<String>,
    pub sessions: Vec<String>,
    pub exams: Vec<String>,
    pub teachers: Vec<String>,
}

impl DropdownOptions {
    /// Replace session, exam and teacher choices
    pub fn populate(&mut self, defaults: &Defaults) {
        self.sessions = defaults.sessions.clone();
        self.exams = defaults.exams.clone();
        self.teachers = defaults.teachers.clone();
    }

    pub fn populate_classes(&mut self, classes: Vec<String>) {
        self.classes = classes;
    }
}

/// Current values of the four dropdowns; `None` is the placeholder option
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionForm {
    pub class_name: Option<String>,
    pub session: Option<String>,
    pub exam_name: Option<String>,
    pub class_teacher: Option<String>,
}

impl SelectionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field; an empty value resets it to the placeholder
    pub fn set(&mut self, field: SelectionField, value: &str) {
        let value = Some(value.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        match field {
            SelectionField::Class => self.class_name = value,
            SelectionField::Session => self.session = value,
            SelectionField::Exam => self.exam_name = value,
            SelectionField::ClassTeacher => self.class_teacher = value,
        }
    }

    pub fn get(&self, field: SelectionField) -> Option<&str> {
        match field {
            SelectionField::Class => self.class_name.as_deref(),
            SelectionField::Session => self.session.as_deref(),
            SelectionField::Exam => self.exam_name.as_deref(),
            SelectionField::ClassTeacher => self.class_teacher.as_deref(),
        }
    }

    /// Whether the smart check button should be enabled
    pub fn is_complete(&self) -> bool {
        SelectionField::ALL.iter().all(|f| self.get(*f).is_some())
    }

    pub fn to_selection(&self) -> Result<Selection, MarkError> {
        let require = |field: SelectionField| {
            self.get(field)
                .map(str::to_string)
                .ok_or_else(|| MarkError::IncompleteSelection(field.label().to_string()))
        };
        Ok(Selection {
            class_name: require(SelectionField::Class)?,
            session: require(SelectionField::Session)?,
            exam_name: require(SelectionField::Exam)?,
            class_teacher: require(SelectionField::ClassTeacher)?,
        })
    }
}
