use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised while editing or collecting a markslip
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum MarkError {
    /// Mark input is not a number
    #[error("Invalid mark \"{input}\" for roll {roll_no}")]
    InvalidMark { roll_no: String, input: String },

    /// Mark input is below zero
    #[error("Mark {value} for roll {roll_no} cannot be negative")]
    NegativeMark { roll_no: String, value: f64 },

    /// Maximum marks input is not a whole number
    #[error("Invalid maximum marks \"{input}\" for {subject}")]
    InvalidMaxMarks { subject: String, input: String },

    /// Exam date input is not a YYYY-MM-DD date
    #[error("Invalid exam date \"{input}\" for {subject}")]
    InvalidDate { subject: String, input: String },

    /// Subject is not part of the subject mapping
    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    /// No student card at this roster position
    #[error("No student at position {index} in {subject}")]
    UnknownStudent { subject: String, index: usize },

    /// An edit arrived before any roster or saved markslip was loaded
    #[error("No markslip data loaded")]
    NoData,

    /// One of the four selection fields is empty
    #[error("Please fill in all required fields ({0} is missing)")]
    IncompleteSelection(String),
}

impl MarkError {
    /// Stable machine-readable code for the error
    pub fn code(&self) -> &'static str {
        match self {
            MarkError::InvalidMark { .. } => "INVALID_MARK",
            MarkError::NegativeMark { .. } => "NEGATIVE_MARK",
            MarkError::InvalidMaxMarks { .. } => "INVALID_MAX_MARKS",
            MarkError::InvalidDate { .. } => "INVALID_DATE",
            MarkError::UnknownSubject(_) => "UNKNOWN_SUBJECT",
            MarkError::UnknownStudent { .. } => "UNKNOWN_STUDENT",
            MarkError::NoData => "NO_DATA",
            MarkError::IncompleteSelection(_) => "INCOMPLETE_SELECTION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(MarkError::UnknownSubject("Art".into()).code(), "UNKNOWN_SUBJECT");
        assert_eq!(
            MarkError::IncompleteSelection("Class".into()).code(),
            "INCOMPLETE_SELECTION"
        );
    }

    #[test]
    fn test_error_display() {
        let err = MarkError::InvalidMark {
            roll_no: "7".into(),
            input: "abc".into(),
        };
        assert_eq!(err.to_string(), "Invalid mark \"abc\" for roll 7");

        let err = MarkError::UnknownStudent {
            subject: "Maths".into(),
            index: 12,
        };
        assert_eq!(err.to_string(), "No student at position 12 in Maths");
    }
}
