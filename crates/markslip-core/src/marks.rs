use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::MarkError;
use crate::wire::{format_number, string_or_number};

/// Marks text sent for an absent student
pub const ABSENT_MARK: &str = "AB";

/// A student's result in one subject: a score or an absence, never both
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum MarkValue {
    Scored(f64),
    Absent,
}

impl MarkValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, MarkValue::Absent)
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            MarkValue::Scored(v) => Some(*v),
            MarkValue::Absent => None,
        }
    }

    /// Text shown in the marks column (`AB` for absent)
    pub fn as_marks_text(&self) -> String {
        match self {
            MarkValue::Scored(v) => format_number(*v),
            MarkValue::Absent => ABSENT_MARK.to_string(),
        }
    }
}

/// One student's mark in one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MarkEntryWire", into = "MarkEntryWire")]
pub struct MarkEntry {
    pub roll_no: String,
    pub admission_no: String,
    pub value: MarkValue,
}

impl MarkEntry {
    pub fn scored(roll_no: impl Into<String>, admission_no: impl Into<String>, value: f64) -> Self {
        Self {
            roll_no: roll_no.into(),
            admission_no: admission_no.into(),
            value: MarkValue::Scored(value),
        }
    }

    pub fn absent(roll_no: impl Into<String>, admission_no: impl Into<String>) -> Self {
        Self {
            roll_no: roll_no.into(),
            admission_no: admission_no.into(),
            value: MarkValue::Absent,
        }
    }
}

/// Shape of a mark entry as exchanged with the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkEntryWire {
    #[serde(deserialize_with = "string_or_number", default)]
    roll_no: String,
    #[serde(deserialize_with = "string_or_number", default)]
    admission_no: String,
    #[serde(deserialize_with = "string_or_number", default)]
    marks: String,
    #[serde(default)]
    is_absent: bool,
}

impl MarkEntryWire {
    fn is_blank(&self) -> bool {
        !self.is_absent && self.marks.is_empty()
    }
}

impl From<MarkEntry> for MarkEntryWire {
    fn from(entry: MarkEntry) -> Self {
        Self {
            roll_no: entry.roll_no,
            admission_no: entry.admission_no,
            marks: entry.value.as_marks_text(),
            is_absent: entry.value.is_absent(),
        }
    }
}

impl TryFrom<MarkEntryWire> for MarkEntry {
    type Error = MarkError;

    fn try_from(wire: MarkEntryWire) -> Result<Self, Self::Error> {
        // The absent flag wins over any stale numeric text.
        let value = if wire.is_absent || wire.marks.eq_ignore_ascii_case(ABSENT_MARK) {
            MarkValue::Absent
        } else {
            match parse_mark_input(&wire.roll_no, &wire.marks)? {
                Some(v) => MarkValue::Scored(v),
                None => {
                    return Err(MarkError::InvalidMark {
                        roll_no: wire.roll_no,
                        input: wire.marks,
                    })
                }
            }
        };
        Ok(Self {
            roll_no: wire.roll_no,
            admission_no: wire.admission_no,
            value,
        })
    }
}

/// Decode a subject's `marks` list.
///
/// The sheet keeps a row for every student, so a saved list can hold rows
/// with neither a mark nor the absent flag; those are skipped.
pub fn deserialize_marks<'de, D>(deserializer: D) -> Result<Vec<MarkEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Option::<Vec<MarkEntryWire>>::deserialize(deserializer)?.unwrap_or_default();
    rows.into_iter()
        .filter(|row| !row.is_blank())
        .map(|row| MarkEntry::try_from(row).map_err(de::Error::custom))
        .collect()
}

/// Parse the text of a marks input.
///
/// Blank input is no mark at all; anything else must be a non-negative number.
pub fn parse_mark_input(roll_no: &str, input: &str) -> Result<Option<f64>, MarkError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| MarkError::InvalidMark {
            roll_no: roll_no.to_string(),
            input: input.to_string(),
        })?;
    if value < 0.0 {
        return Err(MarkError::NegativeMark {
            roll_no: roll_no.to_string(),
            value,
        });
    }
    Ok(Some(value))
}
