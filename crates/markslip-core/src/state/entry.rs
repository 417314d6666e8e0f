use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::status::DataSource;
use crate::error::MarkError;
use crate::marks::{parse_mark_input, MarkEntry, MarkValue};
use crate::markslip::{MarkslipData, SubjectData, Subjects};
use crate::student::Student;
use crate::subject::SubjectMapping;
use crate::wire::{format_number, parse_whole_number, DATE_FORMAT};

/// Marks input and absent checkbox for one student in one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCard {
    pub student: Student,
    pub mark_input: String,
    pub absent: bool,
}

impl StudentCard {
    pub fn new(student: Student, existing: Option<&MarkEntry>) -> Self {
        let (mark_input, absent) = match existing.map(|m| m.value) {
            Some(MarkValue::Scored(v)) => (format_number(v), false),
            Some(MarkValue::Absent) => (String::new(), true),
            None => (String::new(), false),
        };
        Self {
            student,
            mark_input,
            absent,
        }
    }

    /// The marks input is disabled while the student is marked absent
    pub fn input_enabled(&self) -> bool {
        !self.absent
    }

    /// Returns false when the input is disabled and the edit was ignored
    pub fn set_mark_input(&mut self, input: &str) -> bool {
        if self.absent {
            return false;
        }
        self.mark_input = input.to_string();
        true
    }

    /// Checking absent clears the typed mark
    pub fn set_absent(&mut self, absent: bool) {
        self.absent = absent;
        if absent {
            self.mark_input.clear();
        }
    }

    /// Entry for the payload, or `None` when nothing was entered
    pub fn to_entry(&self) -> Result<Option<MarkEntry>, MarkError> {
        let roll = &self.student.roll_no;
        let admission = &self.student.admission_no;
        if self.absent {
            return Ok(Some(MarkEntry::absent(roll, admission)));
        }
        Ok(parse_mark_input(roll, &self.mark_input)?
            .map(|value| MarkEntry::scored(roll, admission, value)))
    }
}

/// Header inputs and student cards of one subject tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectForm {
    pub subject: String,
    pub max_marks_input: String,
    pub subject_teacher: String,
    pub teacher_options: Vec<String>,
    pub date_input: String,
    pub cards: Vec<StudentCard>,
}

impl SubjectForm {
    /// Build the form from stored subject data and the class roster
    pub fn new(subject: &str, data: &SubjectData, students: &[Student], class_teacher: &str) -> Self {
        let teacher_options = if class_teacher.is_empty() {
            Vec::new()
        } else {
            vec![class_teacher.to_string()]
        };
        Self {
            subject: subject.to_string(),
            max_marks_input: data.max_marks.map(|m| m.to_string()).unwrap_or_default(),
            subject_teacher: data.subject_teacher.clone(),
            teacher_options,
            date_input: data
                .date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            cards: students
                .iter()
                .map(|s| StudentCard::new(s.clone(), data.mark_for(s)))
                .collect(),
        }
    }

    /// Cards are addressed by roster position; roll numbers can be blank or repeated
    pub fn card_mut(&mut self, index: usize) -> Result<&mut StudentCard, MarkError> {
        let subject = &self.subject;
        self.cards
            .get_mut(index)
            .ok_or_else(|| MarkError::UnknownStudent {
                subject: subject.clone(),
                index,
            })
    }

    pub fn card(&self, index: usize) -> Option<&StudentCard> {
        self.cards.get(index)
    }

    pub fn set_mark(&mut self, index: usize, input: &str) -> Result<bool, MarkError> {
        Ok(self.card_mut(index)?.set_mark_input(input))
    }

    pub fn set_absent(&mut self, index: usize, absent: bool) -> Result<(), MarkError> {
        self.card_mut(index)?.set_absent(absent);
        Ok(())
    }

    fn max_marks(&self) -> Result<Option<u32>, MarkError> {
        let raw = self.max_marks_input.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        parse_whole_number(raw)
            .map(Some)
            .ok_or_else(|| MarkError::InvalidMaxMarks {
                subject: self.subject.clone(),
                input: self.max_marks_input.clone(),
            })
    }

    fn date(&self) -> Result<Option<NaiveDate>, MarkError> {
        let raw = self.date_input.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| MarkError::InvalidDate {
                subject: self.subject.clone(),
                input: self.date_input.clone(),
            })
    }

    /// Read the form back into subject data.
    ///
    /// Only students with a mark or the absent flag produce an entry. The
    /// maximum marks is a hint for the page and does not cap the marks.
    pub fn collect(&self) -> Result<SubjectData, MarkError> {
        let max_marks = self.max_marks()?;
        let mut marks = Vec::new();
        for card in &self.cards {
            if let Some(entry) = card.to_entry()? {
                marks.push(entry);
            }
        }
        Ok(SubjectData {
            max_marks,
            subject_teacher: self.subject_teacher.clone(),
            date: self.date()?,
            marks,
        })
    }
}

/// The markslip being edited: loaded data plus one form per subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySession {
    pub data: MarkslipData,
    pub forms: Vec<SubjectForm>,
    pub active_subject: Option<String>,
    pub source: DataSource,
}

impl EntrySession {
    /// Lay out forms in mapping order; the first subject starts active
    pub fn new(data: MarkslipData, mapping: &SubjectMapping) -> Self {
        let empty = SubjectData::default();
        let forms = mapping
            .subjects()
            .map(|subject| {
                let stored = data.subjects.get(subject).unwrap_or(&empty);
                SubjectForm::new(subject, stored, &data.students, &data.class_teacher)
            })
            .collect();
        Self {
            source: DataSource::from_saved(data.loaded_from_saved),
            active_subject: mapping.first().map(str::to_string),
            forms,
            data,
        }
    }

    pub fn form(&self, subject: &str) -> Option<&SubjectForm> {
        self.forms.iter().find(|f| f.subject == subject)
    }

    pub fn form_mut(&mut self, subject: &str) -> Result<&mut SubjectForm, MarkError> {
        self.forms
            .iter_mut()
            .find(|f| f.subject == subject)
            .ok_or_else(|| MarkError::UnknownSubject(subject.to_string()))
    }

    pub fn select_subject(&mut self, subject: &str) -> Result<(), MarkError> {
        if self.form(subject).is_none() {
            return Err(MarkError::UnknownSubject(subject.to_string()));
        }
        self.active_subject = Some(subject.to_string());
        Ok(())
    }

    /// Loaded data with every subject rebuilt from the forms
    pub fn collect(&self) -> Result<MarkslipData, MarkError> {
        let mut subjects = Subjects::new();
        for form in &self.forms {
            subjects.insert(form.subject.clone(), form.collect()?);
        }
        Ok(MarkslipData {
            subjects,
            ..self.data.clone()
        })
    }

    pub fn student_count(&self) -> usize {
        self.data.students.len()
    }

    /// e.g. `Class3A - PT1 (2025-26) - 32 students`
    pub fn subtitle(&self) -> String {
        format!(
            "{} - {} ({}) - {} students",
            self.data.class_name,
            self.data.exam_name,
            self.data.session,
            self.student_count()
        )
    }

    /// The view button is offered only for saved markslips with file info
    pub fn can_view_markslip(&self) -> bool {
        self.source == DataSource::SavedData && self.data.markslip_info.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markslip::{MarkslipInfo, Selection};

    fn students() -> Vec<Student> {
        vec![
            Student::new("1", "A101", "Asha Verma"),
            Student::new("2", "A102", "Bilal Khan"),
            Student::new("3", "A103", "Chitra Rao"),
        ]
    }

    fn fresh_session() -> EntrySession {
        let selection = Selection {
            class_name: "Class3A".into(),
            session: "2025-26".into(),
            exam_name: "PT1".into(),
            class_teacher: "Mrs. Emily Davis".into(),
        };
        let mapping = SubjectMapping::fallback();
        EntrySession::new(MarkslipData::fresh(&selection, students(), &mapping), &mapping)
    }

    #[test]
    fn test_absent_clears_and_disables_input() {
        let mut card = StudentCard::new(Student::new("1", "A101", "Asha"), None);
        assert!(card.set_mark_input("18"));
        card.set_absent(true);
        assert_eq!(card.mark_input, "");
        assert!(!card.input_enabled());
        assert!(!card.set_mark_input("19"));
        assert_eq!(card.mark_input, "");
    }

    #[test]
    fn test_mark_and_absent_collects_as_absent() {
        // A card carrying both a typed mark and the absent flag
        let card = StudentCard {
            student: Student::new("1", "A101", "Asha"),
            mark_input: "17".into(),
            absent: true,
        };
        let entry = card.to_entry().unwrap().unwrap();
        assert_eq!(entry.value, MarkValue::Absent);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["marks"], "AB");
        assert_eq!(json["isAbsent"], true);
    }

    #[test]
    fn test_collect_skips_blank_cards() {
        let mut session = fresh_session();
        let form = session.form_mut("Maths").unwrap();
        form.max_marks_input = "20".into();
        form.date_input = "2025-07-04".into();
        form.subject_teacher = "Mrs. Emily Davis".into();
        form.set_mark(0, "18.5").unwrap();
        form.set_absent(2, true).unwrap();

        let data = session.collect().unwrap();
        let maths = data.subject("Maths").unwrap();
        assert_eq!(maths.max_marks, Some(20));
        assert_eq!(maths.date, NaiveDate::from_ymd_opt(2025, 7, 4));
        assert_eq!(maths.marks.len(), 2);
        assert_eq!(maths.marks[0], MarkEntry::scored("1", "A101", 18.5));
        assert_eq!(maths.marks[1], MarkEntry::absent("3", "A103"));

        let hindi = data.subject("Hindi").unwrap();
        assert!(hindi.marks.is_empty());
        assert_eq!(hindi.max_marks, None);
    }

    #[test]
    fn test_collect_rejects_bad_inputs() {
        let mut session = fresh_session();
        session.form_mut("Hindi").unwrap().set_mark(1, "abc").unwrap();
        assert!(matches!(
            session.collect(),
            Err(MarkError::InvalidMark { .. })
        ));

        let mut session = fresh_session();
        session.form_mut("English").unwrap().max_marks_input = "ten".into();
        assert!(matches!(
            session.collect(),
            Err(MarkError::InvalidMaxMarks { .. })
        ));

        let mut session = fresh_session();
        session.form_mut("TWAU").unwrap().date_input = "04/07/2025".into();
        assert!(matches!(session.collect(), Err(MarkError::InvalidDate { .. })));
    }

    #[test]
    fn test_forms_follow_mapping_and_first_is_active() {
        let session = fresh_session();
        let subjects: Vec<_> = session.forms.iter().map(|f| f.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Hindi", "Maths", "English", "TWAU"]);
        assert_eq!(session.active_subject.as_deref(), Some("Hindi"));
        assert_eq!(session.source, DataSource::MainSpreadsheet);
        assert_eq!(session.forms[0].teacher_options, vec!["Mrs. Emily Davis"]);
    }

    #[test]
    fn test_select_unknown_subject() {
        let mut session = fresh_session();
        assert!(session.select_subject("Maths").is_ok());
        assert_eq!(session.active_subject.as_deref(), Some("Maths"));
        assert_eq!(
            session.select_subject("Science"),
            Err(MarkError::UnknownSubject("Science".into()))
        );
        assert_eq!(session.active_subject.as_deref(), Some("Maths"));
    }

    #[test]
    fn test_saved_marks_prefill_cards() {
        let mut data = fresh_session().data;
        data.loaded_from_saved = true;
        data.markslip_info = Some(MarkslipInfo {
            id: "m1".into(),
            name: "Class3A PT1".into(),
            url: String::new(),
            download_url: String::new(),
            last_modified: None,
        });
        data.subjects.insert(
            "Maths",
            SubjectData {
                max_marks: Some(25),
                subject_teacher: "Mrs. Emily Davis".into(),
                date: None,
                marks: vec![
                    MarkEntry::scored("1", "A101", 21.0),
                    // matched by admission number only
                    MarkEntry::absent("", "A102"),
                ],
            },
        );

        let session = EntrySession::new(data, &SubjectMapping::fallback());
        let maths = session.form("Maths").unwrap();
        assert_eq!(maths.max_marks_input, "25");
        assert_eq!(maths.card(0).unwrap().mark_input, "21");
        assert!(maths.card(1).unwrap().absent);
        assert_eq!(maths.card(2).unwrap().mark_input, "");
        assert_eq!(session.source, DataSource::SavedData);
        assert!(session.can_view_markslip());
    }

    #[test]
    fn test_subtitle() {
        let session = fresh_session();
        assert_eq!(session.subtitle(), "Class3A - PT1 (2025-26) - 3 students");
        assert!(!session.can_view_markslip());
    }

    #[test]
    fn test_unknown_student() {
        let mut session = fresh_session();
        let err = session.form_mut("Maths").unwrap().set_mark(99, "1").unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_STUDENT");
    }

    #[test]
    fn test_students_sharing_a_roll_number_edit_separately() {
        let selection = Selection {
            class_name: "Class3A".into(),
            session: "2025-26".into(),
            exam_name: "PT1".into(),
            class_teacher: "Mrs. Emily Davis".into(),
        };
        let mapping = SubjectMapping::fallback();
        let roster = vec![
            Student::new("", "A1", "Deepa"),
            Student::new("", "A2", "Farhan"),
            Student::new("7", "A3", "Gita"),
            Student::new("7", "A4", "Harsh"),
        ];
        let mut session =
            EntrySession::new(MarkslipData::fresh(&selection, roster, &mapping), &mapping);
        let form = session.form_mut("Maths").unwrap();
        form.set_mark(0, "10").unwrap();
        form.set_mark(1, "20").unwrap();
        form.set_mark(2, "30").unwrap();
        form.set_absent(3, true).unwrap();

        let inputs: Vec<_> = form.cards.iter().map(|c| c.mark_input.as_str()).collect();
        assert_eq!(inputs, vec!["10", "20", "30", ""]);

        let collected = session.collect().unwrap();
        let maths = collected.subject("Maths").unwrap();
        assert_eq!(
            maths.marks,
            vec![
                MarkEntry::scored("", "A1", 10.0),
                MarkEntry::scored("", "A2", 20.0),
                MarkEntry::scored("7", "A3", 30.0),
                MarkEntry::absent("7", "A4"),
            ]
        );

        // reloading the saved marks puts each back on its own card
        let mut saved = session.collect().unwrap();
        saved.loaded_from_saved = true;
        let reloaded = EntrySession::new(saved, &mapping);
        let inputs: Vec<_> = reloaded
            .form("Maths")
            .unwrap()
            .cards
            .iter()
            .map(|c| (c.mark_input.as_str(), c.absent))
            .collect();
        assert_eq!(inputs, vec![("10", false), ("20", false), ("30", false), ("", true)]);
    }

    #[test]
    fn test_saved_markslip_collects_unedited() {
        let saved: MarkslipData = serde_json::from_value(serde_json::json!({
            "className": "Class3A",
            "session": "2025-26",
            "examName": "HALFYEARLY",
            "classTeacher": "Mrs. Emily Davis",
            "loadedFromSaved": true,
            "students": [
                {"rollNo": 1, "admissionNo": "A101", "displayName": "Asha Verma"},
                {"rollNo": 2, "admissionNo": "A102", "displayName": "Bilal Khan"}
            ],
            "subjects": {
                "Maths": {"maxMarks": 150, "subjectTeacher": "", "date": "",
                          "marks": [{"rollNo": 1, "admissionNo": "A101", "marks": 120, "isAbsent": false},
                                    {"rollNo": 2, "admissionNo": "A102", "marks": "", "isAbsent": false}]}
            }
        }))
        .unwrap();

        let session = EntrySession::new(saved, &SubjectMapping::fallback());
        let data = session.collect().unwrap();
        let maths = data.subject("Maths").unwrap();
        assert_eq!(maths.max_marks, Some(150));
        assert_eq!(maths.marks, vec![MarkEntry::scored("1", "A101", 120.0)]);
    }

    #[test]
    fn test_max_marks_accepts_what_the_backend_sends() {
        let mut session = fresh_session();
        let form = session.form_mut("English").unwrap();
        form.max_marks_input = "200".into();
        form.set_mark(0, "180").unwrap();
        form.set_mark(1, "210").unwrap();
        let data = session.collect().unwrap();
        let english = data.subject("English").unwrap();
        assert_eq!(english.max_marks, Some(200));
        assert_eq!(english.marks.len(), 2);
    }
}
