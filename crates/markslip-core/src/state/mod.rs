pub mod autosave;
pub mod clock;
pub mod entry;
pub mod notify;
pub mod prefs;
pub mod selection;
pub mod status;

pub use autosave::{AutoSaveIndicator, AutoSaveState, AUTO_SAVE_DEBOUNCE_MS};
pub use clock::{Clock, ManualClock, Millis, SystemClock};
pub use entry::{EntrySession, StudentCard, SubjectForm};
pub use notify::{Modal, Toast, ToastKind, ToastQueue, TOAST_LIFETIME_MS};
pub use prefs::{MemoryStore, PreferenceStore, Preferences, Theme};
pub use selection::{DropdownOptions, SelectionField, SelectionForm};
pub use status::{DataSource, LoadingOverlay, SmartCheckStatus};

use serde::{Deserialize, Serialize};

use crate::error::MarkError;
use crate::subject::SubjectMapping;

/// A user edit on the page, as delivered by the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditAction {
    SetSelection { field: SelectionField, value: String },
    SelectSubject { subject: String },
    /// `index` is the student's position in the roster
    SetMark { subject: String, index: usize, value: String },
    SetAbsent { subject: String, index: usize, absent: bool },
    SetMaxMarks { subject: String, value: String },
    SetSubjectTeacher { subject: String, teacher: String },
    SetExamDate { subject: String, value: String },
}

impl EditAction {
    /// Edits to the marks grid schedule an auto-save; navigation does not
    pub fn touches_marks(&self) -> bool {
        !matches!(
            self,
            EditAction::SetSelection { .. } | EditAction::SelectSubject { .. }
        )
    }
}

/// Everything the page renders, owned by one controller
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub selection: SelectionForm,
    pub options: DropdownOptions,
    pub subject_mapping: SubjectMapping,
    /// The markslip being edited, once a roster or saved markslip loaded
    pub entry: Option<EntrySession>,
    pub smart_check: SmartCheckStatus,
    pub auto_save: AutoSaveState,
    pub toasts: ToastQueue,
    pub modal: Option<Modal>,
    pub loading: LoadingOverlay,
    pub theme: Theme,
    pub last_performance_ms: Option<u64>,
    pub config_banner: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            subject_mapping: SubjectMapping::fallback(),
            ..Self::default()
        }
    }

    pub fn apply_preferences(&mut self, prefs: Preferences) {
        self.theme = prefs.theme;
        self.auto_save.set_enabled(prefs.auto_save_enabled);
    }

    pub fn toast(&mut self, kind: ToastKind, message: impl Into<String>, now: Millis) {
        self.toasts.push(kind, message, now);
    }

    /// The smart check button is enabled with a full selection and no check running
    pub fn smart_check_enabled(&self) -> bool {
        self.selection.is_complete() && !self.smart_check.is_checking()
    }

    pub fn has_data(&self) -> bool {
        self.entry.is_some()
    }

    pub fn record_performance(&mut self, ms: Option<u64>) {
        if ms.is_some() {
            self.last_performance_ms = ms;
        }
    }

    pub fn performance_text(&self) -> String {
        self.last_performance_ms
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_default()
    }

    pub fn open_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Apply a page edit; returns whether it should schedule an auto-save
    pub fn handle_edit(&mut self, action: EditAction, now: Millis) -> Result<bool, MarkError> {
        let schedules = action.touches_marks();
        match action {
            EditAction::SetSelection { field, value } => {
                self.selection.set(field, &value);
                return Ok(false);
            }
            EditAction::SelectSubject { subject } => {
                self.entry_mut()?.select_subject(&subject)?;
                return Ok(false);
            }
            EditAction::SetMark {
                subject,
                index,
                value,
            } => {
                let changed = self.entry_mut()?.form_mut(&subject)?.set_mark(index, &value)?;
                if !changed {
                    return Ok(false);
                }
            }
            EditAction::SetAbsent {
                subject,
                index,
                absent,
            } => {
                self.entry_mut()?
                    .form_mut(&subject)?
                    .set_absent(index, absent)?;
            }
            EditAction::SetMaxMarks { subject, value } => {
                self.entry_mut()?.form_mut(&subject)?.max_marks_input = value;
            }
            EditAction::SetSubjectTeacher { subject, teacher } => {
                self.entry_mut()?.form_mut(&subject)?.subject_teacher = teacher;
            }
            EditAction::SetExamDate { subject, value } => {
                self.entry_mut()?.form_mut(&subject)?.date_input = value;
            }
        }
        if schedules {
            self.auto_save.note_edit(now);
        }
        Ok(schedules && self.auto_save.is_enabled())
    }

    fn entry_mut(&mut self) -> Result<&mut EntrySession, MarkError> {
        self.entry.as_mut().ok_or(MarkError::NoData)
    }

    /// Expire toasts and finished auto-save badges
    pub fn tick(&mut self, now: Millis) {
        self.toasts.expire(now);
        self.auto_save.tick(now);
    }
}
