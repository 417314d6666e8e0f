pub mod defaults;
pub mod error;
pub mod marks;
pub mod markslip;
pub mod ordered;
pub mod state;
pub mod student;
pub mod subject;
pub mod wire;

pub use defaults::{fallback_classes, Defaults};
pub use error::MarkError;
pub use marks::{parse_mark_input, MarkEntry, MarkValue, ABSENT_MARK};
pub use markslip::{MarkslipData, MarkslipInfo, Selection, SubjectData, Subjects};
pub use ordered::OrderedMap;
pub use state::{
    AppState, AutoSaveIndicator, AutoSaveState, Clock, DataSource, EditAction, EntrySession,
    ManualClock, MemoryStore, Millis, Modal, PreferenceStore, Preferences, SelectionField,
    SelectionForm, SmartCheckStatus, SystemClock, Theme, Toast, ToastKind,
};
pub use student::Student;
pub use subject::{SubjectMapping, SubjectSlot};
