use markslip_core::state::Clock;
use markslip_core::{
    fallback_classes, AppState, Defaults, EditAction, EntrySession, MarkError, MarkslipData,
    Millis, Modal, PreferenceStore, Preferences, Selection, SelectionField, SmartCheckStatus,
    ToastKind,
};

use crate::backend::Backend;
use crate::error::ApiError;
use crate::protocol::Action;

/// Owns the page state and sequences every backend action.
///
/// Errors never escape an action: each is logged and surfaced as exactly one
/// toast, and loaded data is replaced only on success.
pub struct MarkslipController<B, S> {
    state: AppState,
    backend: B,
    store: S,
    clock: Box<dyn Clock>,
}

impl<B: Backend, S: PreferenceStore> MarkslipController<B, S> {
    pub fn new(backend: B, store: S, clock: Box<dyn Clock>) -> Self {
        Self {
            state: AppState::new(),
            backend,
            store,
            clock,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        let now = self.now();
        self.state.toast(kind, message, now);
    }

    // ----- startup -----

    /// Load dropdown data and reapply saved preferences
    pub async fn initialize(&mut self) {
        self.state.loading.show("Initializing Smart Markslip System...");

        self.load_default_data().await;

        let prefs = Preferences::load(&self.store);
        self.state.apply_preferences(prefs);

        self.state.loading.set_text("Application ready!");
        self.state.loading.hide();

        if self.backend.is_configured() {
            self.state.config_banner = false;
            self.toast(ToastKind::Success, "Smart Markslip System initialized successfully!");
        } else {
            self.state.config_banner = true;
            self.toast(
                ToastKind::Warning,
                "Demo mode: Configure backend to enable full functionality",
            );
        }
    }

    async fn load_default_data(&mut self) {
        self.state.loading.set_text("Loading configuration data...");

        if !self.backend.is_configured() {
            tracing::warn!("backend not configured, using built-in defaults");
            self.apply_fallback_defaults();
            return;
        }

        match self.backend.get_defaults().await {
            Ok(defaults) => {
                self.apply_defaults(defaults);
                match self.backend.get_classes().await {
                    Ok(classes) => self.state.options.populate_classes(classes),
                    Err(e) => tracing::warn!("could not load classes: {}", e),
                }
                tracing::info!("default data loaded from backend");
            }
            Err(e) => {
                tracing::warn!("failed to load defaults from backend, using built-in defaults: {}", e);
                self.apply_fallback_defaults();
            }
        }
    }

    fn apply_defaults(&mut self, defaults: Defaults) {
        self.state.options.populate(&defaults);
        self.state.subject_mapping = defaults.subject_mapping;
    }

    fn apply_fallback_defaults(&mut self) {
        self.apply_defaults(Defaults::fallback());
        self.state.options.populate_classes(fallback_classes());
    }

    // ----- configuration panel -----

    /// Apply a page edit and schedule an auto-save if it touched the grid
    pub fn edit(&mut self, action: EditAction) -> Result<bool, MarkError> {
        let now = self.now();
        self.state.handle_edit(action, now).map_err(|e| {
            tracing::warn!("rejected edit: {}", e);
            e
        })
    }

    pub fn set_selection_field(&mut self, field: SelectionField, value: &str) {
        self.state.selection.set(field, value);
    }

    pub fn selection_complete(&self) -> bool {
        self.state.selection.is_complete()
    }

    pub fn select_subject(&mut self, subject: &str) -> Result<bool, MarkError> {
        self.edit(EditAction::SelectSubject {
            subject: subject.to_string(),
        })
    }

    /// `index` is the student's position in the roster
    pub fn set_mark(&mut self, subject: &str, index: usize, value: &str) -> Result<bool, MarkError> {
        self.edit(EditAction::SetMark {
            subject: subject.to_string(),
            index,
            value: value.to_string(),
        })
    }

    pub fn set_absent(&mut self, subject: &str, index: usize, absent: bool) -> Result<bool, MarkError> {
        self.edit(EditAction::SetAbsent {
            subject: subject.to_string(),
            index,
            absent,
        })
    }

    pub fn set_max_marks(&mut self, subject: &str, value: &str) -> Result<bool, MarkError> {
        self.edit(EditAction::SetMaxMarks {
            subject: subject.to_string(),
            value: value.to_string(),
        })
    }

    pub fn set_subject_teacher(&mut self, subject: &str, teacher: &str) -> Result<bool, MarkError> {
        self.edit(EditAction::SetSubjectTeacher {
            subject: subject.to_string(),
            teacher: teacher.to_string(),
        })
    }

    pub fn set_exam_date(&mut self, subject: &str, value: &str) -> Result<bool, MarkError> {
        self.edit(EditAction::SetExamDate {
            subject: subject.to_string(),
            value: value.to_string(),
        })
    }

    /// Check for an existing markslip, then load it or a fresh roster
    pub async fn smart_check(&mut self) {
        let selection = match self.state.selection.to_selection() {
            Ok(selection) => selection,
            Err(_) => {
                self.toast(ToastKind::Error, "Please fill in all required fields");
                return;
            }
        };

        if !self.backend.is_configured() {
            self.state.open_modal(Modal::Configuration);
            return;
        }

        self.state.smart_check = SmartCheckStatus::Checking;

        let outcome = match self.backend.smart_check(&selection).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.fail_smart_check(e);
                return;
            }
        };

        if outcome.should_load_saved() {
            let Some(info) = outcome.markslip_info.clone() else {
                self.fail_smart_check(ApiError::MissingField("markslipInfo"));
                return;
            };
            self.state.smart_check = SmartCheckStatus::LoadSaved {
                message: outcome.message.clone(),
                performance_ms: outcome.performance_ms,
            };
            if self.load_saved(&info.id).await {
                if let Some(entry) = self.state.entry.as_mut() {
                    entry.data.markslip_info.get_or_insert(info);
                }
            }
        } else {
            self.state.smart_check = SmartCheckStatus::LoadNew {
                message: outcome.message.clone(),
                performance_ms: outcome.performance_ms,
            };
            self.load_roster(&selection).await;
        }

        self.state.record_performance(outcome.performance_ms);
    }

    fn fail_smart_check(&mut self, err: ApiError) {
        tracing::error!(code = err.code(), "smart check failed: {}", err);
        self.state.smart_check = SmartCheckStatus::Failed {
            message: err.to_string(),
        };
        self.toast(ToastKind::Error, format!("Smart check failed: {err}"));
    }

    /// Load a previously saved markslip; returns whether it replaced the data
    pub async fn load_saved(&mut self, markslip_id: &str) -> bool {
        self.state.loading.show("Loading existing markslip data...");

        let result = self.backend.load_markslip(markslip_id).await;
        self.state.loading.hide();

        match result {
            Ok(mut data) => {
                data.loaded_from_saved = true;
                self.replace_entry(data);
                tracing::info!(markslip_id, "loaded saved markslip");
                self.toast(ToastKind::Success, "Existing markslip loaded successfully!");
                true
            }
            Err(e) => {
                tracing::error!(markslip_id, "error loading existing markslip: {}", e);
                self.toast(
                    ToastKind::Error,
                    format!("Failed to load existing markslip: {e}"),
                );
                false
            }
        }
    }

    /// Load the class roster and start a blank markslip; returns whether it replaced the data
    pub async fn load_roster(&mut self, selection: &Selection) -> bool {
        self.state.loading.show("Loading student data...");

        let result = self
            .backend
            .load_students(&selection.class_name, &selection.session)
            .await;
        self.state.loading.hide();

        match result {
            Ok(students) => {
                let count = students.len();
                let data = MarkslipData::fresh(selection, students, &self.state.subject_mapping);
                self.replace_entry(data);
                tracing::info!(class = %selection.class_name, count, "loaded roster");
                self.toast(
                    ToastKind::Success,
                    format!("Loaded {count} students successfully!"),
                );
                true
            }
            Err(e) => {
                tracing::error!(class = %selection.class_name, "error loading student data: {}", e);
                self.toast(ToastKind::Error, format!("Failed to load student data: {e}"));
                false
            }
        }
    }

    fn replace_entry(&mut self, data: MarkslipData) {
        self.state.entry = Some(EntrySession::new(data, &self.state.subject_mapping));
    }

    // ----- actions -----

    pub async fn save(&mut self) {
        self.submit(Action::SaveMarkslip).await;
    }

    pub async fn generate(&mut self) {
        self.submit(Action::GenerateMarkslip).await;
    }

    async fn submit(&mut self, action: Action) {
        let generate = action == Action::GenerateMarkslip;
        let Some(payload) = self.state.entry.as_ref().map(EntrySession::collect) else {
            let message = if generate {
                "No data to generate markslip"
            } else {
                "No data to save"
            };
            self.toast(ToastKind::Error, message);
            return;
        };

        if !self.backend.is_configured() {
            self.state.open_modal(Modal::Configuration);
            return;
        }

        let (verb, loading, success) = if generate {
            (
                "generate",
                "Generating markslip file...",
                "Markslip file generated successfully!",
            )
        } else {
            ("save", "Saving markslip data...", "Markslip saved successfully!")
        };

        self.state.loading.show(loading);

        let result = match payload {
            Ok(payload) => self.backend.write(action, &payload).await,
            Err(e) => Err(ApiError::from(e)),
        };
        self.state.loading.hide();

        match result {
            Ok(outcome) => {
                tracing::info!(action = action.as_str(), performance_ms = ?outcome.performance_ms, "markslip {}d", verb);
                self.toast(ToastKind::Success, success);
                self.state.record_performance(outcome.performance_ms);
                if generate {
                    if let Some(info) = outcome.file_info() {
                        self.state.open_modal(Modal::MarkslipInfo { info });
                    }
                }
            }
            Err(e) => {
                tracing::error!(action = action.as_str(), code = e.code(), "{} error: {}", verb, e);
                self.toast(
                    ToastKind::Error,
                    format!("Failed to {verb} markslip: {e}"),
                );
            }
        }
    }

    /// Show the links of the loaded markslip file
    pub fn view_markslip(&mut self) {
        let info = self
            .state
            .entry
            .as_ref()
            .and_then(|entry| entry.data.markslip_info.clone());
        match info {
            Some(info) => self.state.open_modal(Modal::MarkslipInfo { info }),
            None => self.toast(ToastKind::Error, "No markslip to view"),
        }
    }

    pub fn close_modal(&mut self) {
        self.state.close_modal();
    }

    // ----- auto-save -----

    pub fn toggle_auto_save(&mut self) {
        let enabled = !self.state.auto_save.is_enabled();
        self.state.auto_save.set_enabled(enabled);
        Preferences::save_auto_save(&mut self.store, enabled);
        if enabled {
            self.toast(ToastKind::Success, "Auto-save enabled");
        } else {
            self.toast(ToastKind::Warning, "Auto-save disabled");
        }
    }

    /// Deadline of the pending debounced save, for arming a timer
    pub fn next_auto_save_at(&self) -> Option<Millis> {
        self.state.auto_save.pending_until()
    }

    /// Run the debounced save if its quiet period is over.
    ///
    /// Returns whether a save went out and succeeded.
    pub async fn poll_auto_save(&mut self) -> bool {
        let Some(payload) = self.take_due_auto_save() else {
            return false;
        };
        self.perform_auto_save(payload).await
    }

    /// Save immediately, e.g. when the tab is hidden
    pub async fn flush_auto_save(&mut self) -> bool {
        let Some(payload) = self.take_flush_auto_save() else {
            return false;
        };
        self.perform_auto_save(payload).await
    }

    /// First half of a debounced save: the payload to send, if one is due.
    ///
    /// The indicator shows saving until [`Self::finish_auto_save`] runs, so a
    /// caller can send the payload without holding the controller.
    pub fn take_due_auto_save(&mut self) -> Option<MarkslipData> {
        let now = self.now();
        self.state.tick(now);
        if !self.state.auto_save.take_due(now) {
            return None;
        }
        self.prepare_auto_save()
    }

    /// First half of a flush: the payload to send right away, if auto-save is on
    pub fn take_flush_auto_save(&mut self) -> Option<MarkslipData> {
        if !self.state.auto_save.is_enabled() {
            return None;
        }
        self.state.auto_save.take_pending();
        self.prepare_auto_save()
    }

    /// Second half of an auto-save
    pub fn finish_auto_save(&mut self, ok: bool) {
        // toggling off mid-flight already hid the indicator
        if !self.state.auto_save.is_enabled() {
            return;
        }
        let now = self.now();
        self.state.auto_save.finish(ok, now);
    }

    /// Log a failed auto-save and report whether it went through
    pub fn auto_save_succeeded<T>(result: &Result<T, ApiError>) -> bool {
        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(code = e.code(), "auto-save error: {}", e);
                false
            }
        }
    }

    /// Whether leaving the page should ask for confirmation
    pub fn should_confirm_unload(&self) -> bool {
        self.state.auto_save.is_enabled() && self.state.has_data()
    }

    /// Best-effort save when the page is closing; returns whether to prompt
    pub async fn before_unload(&mut self) -> bool {
        let prompt = self.should_confirm_unload();
        if prompt {
            self.flush_auto_save().await;
        }
        prompt
    }

    fn prepare_auto_save(&mut self) -> Option<MarkslipData> {
        if !self.state.auto_save.is_enabled() {
            return None;
        }
        let payload = self.state.entry.as_ref()?.collect();
        match payload {
            Ok(payload) => {
                self.state.auto_save.begin();
                Some(payload)
            }
            Err(e) => {
                tracing::error!(code = e.code(), "auto-save error: {}", e);
                self.finish_auto_save(false);
                None
            }
        }
    }

    async fn perform_auto_save(&mut self, payload: MarkslipData) -> bool {
        let result = self.backend.auto_save(&payload).await;
        let ok = Self::auto_save_succeeded(&result);
        self.finish_auto_save(ok);
        ok
    }

    // ----- preferences -----

    pub fn toggle_theme(&mut self) {
        let theme = self.state.theme.toggled();
        self.state.theme = theme;
        Preferences::save_theme(&mut self.store, theme);
        self.toast(
            ToastKind::Success,
            format!("Switched to {} theme", theme.as_str()),
        );
    }

    pub fn dismiss_toast(&mut self, id: u64) {
        self.state.toasts.dismiss(id);
    }

    /// Expire toasts and finished auto-save badges
    pub fn tick(&mut self) {
        let now = self.now();
        self.state.tick(now);
    }
}
