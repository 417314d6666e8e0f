// User actions hold the controller lock across awaits; that lock is the busy guard.
#![allow(clippy::await_holding_refcell_ref)]

use std::cell::RefMut;
use std::fmt::Display;
use std::rc::Rc;

use js_sys::Promise;
use markslip_client::{ApiError, BackendConfig, HttpBackend, MarkslipController};
use markslip_core::{EditAction, MarkError, SelectionField};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::browser::{BrowserClock, LocalStorageStore};
use crate::session::{Busy, Session};

type AppSession = Session<HttpBackend, LocalStorageStore>;
type Controller = MarkslipController<HttpBackend, LocalStorageStore>;

/// The markslip page exposed to JavaScript.
///
/// Async actions resolve to a fresh state snapshot. Only one user action runs
/// at a time; a call made while another is in flight rejects with `BUSY`.
/// Auto-saves run beside edits and never block them.
#[wasm_bindgen]
pub struct MarkslipApp {
    session: Rc<AppSession>,
}

/// Structured error object for JavaScript
#[derive(Debug, Serialize)]
pub struct JsMarkslipError {
    code: String,
    message: String,
}

impl From<MarkError> for JsMarkslipError {
    fn from(err: MarkError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for JsMarkslipError {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<Busy> for JsMarkslipError {
    fn from(_: Busy) -> Self {
        Self {
            code: "BUSY".to_string(),
            message: "Another action is still running".to_string(),
        }
    }
}

impl JsMarkslipError {
    fn from_error<E: Display>(err: E) -> Self {
        Self {
            code: "ERROR".to_string(),
            message: err.to_string(),
        }
    }
}

fn to_js_error(err: impl Into<JsMarkslipError>) -> JsValue {
    serde_wasm_bindgen::to_value(&err.into()).unwrap_or(JsValue::NULL)
}

/// Plain objects instead of `Map`s so the page can read fields directly
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| to_js_error(JsMarkslipError::from_error(e)))
}

fn lock(session: &AppSession) -> Result<RefMut<'_, Controller>, JsValue> {
    session.lock().map_err(to_js_error)
}

#[wasm_bindgen]
impl MarkslipApp {
    /// Create the app; without a deployment URL it runs in demo mode
    #[wasm_bindgen(constructor)]
    pub fn new(backend_url: Option<String>) -> Result<MarkslipApp, JsValue> {
        let config = match backend_url {
            Some(url) => BackendConfig::new(url),
            None => BackendConfig::unconfigured(),
        };
        let backend = HttpBackend::new(config).map_err(to_js_error)?;
        let controller =
            MarkslipController::new(backend, LocalStorageStore::new(), Box::new(BrowserClock));
        Ok(Self {
            session: Rc::new(Session::new(controller)),
        })
    }

    // ========================================================================
    // Backend actions
    // ========================================================================

    /// Load dropdown data and stored preferences
    pub fn initialize(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let mut ctrl = lock(&session)?;
            ctrl.initialize().await;
            to_js(ctrl.state())
        })
    }

    #[wasm_bindgen(js_name = smartCheck)]
    pub fn smart_check(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let mut ctrl = lock(&session)?;
            ctrl.smart_check().await;
            to_js(ctrl.state())
        })
    }

    pub fn save(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let mut ctrl = lock(&session)?;
            ctrl.save().await;
            to_js(ctrl.state())
        })
    }

    pub fn generate(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let mut ctrl = lock(&session)?;
            ctrl.generate().await;
            to_js(ctrl.state())
        })
    }

    // ========================================================================
    // Auto-save
    // ========================================================================

    /// Run the debounced auto-save if due; call when the `nextAutoSaveAt` timer fires.
    /// Resolves to whether a save went out and succeeded.
    #[wasm_bindgen(js_name = pollAutoSave)]
    pub fn poll_auto_save(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let ok = session.poll_auto_save().await.map_err(to_js_error)?;
            Ok(JsValue::from_bool(ok))
        })
    }

    /// Save now; call on `visibilitychange` to hidden
    #[wasm_bindgen(js_name = flushAutoSave)]
    pub fn flush_auto_save(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let ok = session.flush_auto_save().await.map_err(to_js_error)?;
            Ok(JsValue::from_bool(ok))
        })
    }

    /// Whether `beforeunload` should prompt; starts a best-effort save when it does
    #[wasm_bindgen(js_name = beforeUnload)]
    pub fn before_unload(&self) -> bool {
        let prompt = self.session.should_confirm_unload();
        if prompt {
            let session = self.session.clone();
            spawn_local(async move {
                if let Err(Busy) = session.flush_auto_save().await {
                    tracing::warn!("skipped save on unload, another action is running");
                }
            });
        }
        prompt
    }

    /// Deadline (ms since epoch) of the pending auto-save, if any
    #[wasm_bindgen(js_name = nextAutoSaveAt)]
    pub fn next_auto_save_at(&self) -> Option<f64> {
        self.session.next_auto_save_at().map(|ms| ms as f64)
    }

    #[wasm_bindgen(js_name = toggleAutoSave)]
    pub fn toggle_auto_save(&self) -> Result<(), JsValue> {
        lock(&self.session)?.toggle_auto_save();
        Ok(())
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Apply an edit object such as `{type: "setMark", subject, index, value}`.
    /// Returns whether an auto-save was scheduled.
    pub fn edit(&self, action: JsValue) -> Result<bool, JsValue> {
        let action: EditAction = serde_wasm_bindgen::from_value(action)
            .map_err(|e| to_js_error(JsMarkslipError::from_error(e)))?;
        lock(&self.session)?.edit(action).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&self, field: &str, value: &str) -> Result<(), JsValue> {
        let field = SelectionField::parse(field).ok_or_else(|| {
            to_js_error(JsMarkslipError::from_error(format!(
                "Unknown selection field: {field}"
            )))
        })?;
        lock(&self.session)?.set_selection_field(field, value);
        Ok(())
    }

    #[wasm_bindgen(js_name = selectionComplete)]
    pub fn selection_complete(&self) -> bool {
        self.session.selection_complete()
    }

    #[wasm_bindgen(js_name = selectSubject)]
    pub fn select_subject(&self, subject: &str) -> Result<(), JsValue> {
        lock(&self.session)?
            .select_subject(subject)
            .map(|_| ())
            .map_err(to_js_error)
    }

    /// `index` is the student's position in the roster
    #[wasm_bindgen(js_name = setMark)]
    pub fn set_mark(&self, subject: &str, index: usize, value: &str) -> Result<bool, JsValue> {
        lock(&self.session)?
            .set_mark(subject, index, value)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setAbsent)]
    pub fn set_absent(&self, subject: &str, index: usize, absent: bool) -> Result<bool, JsValue> {
        lock(&self.session)?
            .set_absent(subject, index, absent)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setMaxMarks)]
    pub fn set_max_marks(&self, subject: &str, value: &str) -> Result<bool, JsValue> {
        lock(&self.session)?
            .set_max_marks(subject, value)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setSubjectTeacher)]
    pub fn set_subject_teacher(&self, subject: &str, teacher: &str) -> Result<bool, JsValue> {
        lock(&self.session)?
            .set_subject_teacher(subject, teacher)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setExamDate)]
    pub fn set_exam_date(&self, subject: &str, value: &str) -> Result<bool, JsValue> {
        lock(&self.session)?
            .set_exam_date(subject, value)
            .map_err(to_js_error)
    }

    // ========================================================================
    // Page chrome
    // ========================================================================

    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&self) -> Result<(), JsValue> {
        lock(&self.session)?.toggle_theme();
        Ok(())
    }

    #[wasm_bindgen(js_name = viewMarkslip)]
    pub fn view_markslip(&self) -> Result<(), JsValue> {
        lock(&self.session)?.view_markslip();
        Ok(())
    }

    #[wasm_bindgen(js_name = closeModal)]
    pub fn close_modal(&self) -> Result<(), JsValue> {
        lock(&self.session)?.close_modal();
        Ok(())
    }

    #[wasm_bindgen(js_name = dismissToast)]
    pub fn dismiss_toast(&self, id: f64) -> Result<(), JsValue> {
        lock(&self.session)?.dismiss_toast(id as u64);
        Ok(())
    }

    /// Expire toasts and the auto-save badge; call from a periodic timer
    pub fn tick(&self) -> Result<(), JsValue> {
        lock(&self.session)?.tick();
        Ok(())
    }

    /// Current page state for rendering
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(lock(&self.session)?.state())
    }
}
