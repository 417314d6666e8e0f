use std::cell::{Cell, RefCell, RefMut};

use markslip_client::{Backend, MarkslipController};
use markslip_core::{MarkslipData, Millis, PreferenceStore};

/// Another action holds the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Busy;

/// The controller shared by every JavaScript entry point.
///
/// User actions lock the controller for their whole run. Auto-saves lock it
/// only to take the payload and to record the outcome, so the grid stays
/// editable while the request is out. An outcome that lands while a user
/// action holds the lock is applied on the next [`Session::lock`].
pub struct Session<B, S> {
    controller: RefCell<MarkslipController<B, S>>,
    settled_auto_save: Cell<Option<bool>>,
}

impl<B: Backend + Clone, S: PreferenceStore> Session<B, S> {
    pub fn new(controller: MarkslipController<B, S>) -> Self {
        Self {
            controller: RefCell::new(controller),
            settled_auto_save: Cell::new(None),
        }
    }

    pub fn lock(&self) -> Result<RefMut<'_, MarkslipController<B, S>>, Busy> {
        let mut ctrl = self.controller.try_borrow_mut().map_err(|_| Busy)?;
        if let Some(ok) = self.settled_auto_save.take() {
            ctrl.finish_auto_save(ok);
        }
        Ok(ctrl)
    }

    /// Send the debounced save if due; `Ok(true)` when it went through
    pub async fn poll_auto_save(&self) -> Result<bool, Busy> {
        let taken = {
            let mut ctrl = self.lock()?;
            ctrl.take_due_auto_save()
                .map(|payload| (payload, ctrl.backend().clone()))
        };
        match taken {
            Some((payload, backend)) => Ok(self.send_auto_save(backend, payload).await),
            None => Ok(false),
        }
    }

    /// Send the auto-save right away
    pub async fn flush_auto_save(&self) -> Result<bool, Busy> {
        let taken = {
            let mut ctrl = self.lock()?;
            ctrl.take_flush_auto_save()
                .map(|payload| (payload, ctrl.backend().clone()))
        };
        match taken {
            Some((payload, backend)) => Ok(self.send_auto_save(backend, payload).await),
            None => Ok(false),
        }
    }

    async fn send_auto_save(&self, backend: B, payload: MarkslipData) -> bool {
        let result = backend.auto_save(&payload).await;
        let ok = MarkslipController::<B, S>::auto_save_succeeded(&result);
        match self.controller.try_borrow_mut() {
            Ok(mut ctrl) => ctrl.finish_auto_save(ok),
            Err(_) => self.settled_auto_save.set(Some(ok)),
        }
        ok
    }

    /// Whether leaving the page should prompt; always while an action runs
    pub fn should_confirm_unload(&self) -> bool {
        self.controller
            .try_borrow()
            .map(|ctrl| ctrl.should_confirm_unload())
            .unwrap_or(true)
    }

    pub fn next_auto_save_at(&self) -> Option<Millis> {
        self.controller.try_borrow().ok()?.next_auto_save_at()
    }

    pub fn selection_complete(&self) -> bool {
        self.controller
            .try_borrow()
            .map(|ctrl| ctrl.selection_complete())
            .unwrap_or(false)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use markslip_client::{Action, ApiError, ApiRequest};
    use markslip_core::{AutoSaveIndicator, ManualClock, MemoryStore, Preferences, Selection};
    use serde_json::{json, Value};
    use std::rc::Rc;
    use tokio::sync::Notify;

    /// Auto-saves wait until the test releases them
    #[derive(Default)]
    struct Gate {
        release: Notify,
        fail: Cell<bool>,
        auto_saves: RefCell<Vec<Value>>,
    }

    #[derive(Clone)]
    struct GatedBackend {
        gate: Rc<Gate>,
    }

    #[async_trait(?Send)]
    impl Backend for GatedBackend {
        async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
            match request.action {
                Action::LoadStudents => Ok(json!({
                    "success": true,
                    "data": {"students": [
                        {"rollNo": "1", "admissionNo": "A1", "displayName": "Asha"},
                        {"rollNo": "2", "admissionNo": "A2", "displayName": "Bilal"}
                    ]}
                })),
                Action::AutoSave => {
                    self.gate
                        .auto_saves
                        .borrow_mut()
                        .push(request.body.unwrap_or(Value::Null));
                    self.gate.release.notified().await;
                    if self.gate.fail.get() {
                        Err(ApiError::Transport("connection reset".into()))
                    } else {
                        Ok(json!({"success": true}))
                    }
                }
                _ => Err(ApiError::Transport("offline".into())),
            }
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    type TestSession = Session<GatedBackend, MemoryStore>;

    async fn loaded_session() -> (TestSession, Rc<Gate>, ManualClock) {
        let gate = Rc::new(Gate::default());
        let mut store = MemoryStore::new();
        Preferences::save_auto_save(&mut store, true);
        let clock = ManualClock::new(1_000_000);
        let mut ctrl = MarkslipController::new(
            GatedBackend { gate: gate.clone() },
            store,
            Box::new(clock.clone()),
        );
        ctrl.initialize().await;
        let selection = Selection {
            class_name: "Class1A".into(),
            session: "2025-26".into(),
            exam_name: "PT1".into(),
            class_teacher: "Mrs. Emily Davis".into(),
        };
        assert!(ctrl.load_roster(&selection).await);
        (Session::new(ctrl), gate, clock)
    }

    fn indicator(session: &TestSession) -> AutoSaveIndicator {
        session.lock().unwrap().state().auto_save.indicator()
    }

    #[tokio::test]
    async fn test_grid_stays_editable_during_auto_save() {
        let (session, gate, clock) = loaded_session().await;
        session.lock().unwrap().set_mark("Maths", 0, "9").unwrap();
        clock.advance(5_000);

        let poll = session.poll_auto_save();
        tokio::pin!(poll);
        // run the poll until it waits on the backend
        tokio::select! {
            biased;
            _ = &mut poll => panic!("auto-save finished before the backend answered"),
            _ = tokio::task::yield_now() => {}
        }

        assert_eq!(gate.auto_saves.borrow().len(), 1);
        assert_eq!(indicator(&session), AutoSaveIndicator::Saving);
        assert!(session.should_confirm_unload());
        assert!(session.lock().unwrap().set_mark("Maths", 1, "12").unwrap());
        assert!(session.next_auto_save_at().is_some());

        gate.release.notify_one();
        assert_eq!(poll.await, Ok(true));

        assert!(matches!(indicator(&session), AutoSaveIndicator::Saved { .. }));
        let ctrl = session.lock().unwrap();
        let maths = ctrl.state().entry.as_ref().unwrap().form("Maths").unwrap();
        assert_eq!(maths.card(0).unwrap().mark_input, "9");
        assert_eq!(maths.card(1).unwrap().mark_input, "12");
    }

    #[tokio::test]
    async fn test_outcome_waits_for_user_action() {
        let (session, gate, clock) = loaded_session().await;
        session.lock().unwrap().set_mark("Maths", 0, "9").unwrap();
        clock.advance(5_000);
        gate.fail.set(true);

        let poll = session.poll_auto_save();
        tokio::pin!(poll);
        tokio::select! {
            biased;
            _ = &mut poll => panic!("auto-save finished before the backend answered"),
            _ = tokio::task::yield_now() => {}
        }

        let held = session.lock().unwrap();
        gate.release.notify_one();
        assert_eq!(poll.await, Ok(false));
        assert_eq!(held.state().auto_save.indicator(), AutoSaveIndicator::Saving);
        drop(held);

        assert!(matches!(indicator(&session), AutoSaveIndicator::Failed { .. }));
    }

    #[tokio::test]
    async fn test_auto_save_busy_behind_user_action() {
        let (session, gate, clock) = loaded_session().await;
        session.lock().unwrap().set_mark("Maths", 0, "9").unwrap();
        clock.advance(5_000);

        let held = session.lock().unwrap();
        assert_eq!(session.lock().err(), Some(Busy));
        assert_eq!(session.poll_auto_save().await, Err(Busy));
        assert_eq!(session.flush_auto_save().await, Err(Busy));
        assert!(session.should_confirm_unload());
        assert_eq!(session.next_auto_save_at(), None);
        assert!(!session.selection_complete());
        drop(held);

        assert!(session.next_auto_save_at().is_some());
        assert!(gate.auto_saves.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_flush_sends_current_marks() {
        let (session, gate, clock) = loaded_session().await;
        session.lock().unwrap().set_absent("Maths", 1, true).unwrap();
        gate.release.notify_one();
        assert_eq!(session.flush_auto_save().await, Ok(true));
        assert!(session.next_auto_save_at().is_none());

        let body = gate.auto_saves.borrow()[0].clone();
        assert_eq!(
            body["markslipData"]["subjects"]["Maths"]["marks"][0],
            json!({"rollNo": "2", "admissionNo": "A2", "marks": "AB", "isAbsent": true})
        );

        clock.advance(5_000);
        assert_eq!(session.poll_auto_save().await, Ok(false));
    }
}
