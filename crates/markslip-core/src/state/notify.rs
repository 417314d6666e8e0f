use serde::{Deserialize, Serialize};

use super::clock::Millis;
use crate::markslip::MarkslipInfo;

/// How long a toast stays on screen
pub const TOAST_LIFETIME_MS: Millis = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "check-circle",
            ToastKind::Error => "exclamation-circle",
            ToastKind::Warning => "exclamation-triangle",
            ToastKind::Info => "info-circle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub expires_at: Millis,
}

/// Transient notifications, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, now: Millis) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
            expires_at: now + TOAST_LIFETIME_MS,
        });
        id
    }

    /// Drop toasts whose lifetime has passed
    pub fn expire(&mut self, now: Millis) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|t| t.id != id);
    }

    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Content of the modal dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Modal {
    /// Instructions for connecting a backend deployment
    Configuration,
    /// Links to an existing markslip file
    MarkslipInfo { info: MarkslipInfo },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_expire() {
        let mut queue = ToastQueue::new();
        queue.push(ToastKind::Success, "saved", 1_000);
        queue.push(ToastKind::Error, "failed", 3_000);
        assert_eq!(queue.len(), 2);

        queue.expire(5_999);
        assert_eq!(queue.len(), 2);

        queue.expire(6_000);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.last().unwrap().message, "failed");

        queue.expire(8_000);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut queue = ToastQueue::new();
        let a = queue.push(ToastKind::Info, "a", 0);
        let b = queue.push(ToastKind::Info, "b", 0);
        assert_ne!(a, b);
        queue.dismiss(a);
        assert_eq!(queue.visible()[0].id, b);
    }

    #[test]
    fn test_icons() {
        assert_eq!(ToastKind::Warning.icon(), "exclamation-triangle");
        assert_eq!(ToastKind::Info.icon(), "info-circle");
    }

    #[test]
    fn test_modal_serialization() {
        let json = serde_json::to_value(Modal::Configuration).unwrap();
        assert_eq!(json["kind"], "configuration");
    }
}
