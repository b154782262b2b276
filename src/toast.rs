use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_DURATION_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    /// Zero keeps the toast until dismissed
    #[serde(skip)]
    pub duration: Duration,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub fn is_sticky(&self) -> bool {
        self.duration <= Duration::zero()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.is_sticky() {
            None
        } else {
            Some(self.created_at + self.duration)
        }
    }
}

/// Ephemeral notifications, oldest first
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_at(
        &mut self,
        kind: ToastKind,
        title: impl Into<String>,
        message: Option<String>,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.toasts.push_back(Toast {
            id,
            kind,
            title: title.into(),
            message,
            duration,
            created_at: now,
        });
        id
    }

    pub fn push(&mut self, kind: ToastKind, title: impl Into<String>, message: Option<String>) -> u64 {
        self.push_at(
            kind,
            title,
            message,
            Duration::seconds(DEFAULT_DURATION_SECS),
            Utc::now(),
        )
    }

    pub fn success(&mut self, title: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, title, None)
    }

    pub fn error(&mut self, title: impl Into<String>, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, title, Some(message.into()))
    }

    pub fn warning(&mut self, title: impl Into<String>) -> u64 {
        self.push(ToastKind::Warning, title, None)
    }

    pub fn info(&mut self, title: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, title, None)
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        before != self.toasts.len()
    }

    /// Drops every toast whose deadline is at or before `now`
    pub fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.toasts.len();
        self.toasts
            .retain(|t| t.expires_at().map_or(true, |deadline| deadline > now));
        before - self.toasts.len()
    }

    pub fn active(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_ordered() {
        let mut queue = ToastQueue::new();
        let a = queue.success("Saved");
        let b = queue.info("Heads up");
        assert!(b > a);
        let titles: Vec<_> = queue.active().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Saved", "Heads up"]);
    }

    #[test]
    fn expires_exactly_at_deadline() {
        let mut queue = ToastQueue::new();
        let start = Utc::now();
        queue.push_at(ToastKind::Info, "short", None, Duration::seconds(2), start);
        queue.push_at(ToastKind::Info, "long", None, Duration::seconds(10), start);

        assert_eq!(queue.expire(start + Duration::seconds(1)), 0);
        assert_eq!(queue.expire(start + Duration::seconds(2)), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.active().next().unwrap().title, "long");
    }

    #[test]
    fn sticky_toasts_never_expire() {
        let mut queue = ToastQueue::new();
        let start = Utc::now();
        let id = queue.push_at(ToastKind::Error, "offline", None, Duration::zero(), start);

        assert_eq!(queue.expire(start + Duration::days(365)), 0);
        assert!(queue.dismiss(id));
        assert!(queue.is_empty());
        assert!(!queue.dismiss(id));
    }

    #[test]
    fn error_toast_keeps_message() {
        let mut queue = ToastQueue::new();
        queue.error("Upload failed", "File too large");
        let toast = queue.active().next().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message.as_deref(), Some("File too large"));
        assert_eq!(toast.duration, Duration::seconds(DEFAULT_DURATION_SECS));
    }
}
