//! Transient user notices shown in the status area.
//!
//! Notices replace each other (latest wins) and expire on their own; they
//! are the only channel for backend failures, which never crash the UI.

use std::time::{Duration, Instant};

/// How long a notice stays visible.
const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    created: Instant,
}

/// Holder for the current notice, if any.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    current: Option<Notice>,
}

impl Notices {
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Info, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Success, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Error, text);
    }

    fn push(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.current = Some(Notice {
            level,
            text: text.into(),
            created: Instant::now(),
        });
    }

    /// Drops the notice once its lifetime lapses. Returns true if it did.
    pub fn expire(&mut self, now: Instant) -> bool {
        let lapsed = self
            .current
            .as_ref()
            .is_some_and(|n| now.duration_since(n.created) >= NOTICE_TTL);
        if lapsed {
            self.current = None;
        }
        lapsed
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
