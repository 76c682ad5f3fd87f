//! Transient user feedback: permission warnings, validation errors, save
//! confirmations.
//!
//! Notices expire after a severity-dependent duration; the clock is passed
//! in by the session loop rather than read here. A bounded ring of expired
//! notices is kept so a client can render a review panel.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

/// How many expired notices the review ring retains.
pub const NOTICE_HISTORY_MAX: usize = 50;

/// Auto-dismiss after this many milliseconds for info/success.
pub const DEFAULT_DISMISS_MS: u64 = 4_000;

/// Auto-dismiss for warnings.
pub const WARNING_DISMISS_MS: u64 = 6_000;

/// Auto-dismiss for errors.
pub const ERROR_DISMISS_MS: u64 = 8_000;

/// Cap on simultaneously visible notices.
pub const MAX_VISIBLE_NOTICES: usize = 3;

/// Notice severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Severity label for display and logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "OK",
            Self::Warning => "WARN",
            Self::Error => "ERR",
        }
    }

    /// Default auto-dismiss duration for this severity.
    #[must_use]
    pub fn default_dismiss_duration(&self) -> Duration {
        match self {
            Self::Info | Self::Success => Duration::from_millis(DEFAULT_DISMISS_MS),
            Self::Warning => Duration::from_millis(WARNING_DISMISS_MS),
            Self::Error => Duration::from_millis(ERROR_DISMISS_MS),
        }
    }
}

/// A single notice.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Monotonic per-center id; later notices have larger ids.
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub created_at: Instant,
    /// Expiry instant computed at push time.
    pub dismiss_at: Instant,
    /// Set once the notice leaves the active set, by timer or by hand.
    pub dismissed: bool,
}

/// Active notices plus the bounded review ring.
#[derive(Debug, Default)]
pub struct NoticeCenter {
    active: VecDeque<Notice>,
    history: VecDeque<Notice>,
    next_id: u64,
}

impl NoticeCenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new notice with the severity's default dismiss duration.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>, now: Instant) {
        let dismiss_after = severity.default_dismiss_duration();
        self.push_with_duration(severity, message, now, dismiss_after);
    }

    /// Push a notice with a custom dismiss duration.
    pub fn push_with_duration(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        now: Instant,
        dismiss_after: Duration,
    ) {
        let notice = Notice {
            id: self.next_id,
            severity,
            message: message.into(),
            created_at: now,
            dismiss_at: now + dismiss_after,
            dismissed: false,
        };
        self.next_id += 1;

        // Evict the oldest active notice when at capacity.
        if self.active.len() >= MAX_VISIBLE_NOTICES {
            if let Some(mut evicted) = self.active.pop_front() {
                evicted.dismissed = true;
                self.push_history(evicted);
            }
        }

        self.active.push_back(notice);
    }

    /// Tick the notice center: dismiss expired notices.
    /// Returns `true` if any notice was dismissed (caller should redraw).
    pub fn tick(&mut self, now: Instant) -> bool {
        let before = self.active.len();
        let mut expired = Vec::new();

        self.active.retain(|notice| {
            if notice.dismissed || now >= notice.dismiss_at {
                expired.push(notice.clone());
                false
            } else {
                true
            }
        });

        for mut notice in expired {
            notice.dismissed = true;
            self.push_history(notice);
        }

        self.active.len() != before
    }

    /// Dismiss the most recent active notice (user action).
    pub fn dismiss_latest(&mut self) -> bool {
        if let Some(mut notice) = self.active.pop_back() {
            notice.dismissed = true;
            self.push_history(notice);
            true
        } else {
            false
        }
    }

    /// Dismiss all active notices.
    pub fn dismiss_all(&mut self) {
        while let Some(mut notice) = self.active.pop_front() {
            notice.dismissed = true;
            self.push_history(notice);
        }
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Active notices in display order (oldest first).
    #[must_use]
    pub fn active_notices(&self) -> &VecDeque<Notice> {
        &self.active
    }

    /// History entries (oldest first, bounded by `NOTICE_HISTORY_MAX`).
    #[must_use]
    pub fn history(&self) -> &VecDeque<Notice> {
        &self.history
    }

    #[must_use]
    pub fn history_count(&self) -> usize {
        self.history.len()
    }

    fn push_history(&mut self, notice: Notice) {
        if self.history.len() >= NOTICE_HISTORY_MAX {
            self.history.pop_front();
        }
        self.history.push_back(notice);
    }
}
