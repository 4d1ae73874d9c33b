//! Process-wide transient notifications.
//!
//! Commands push notices from any task; the toast widget drains them on the
//! UI thread and shows each one briefly. The queue is append-only and lives
//! for the whole process, so a notice can never be lost between a command
//! finishing and the next frame. Every notice is mirrored to the log.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

static QUEUE: OnceLock<Mutex<VecDeque<Notice>>> = OnceLock::new();

fn queue() -> &'static Mutex<VecDeque<Notice>> {
    QUEUE.get_or_init(|| Mutex::new(VecDeque::new()))
}

fn push(level: NoticeLevel, message: String) {
    match queue().lock() {
        Ok(mut guard) => guard.push_back(Notice { level, message }),
        // A poisoned queue only means a panicking thread held the lock;
        // the data is a plain VecDeque and still usable.
        Err(poisoned) => poisoned.into_inner().push_back(Notice { level, message }),
    }
}

pub fn success(message: impl Into<String>) {
    let message = message.into();
    log::info!("{message}");
    push(NoticeLevel::Success, message);
}

pub fn warning(message: impl Into<String>) {
    let message = message.into();
    log::warn!("{message}");
    push(NoticeLevel::Warning, message);
}

pub fn error(message: impl Into<String>) {
    let message = message.into();
    log::error!("{message}");
    push(NoticeLevel::Error, message);
}

/// Take every pending notice, oldest first.
pub fn drain() -> Vec<Notice> {
    match queue().lock() {
        Ok(mut guard) => guard.drain(..).collect(),
        Err(poisoned) => poisoned.into_inner().drain(..).collect(),
    }
}
