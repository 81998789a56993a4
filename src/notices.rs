// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transient user-facing notices (the CLI equivalent of a toast).

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Where notices go. Implementations must not block.
pub trait NoticeSink: Send + Sync {
    fn push(&self, notice: Notice);
}

/// Prints notices to stderr for interactive use.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotices;

impl NoticeSink for ConsoleNotices {
    fn push(&self, notice: Notice) {
        let prefix = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{}] {}", prefix, notice.message);
    }
}

/// Emits notices as log events only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotices;

impl NoticeSink for TracingNotices {
    fn push(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(notice = %notice.message, "User notice"),
            _ => tracing::info!(notice = %notice.message, "User notice"),
        }
    }
}

/// Keeps every notice in memory; used by tests and embedding apps that
/// render notices themselves.
#[derive(Debug, Default)]
pub struct RecordingNotices {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }
}

impl NoticeSink for RecordingNotices {
    fn push(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice);
    }
}
