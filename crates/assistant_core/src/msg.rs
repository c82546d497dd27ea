use std::path::PathBuf;

use crate::{NoticeId, Panel, RequestId, SelectedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a new set of files; replaces any previous selection.
    FilesSelected(Vec<SelectedFile>),
    /// User clicked "Upload and Process".
    UploadClicked,
    /// Engine progress for the in-flight upload, in request-body bytes.
    UploadProgress {
        request_id: RequestId,
        loaded: u64,
        total: u64,
    },
    /// Upload round-trip settled. `Ok` carries the backend's message.
    UploadFinished {
        request_id: RequestId,
        result: Result<String, RequestFailure>,
    },
    /// The post-upload display delay elapsed.
    ProgressResetElapsed { request_id: RequestId },
    /// User edited the chat input box.
    ChatInputChanged(String),
    /// Key pressed while the chat input has focus.
    ChatKeyPressed(KeyPress),
    /// User clicked the send button.
    ChatSendClicked,
    /// Chat round-trip settled. `Ok` carries the assistant's answer.
    ChatFinished {
        request_id: RequestId,
        result: Result<String, RequestFailure>,
    },
    /// User edited the report request box.
    ReportInputChanged(String),
    /// User clicked "Generate PDF Report".
    GenerateReportClicked,
    /// Report round-trip and download settled.
    ReportFinished {
        request_id: RequestId,
        result: Result<ReportSaved, RequestFailure>,
    },
    /// A notice reached the end of its display lifetime.
    NoticeExpired { panel: Panel, notice_id: NoticeId },
    /// User closed the notice on a panel.
    NoticeDismissed(Panel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn enter() -> Self {
        Self {
            key: Key::Enter,
            shift: false,
        }
    }

    pub fn shift_enter() -> Self {
        Self {
            key: Key::Enter,
            shift: true,
        }
    }
}

/// Backend or transport failure as seen by the panels.
///
/// `detail` is the human-readable message the backend supplied, if one could
/// be extracted from the error body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestFailure {
    pub detail: Option<String>,
}

impl RequestFailure {
    pub fn with_detail(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    pub fn without_detail() -> Self {
        Self::default()
    }

    /// The backend detail, or `fallback` when none was supplied.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.detail.as_deref() {
            Some(detail) if !detail.trim().is_empty() => detail,
            _ => fallback,
        }
    }
}

/// A report that was downloaded and written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSaved {
    pub filename: String,
    pub path: PathBuf,
}
