use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use thiserror::Error;

pub type RequestId = u64;

/// One file in a multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Raw report response before it is written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPayload {
    pub bytes: Bytes,
    pub content_disposition: Option<String>,
}

/// A report that was downloaded and saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDownload {
    pub filename: String,
    pub path: PathBuf,
    pub bytes_written: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadProgress {
        request_id: RequestId,
        loaded: u64,
        total: u64,
    },
    UploadCompleted {
        request_id: RequestId,
        result: Result<String, BackendError>,
    },
    ChatCompleted {
        request_id: RequestId,
        result: Result<String, BackendError>,
    },
    ReportCompleted {
        request_id: RequestId,
        result: Result<ReportDownload, BackendError>,
    },
}

/// Failure of one backend round-trip.
///
/// `detail` is the human-readable message extracted from the error body, if
/// any. `message` is the technical description used for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
    pub detail: Option<String>,
}

impl BackendError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Success response whose body could not be decoded.
    Decode,
    /// Local filesystem failure while saving a download.
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("backend setup failed: {0}")]
    Backend(#[from] BackendError),
    #[error("engine thread setup failed: {0}")]
    Io(#[from] std::io::Error),
}
