//! Assistant engine: backend HTTP client and effect execution.
mod backend;
mod disposition;
mod engine;
mod error_body;
mod persist;
mod types;

pub use backend::{
    Backend, BackendSettings, ChannelEventSink, EventSink, ReqwestBackend, DEFAULT_BASE_URL,
    UPLOAD_SUCCESS_FALLBACK,
};
pub use disposition::{filename_from_content_disposition, resolve_report_filename, sanitize_filename};
pub use engine::{run_report_job, EngineConfig, EngineHandle};
pub use error_body::{decode_error_body, DecodeStage, ErrorBody};
pub use persist::{prepare_download_dir, PersistError, ReportStore};
pub use types::{
    BackendError, EngineError, EngineEvent, FailureKind, ReportDownload, ReportPayload, RequestId, UploadFile,
};
