//! Assistant core: pure state machine for the upload, report and chat panels.
mod chat;
mod effect;
mod gate;
mod msg;
mod notice;
mod report;
mod state;
mod update;
mod upload;
mod view_model;

pub use chat::{ChatBody, ChatEntry, ChatRole, CHAT_FALLBACK_ERROR};
pub use effect::{Effect, NOTICE_LIFETIME, PROGRESS_RESET_DELAY};
pub use gate::ReadinessGate;
pub use msg::{Key, KeyPress, Msg, ReportSaved, RequestFailure};
pub use notice::{Notice, NoticeId, Panel, Severity};
pub use report::{DEFAULT_REPORT_REQUEST, REPORT_FALLBACK_ERROR};
pub use state::{AppState, RequestId};
pub use update::update;
pub use upload::{is_accepted_file_name, upload_percent, SelectedFile, ACCEPTED_EXTENSIONS, UPLOAD_FALLBACK_ERROR};
pub use view_model::{AppViewModel, ChatRowView, ChatView, ReportView, RowStatus, UploadView};
