use std::fmt;

use crate::{AppState, Effect, Notice, Panel, RequestFailure, RequestId, Severity, PROGRESS_RESET_DELAY};

pub const UPLOAD_FALLBACK_ERROR: &str = "An unexpected error occurred during upload.";
pub(crate) const NO_FILES_SELECTED: &str = "Please select files to upload.";

/// File types the backend knows how to ingest.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "docx", "xlsx", "png", "jpg", "jpeg"];

/// A file picked by the user: display name plus its full contents.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Payloads can be megabytes; keep them out of debug output.
impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

pub fn is_accepted_file_name(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ACCEPTED_EXTENSIONS
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}

/// Rounded percentage of `loaded` over `total`, clamped to `0..=100`.
///
/// Returns `None` when `total` is zero.
pub fn upload_percent(loaded: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let loaded = u128::from(loaded.min(total));
    let total = u128::from(total);
    // Round half up.
    let percent = (loaded * 200 + total) / (total * 2);
    Some(percent.min(100) as u8)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct UploadPanel {
    pub(crate) selection: Vec<SelectedFile>,
    pub(crate) in_flight: Option<RequestId>,
    pub(crate) last_settled: Option<RequestId>,
    pub(crate) progress: u8,
    /// Bumped whenever the file picker must be cleared.
    pub(crate) file_input_generation: u64,
    pub(crate) notice: Option<Notice>,
}

impl UploadPanel {
    pub(crate) fn is_uploading(&self) -> bool {
        self.in_flight.is_some()
    }
}

pub(crate) fn files_selected(state: &mut AppState, files: Vec<SelectedFile>) -> Vec<Effect> {
    if state.upload.is_uploading() {
        return Vec::new();
    }

    let (accepted, rejected): (Vec<_>, Vec<_>) = files
        .into_iter()
        .partition(|file| is_accepted_file_name(&file.name));

    state.upload.selection = accepted;
    state.upload.progress = 0;
    state.mark_dirty();

    if rejected.is_empty() {
        return Vec::new();
    }
    let names = rejected
        .iter()
        .map(|file| file.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    vec![state.set_notice(
        Panel::Upload,
        Severity::Warning,
        format!("Skipped unsupported file(s): {names}"),
    )]
}

pub(crate) fn submit(state: &mut AppState) -> Vec<Effect> {
    if state.upload.is_uploading() {
        return Vec::new();
    }
    if state.upload.selection.is_empty() {
        return vec![state.set_notice(Panel::Upload, Severity::Warning, NO_FILES_SELECTED)];
    }

    let request_id = state.next_request_id();
    state.upload.in_flight = Some(request_id);
    state.upload.progress = 0;
    state.mark_dirty();
    vec![Effect::Upload {
        request_id,
        files: state.upload.selection.clone(),
    }]
}

pub(crate) fn progress(state: &mut AppState, request_id: RequestId, loaded: u64, total: u64) -> Vec<Effect> {
    if state.upload.in_flight != Some(request_id) {
        return Vec::new();
    }
    let Some(percent) = upload_percent(loaded, total) else {
        return Vec::new();
    };
    if percent > state.upload.progress {
        state.upload.progress = percent;
        state.mark_dirty();
    }
    Vec::new()
}

pub(crate) fn finished(
    state: &mut AppState,
    request_id: RequestId,
    result: Result<String, RequestFailure>,
) -> Vec<Effect> {
    if state.upload.in_flight != Some(request_id) {
        return Vec::new();
    }
    state.upload.in_flight = None;
    state.upload.last_settled = Some(request_id);
    state.mark_dirty();

    let notice = match result {
        Ok(message) => {
            state.upload.selection.clear();
            state.upload.file_input_generation += 1;
            state.gate.open();
            state.set_notice(Panel::Upload, Severity::Success, message)
        }
        Err(failure) => {
            let text = failure.message_or(UPLOAD_FALLBACK_ERROR).to_string();
            state.set_notice(Panel::Upload, Severity::Error, text)
        }
    };

    vec![
        notice,
        Effect::ScheduleProgressReset {
            request_id,
            after: PROGRESS_RESET_DELAY,
        },
    ]
}

pub(crate) fn progress_reset(state: &mut AppState, request_id: RequestId) -> Vec<Effect> {
    if state.upload.is_uploading() || state.upload.last_settled != Some(request_id) {
        return Vec::new();
    }
    if state.upload.progress != 0 {
        state.upload.progress = 0;
        state.mark_dirty();
    }
    Vec::new()
}
