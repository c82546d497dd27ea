use std::path::PathBuf;

use crate::{AppState, ChatBody, ChatRole, Notice, Panel};

/// Immutable snapshot handed to the renderer after each update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub is_ready: bool,
    pub upload: UploadView,
    pub report: ReportView,
    pub chat: ChatView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    pub selected_names: Vec<String>,
    pub selection_label: String,
    pub uploading: bool,
    pub progress: u8,
    pub can_upload: bool,
    pub file_input_generation: u64,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    pub request: String,
    pub generating: bool,
    pub input_enabled: bool,
    pub can_generate: bool,
    pub last_saved_path: Option<PathBuf>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub rows: Vec<ChatRowView>,
    pub input: String,
    pub sending: bool,
    pub input_enabled: bool,
    pub can_send: bool,
    pub placeholder: &'static str,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// User turn still waiting for the assistant.
    Pending,
    Resolved,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRowView {
    pub role: ChatRole,
    pub text: String,
    pub status: RowStatus,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState, dirty: bool) -> Self {
        let is_ready = state.is_ready();
        Self {
            is_ready,
            upload: upload_view(state),
            report: report_view(state, is_ready),
            chat: chat_view(state, is_ready),
            dirty,
        }
    }
}

fn upload_view(state: &AppState) -> UploadView {
    let panel = &state.upload;
    let count = panel.selection.len();
    let selection_label = if count > 0 {
        format!("{count} file(s) selected")
    } else {
        "Choose Files".to_string()
    };
    UploadView {
        selected_names: panel.selection.iter().map(|f| f.name.clone()).collect(),
        selection_label,
        uploading: panel.is_uploading(),
        progress: panel.progress,
        can_upload: !panel.is_uploading() && count > 0,
        file_input_generation: panel.file_input_generation,
        notice: state.notice(Panel::Upload).cloned(),
    }
}

fn report_view(state: &AppState, is_ready: bool) -> ReportView {
    let panel = &state.report;
    let generating = panel.is_generating();
    ReportView {
        request: panel.request.clone(),
        generating,
        input_enabled: is_ready && !generating,
        can_generate: is_ready && !generating && !panel.request.trim().is_empty(),
        last_saved_path: panel.last_saved.as_ref().map(|saved| saved.path.clone()),
        notice: state.notice(Panel::Report).cloned(),
    }
}

fn chat_view(state: &AppState, is_ready: bool) -> ChatView {
    let panel = &state.chat;
    let sending = panel.is_sending();
    let last = panel.history.len().saturating_sub(1);
    let rows = panel
        .history
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let status = match (&entry.body, entry.role) {
                (ChatBody::Failed(_), _) => RowStatus::Failed,
                (_, ChatRole::User) if sending && index == last => RowStatus::Pending,
                _ => RowStatus::Resolved,
            };
            ChatRowView {
                role: entry.role,
                text: entry.display_text(),
                status,
            }
        })
        .collect();

    ChatView {
        rows,
        input: panel.input.clone(),
        sending,
        input_enabled: is_ready && !sending,
        can_send: is_ready && !sending && !panel.input.trim().is_empty(),
        placeholder: if is_ready {
            "Ask a question..."
        } else {
            "Upload documents first..."
        },
        notice: state.notice(Panel::Chat).cloned(),
    }
}
