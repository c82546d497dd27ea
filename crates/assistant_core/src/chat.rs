use crate::{AppState, Effect, Key, KeyPress, Notice, Panel, RequestFailure, RequestId, Severity};

pub const CHAT_FALLBACK_ERROR: &str = "Could not get response from assistant.";
pub(crate) const CHAT_NOT_READY: &str = "Please upload and process documents first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatBody {
    Text(String),
    /// Request failed; holds the detail (or fallback) without any prefix.
    Failed(String),
}

/// One immutable turn in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub body: ChatBody,
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            body: ChatBody::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            body: ChatBody::Text(text.into()),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            body: ChatBody::Failed(detail.into()),
        }
    }

    /// Text as shown in the conversation, including the error prefix for
    /// failed turns.
    pub fn display_text(&self) -> String {
        match &self.body {
            ChatBody::Text(text) => text.clone(),
            ChatBody::Failed(detail) => format_chat_error(detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ChatPanel {
    pub(crate) input: String,
    pub(crate) history: Vec<ChatEntry>,
    pub(crate) in_flight: Option<RequestId>,
    pub(crate) notice: Option<Notice>,
}

impl ChatPanel {
    pub(crate) fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }
}

pub(crate) fn format_chat_error(detail: &str) -> String {
    format!("Error: {detail}")
}

pub(crate) fn input_changed(state: &mut AppState, text: String) -> Vec<Effect> {
    if state.chat.input == text {
        return Vec::new();
    }
    state.chat.input = text;
    state.mark_dirty();
    Vec::new()
}

pub(crate) fn key_pressed(state: &mut AppState, press: KeyPress) -> Vec<Effect> {
    match press {
        KeyPress {
            key: Key::Enter,
            shift: true,
        } => {
            if state.chat.is_sending() || !state.is_ready() {
                return Vec::new();
            }
            state.chat.input.push('\n');
            state.mark_dirty();
            Vec::new()
        }
        KeyPress {
            key: Key::Enter,
            shift: false,
        } => submit(state),
        KeyPress {
            key: Key::Other, ..
        } => Vec::new(),
    }
}

pub(crate) fn submit(state: &mut AppState) -> Vec<Effect> {
    if !state.is_ready() {
        return vec![state.set_notice(Panel::Chat, Severity::Warning, CHAT_NOT_READY)];
    }
    if state.chat.input.trim().is_empty() || state.chat.is_sending() {
        return Vec::new();
    }

    let query = std::mem::take(&mut state.chat.input);
    let request_id = state.next_request_id();
    state.chat.history.push(ChatEntry::user(query.clone()));
    state.chat.in_flight = Some(request_id);
    state.mark_dirty();
    vec![Effect::SendChat { request_id, query }]
}

pub(crate) fn finished(
    state: &mut AppState,
    request_id: RequestId,
    result: Result<String, RequestFailure>,
) -> Vec<Effect> {
    if state.chat.in_flight != Some(request_id) {
        return Vec::new();
    }
    state.chat.in_flight = None;
    state.mark_dirty();

    match result {
        Ok(answer) => {
            state.chat.history.push(ChatEntry::assistant(answer));
            Vec::new()
        }
        Err(failure) => {
            let detail = failure.message_or(CHAT_FALLBACK_ERROR).to_string();
            let notice_text = format_chat_error(&detail);
            state.chat.history.push(ChatEntry::failed(detail));
            vec![state.set_notice(Panel::Chat, Severity::Error, notice_text)]
        }
    }
}
