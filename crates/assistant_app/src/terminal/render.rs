use assistant_core::{AppViewModel, ChatRole, Notice, RowStatus, Severity};

/// Lines to print for the transition from `prev` to `next`.
pub fn render(prev: &AppViewModel, next: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    render_upload(prev, next, &mut lines);

    if next.is_ready && !prev.is_ready {
        lines.push("Documents processed. Chat and report generation are now available.".to_string());
    }

    push_notice("upload", prev.upload.notice.as_ref(), next.upload.notice.as_ref(), &mut lines);
    push_notice("report", prev.report.notice.as_ref(), next.report.notice.as_ref(), &mut lines);

    if next.report.last_saved_path != prev.report.last_saved_path {
        if let Some(path) = &next.report.last_saved_path {
            lines.push(format!("Report saved to {}", path.display()));
        }
    }

    render_chat(prev, next, &mut lines);
    push_notice("chat", prev.chat.notice.as_ref(), next.chat.notice.as_ref(), &mut lines);

    lines
}

/// Full status block, printed at startup.
pub fn render_status(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!(
        "Documents: {}",
        if view.upload.selected_names.is_empty() {
            view.upload.selection_label.clone()
        } else {
            format!(
                "{} ({})",
                view.upload.selection_label,
                view.upload.selected_names.join(", ")
            )
        }
    )];
    lines.push(format!("Report request: {}", view.report.request));
    if view.is_ready {
        lines.push("Assistant ready.".to_string());
    } else {
        lines.push("Upload documents to start chatting.".to_string());
    }
    lines
}

fn render_upload(prev: &AppViewModel, next: &AppViewModel, lines: &mut Vec<String>) {
    let (p, n) = (&prev.upload, &next.upload);

    if n.selected_names != p.selected_names && !n.selected_names.is_empty() {
        lines.push(format!(
            "{}: {}",
            n.selection_label,
            n.selected_names.join(", ")
        ));
    }
    if n.uploading && !p.uploading {
        lines.push("Processing...".to_string());
    }
    if n.uploading && n.progress != p.progress {
        lines.push(format!("Uploading {:>3}% {}", n.progress, progress_bar(n.progress)));
    }
}

fn render_chat(prev: &AppViewModel, next: &AppViewModel, lines: &mut Vec<String>) {
    let (p, n) = (&prev.chat, &next.chat);

    for row in n.rows.iter().skip(p.rows.len()) {
        let prefix = match (row.role, row.status) {
            (ChatRole::User, _) => "you",
            (ChatRole::Assistant, RowStatus::Failed) => "assistant (error)",
            (ChatRole::Assistant, _) => "assistant",
        };
        lines.push(format!("{prefix}> {}", row.text));
    }
    if n.sending && !p.sending {
        lines.push("Assistant is thinking...".to_string());
    }
    if n.input != p.input && n.input.ends_with('\n') {
        lines.push("... (message continues)".to_string());
    }
}

fn push_notice(panel: &str, prev: Option<&Notice>, next: Option<&Notice>, lines: &mut Vec<String>) {
    let Some(notice) = next else {
        return;
    };
    if prev.map(|p| p.id) == Some(notice.id) {
        return;
    }
    let label = match notice.severity {
        Severity::Info => "info",
        Severity::Success => "ok",
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    lines.push(format!("[{label}] {panel}: {}", notice.text));
}

fn progress_bar(percent: u8) -> String {
    const WIDTH: usize = 20;
    let filled = usize::from(percent.min(100)) * WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use assistant_core::{update, AppState, Effect, Msg, RequestFailure, SelectedFile};

    use super::*;

    fn step(state: AppState, msg: Msg) -> (AppState, Vec<Effect>, Vec<String>) {
        let prev = state.view();
        let (state, effects) = update(state, msg);
        let lines = render(&prev, &state.view());
        (state, effects, lines)
    }

    fn upload_id(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Upload { request_id, .. } => Some(*request_id),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn upload_lifecycle_lines() {
        let (state, _, lines) = step(
            AppState::new(),
            Msg::FilesSelected(vec![SelectedFile::new("a.pdf", vec![0; 10])]),
        );
        assert_eq!(lines, vec!["1 file(s) selected: a.pdf"]);

        let (state, effects, lines) = step(state, Msg::UploadClicked);
        assert_eq!(lines, vec!["Processing..."]);
        let request_id = upload_id(&effects);

        let (state, _, lines) = step(
            state,
            Msg::UploadProgress {
                request_id,
                loaded: 5,
                total: 10,
            },
        );
        assert_eq!(lines, vec!["Uploading  50% [##########..........]"]);

        let (_state, _, lines) = step(
            state,
            Msg::UploadFinished {
                request_id,
                result: Ok("Successfully uploaded and processed 1 files.".to_string()),
            },
        );
        assert_eq!(
            lines,
            vec![
                "Documents processed. Chat and report generation are now available.",
                "[ok] upload: Successfully uploaded and processed 1 files.",
            ]
        );
    }

    #[test]
    fn chat_rows_and_error_notice() {
        let (state, _, _) = step(
            AppState::new(),
            Msg::FilesSelected(vec![SelectedFile::new("a.pdf", vec![1])]),
        );
        let (state, effects, _) = step(state, Msg::UploadClicked);
        let (state, _, _) = step(
            state,
            Msg::UploadFinished {
                request_id: upload_id(&effects),
                result: Ok("ok".to_string()),
            },
        );

        let (state, _, _) = step(state, Msg::ChatInputChanged("Any allergies?".to_string()));
        let (state, effects, lines) = step(state, Msg::ChatSendClicked);
        assert_eq!(lines, vec!["you> Any allergies?", "Assistant is thinking..."]);

        let request_id = match effects.as_slice() {
            [Effect::SendChat { request_id, .. }] => *request_id,
            other => panic!("unexpected effects {other:?}"),
        };
        let (_state, _, lines) = step(
            state,
            Msg::ChatFinished {
                request_id,
                result: Err(RequestFailure::with_detail("model stopped")),
            },
        );
        assert_eq!(
            lines,
            vec![
                "assistant (error)> Error: model stopped",
                "[error] chat: Error: model stopped",
            ]
        );
    }

    #[test]
    fn unchanged_view_renders_nothing() {
        let view = AppState::new().view();
        assert!(render(&view, &view).is_empty());
    }
}
