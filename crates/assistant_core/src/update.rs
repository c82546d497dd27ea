use crate::{chat, report, upload, AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(files) => upload::files_selected(&mut state, files),
        Msg::UploadClicked => upload::submit(&mut state),
        Msg::UploadProgress {
            request_id,
            loaded,
            total,
        } => upload::progress(&mut state, request_id, loaded, total),
        Msg::UploadFinished { request_id, result } => {
            upload::finished(&mut state, request_id, result)
        }
        Msg::ProgressResetElapsed { request_id } => upload::progress_reset(&mut state, request_id),
        Msg::ChatInputChanged(text) => chat::input_changed(&mut state, text),
        Msg::ChatKeyPressed(press) => chat::key_pressed(&mut state, press),
        Msg::ChatSendClicked => chat::submit(&mut state),
        Msg::ChatFinished { request_id, result } => chat::finished(&mut state, request_id, result),
        Msg::ReportInputChanged(text) => report::input_changed(&mut state, text),
        Msg::GenerateReportClicked => report::submit(&mut state),
        Msg::ReportFinished { request_id, result } => {
            report::finished(&mut state, request_id, result)
        }
        Msg::NoticeExpired { panel, notice_id } => {
            state.clear_notice(panel, Some(notice_id));
            Vec::new()
        }
        Msg::NoticeDismissed(panel) => {
            state.clear_notice(panel, None);
            Vec::new()
        }
    };

    (state, effects)
}
