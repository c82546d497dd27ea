use crate::{AppState, Effect, Notice, Panel, ReportSaved, RequestFailure, RequestId, Severity};

pub const DEFAULT_REPORT_REQUEST: &str = "Generate a report with Introduction and Clinical Findings";
pub const REPORT_FALLBACK_ERROR: &str = "An unexpected error occurred during report generation.";
pub(crate) const REPORT_NOT_READY: &str = "Please upload documents before generating a report.";
pub(crate) const REPORT_GENERATING: &str = "Generating report... This may take a moment.";
pub(crate) const REPORT_DONE: &str = "Report generated and download started.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportPanel {
    pub(crate) request: String,
    pub(crate) in_flight: Option<RequestId>,
    pub(crate) last_saved: Option<ReportSaved>,
    pub(crate) notice: Option<Notice>,
}

impl Default for ReportPanel {
    fn default() -> Self {
        Self {
            request: DEFAULT_REPORT_REQUEST.to_string(),
            in_flight: None,
            last_saved: None,
            notice: None,
        }
    }
}

impl ReportPanel {
    pub(crate) fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }
}

pub(crate) fn input_changed(state: &mut AppState, text: String) -> Vec<Effect> {
    if state.report.is_generating() || state.report.request == text {
        return Vec::new();
    }
    state.report.request = text;
    state.mark_dirty();
    Vec::new()
}

pub(crate) fn submit(state: &mut AppState) -> Vec<Effect> {
    if !state.is_ready() {
        return vec![state.set_notice(Panel::Report, Severity::Warning, REPORT_NOT_READY)];
    }
    if state.report.request.trim().is_empty() || state.report.is_generating() {
        return Vec::new();
    }

    let request_id = state.next_request_id();
    state.report.in_flight = Some(request_id);
    let notice = state.set_notice(Panel::Report, Severity::Info, REPORT_GENERATING);
    vec![
        notice,
        Effect::GenerateReport {
            request_id,
            request: state.report.request.clone(),
        },
    ]
}

pub(crate) fn finished(
    state: &mut AppState,
    request_id: RequestId,
    result: Result<ReportSaved, RequestFailure>,
) -> Vec<Effect> {
    if state.report.in_flight != Some(request_id) {
        return Vec::new();
    }
    state.report.in_flight = None;
    state.mark_dirty();

    match result {
        Ok(saved) => {
            state.report.last_saved = Some(saved);
            vec![state.set_notice(Panel::Report, Severity::Success, REPORT_DONE)]
        }
        Err(failure) => {
            let text = failure.message_or(REPORT_FALLBACK_ERROR).to_string();
            vec![state.set_notice(Panel::Report, Severity::Error, text)]
        }
    }
}
