use crate::chat::ChatPanel;
use crate::report::ReportPanel;
use crate::upload::UploadPanel;
use crate::view_model::AppViewModel;
use crate::{Effect, Notice, NoticeId, Panel, ReadinessGate, Severity, NOTICE_LIFETIME};

pub type RequestId = u64;

/// Whole-session state for the three panels and the readiness gate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) gate: ReadinessGate,
    pub(crate) upload: UploadPanel,
    pub(crate) report: ReportPanel,
    pub(crate) chat: ChatPanel,
    last_request_id: RequestId,
    last_notice_id: NoticeId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self, self.dirty)
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_open()
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.last_request_id
    }

    /// Replaces the panel's notice and returns the effect that expires it.
    pub(crate) fn set_notice(
        &mut self,
        panel: Panel,
        severity: Severity,
        text: impl Into<String>,
    ) -> Effect {
        self.last_notice_id += 1;
        let notice_id = self.last_notice_id;
        *self.notice_slot(panel) = Some(Notice {
            id: notice_id,
            severity,
            text: text.into(),
        });
        self.mark_dirty();
        Effect::ScheduleNoticeExpiry {
            panel,
            notice_id,
            after: NOTICE_LIFETIME,
        }
    }

    pub(crate) fn clear_notice(&mut self, panel: Panel, only_id: Option<NoticeId>) {
        let slot = self.notice_slot(panel);
        let matches = match (slot.as_ref(), only_id) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(notice), Some(id)) => notice.id == id,
        };
        if matches {
            *slot = None;
            self.mark_dirty();
        }
    }

    pub(crate) fn notice(&self, panel: Panel) -> Option<&Notice> {
        match panel {
            Panel::Upload => self.upload.notice.as_ref(),
            Panel::Report => self.report.notice.as_ref(),
            Panel::Chat => self.chat.notice.as_ref(),
        }
    }

    fn notice_slot(&mut self, panel: Panel) -> &mut Option<Notice> {
        match panel {
            Panel::Upload => &mut self.upload.notice,
            Panel::Report => &mut self.report.notice,
            Panel::Chat => &mut self.chat.notice,
        }
    }
}
