use std::time::Duration;

use crate::{NoticeId, Panel, RequestId, SelectedFile};

/// How long the upload progress bar lingers after an upload settles.
pub const PROGRESS_RESET_DELAY: Duration = Duration::from_millis(1500);

/// How long a notice stays visible unless dismissed.
pub const NOTICE_LIFETIME: Duration = Duration::from_millis(6000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Upload {
        request_id: RequestId,
        files: Vec<SelectedFile>,
    },
    SendChat {
        request_id: RequestId,
        query: String,
    },
    GenerateReport {
        request_id: RequestId,
        request: String,
    },
    ScheduleProgressReset {
        request_id: RequestId,
        after: Duration,
    },
    ScheduleNoticeExpiry {
        panel: Panel,
        notice_id: NoticeId,
        after: Duration,
    },
}
