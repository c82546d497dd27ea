use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use assistant_core::{Effect, Msg, ReportSaved, RequestFailure};
use assistant_engine::{
    BackendError, EngineConfig, EngineError, EngineEvent, EngineHandle, EventSink, UploadFile,
};
use assistant_logging::{assist_debug, assist_info, assist_warn};

use crate::app::AppEvent;

/// Executes core effects: backend calls go to the engine, timers run on
/// short-lived threads. Every result comes back as an `AppEvent::Msg`.
pub struct EffectRunner {
    engine: EngineHandle,
    tx: mpsc::Sender<AppEvent>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, tx: mpsc::Sender<AppEvent>) -> Result<Self, EngineError> {
        let sink = Arc::new(MsgSink { tx: tx.clone() });
        let engine = EngineHandle::new(config, sink)?;
        Ok(Self { engine, tx })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Upload { request_id, files } => {
                    assist_info!("Upload request_id={} files={}", request_id, files.len());
                    let files = files
                        .into_iter()
                        .map(|file| UploadFile::new(file.name, file.bytes))
                        .collect();
                    self.engine.upload(request_id, files);
                }
                Effect::SendChat { request_id, query } => {
                    assist_info!("SendChat request_id={} query_len={}", request_id, query.len());
                    self.engine.chat(request_id, query);
                }
                Effect::GenerateReport {
                    request_id,
                    request,
                } => {
                    assist_info!("GenerateReport request_id={}", request_id);
                    self.engine.generate_report(request_id, request);
                }
                Effect::ScheduleProgressReset { request_id, after } => {
                    self.schedule(after, Msg::ProgressResetElapsed { request_id });
                }
                Effect::ScheduleNoticeExpiry {
                    panel,
                    notice_id,
                    after,
                } => {
                    self.schedule(after, Msg::NoticeExpired { panel, notice_id });
                }
            }
        }
    }

    fn schedule(&self, after: Duration, msg: Msg) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            thread::sleep(after);
            let _ = tx.send(AppEvent::Msg(msg));
        });
    }
}

struct MsgSink {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppEvent::Msg(map_event(event)));
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadProgress {
            request_id,
            loaded,
            total,
        } => Msg::UploadProgress {
            request_id,
            loaded,
            total,
        },
        EngineEvent::UploadCompleted { request_id, result } => Msg::UploadFinished {
            request_id,
            result: result.map_err(to_failure),
        },
        EngineEvent::ChatCompleted { request_id, result } => Msg::ChatFinished {
            request_id,
            result: result.map_err(to_failure),
        },
        EngineEvent::ReportCompleted { request_id, result } => Msg::ReportFinished {
            request_id,
            result: result
                .map(|download| {
                    assist_debug!(
                        "Report saved to {:?} ({} bytes)",
                        download.path,
                        download.bytes_written
                    );
                    ReportSaved {
                        filename: download.filename,
                        path: download.path,
                    }
                })
                .map_err(to_failure),
        },
    }
}

fn to_failure(err: BackendError) -> RequestFailure {
    assist_warn!("Backend request failed: {}", err);
    RequestFailure { detail: err.detail }
}
