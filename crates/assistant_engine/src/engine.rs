use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use assistant_logging::{assist_info, assist_warn};

use crate::backend::{Backend, BackendSettings, EventSink, ReqwestBackend};
use crate::disposition::resolve_report_filename;
use crate::persist::ReportStore;
use crate::{BackendError, EngineError, EngineEvent, FailureKind, ReportDownload, RequestId, UploadFile};

/// Milliseconds since the Unix epoch; used to name reports without a
/// server-suggested filename.
pub type MillisClock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub backend: BackendSettings,
    pub download_dir: PathBuf,
    pub now_millis: MillisClock,
}

impl EngineConfig {
    pub fn default_with_download_dir(download_dir: PathBuf) -> Self {
        Self {
            backend: BackendSettings::default(),
            download_dir,
            now_millis: Arc::new(system_millis),
        }
    }
}

fn system_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

enum EngineCommand {
    Upload {
        request_id: RequestId,
        files: Vec<UploadFile>,
    },
    Chat {
        request_id: RequestId,
        query: String,
    },
    Report {
        request_id: RequestId,
        request: String,
    },
}

/// Handle to the background thread that performs backend round-trips.
///
/// Every command eventually produces exactly one completion event on the
/// sink; uploads also produce progress events before it.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let backend = Arc::new(ReqwestBackend::new(config.backend.clone())?);
        Self::with_backend(backend, config, sink)
    }

    pub fn with_backend(
        backend: Arc<dyn Backend>,
        config: EngineConfig,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let jobs = Arc::new(JobContext {
            backend,
            store: ReportStore::new(config.download_dir),
            now_millis: config.now_millis,
            sink,
        });

        thread::Builder::new()
            .name("assistant-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let jobs = jobs.clone();
                    runtime.spawn(async move {
                        jobs.handle(command).await;
                    });
                }
                assist_info!("Engine command channel closed; shutting down");
            })?;

        Ok(Self { cmd_tx })
    }

    pub fn upload(&self, request_id: RequestId, files: Vec<UploadFile>) {
        self.send(EngineCommand::Upload { request_id, files });
    }

    pub fn chat(&self, request_id: RequestId, query: impl Into<String>) {
        self.send(EngineCommand::Chat {
            request_id,
            query: query.into(),
        });
    }

    pub fn generate_report(&self, request_id: RequestId, request: impl Into<String>) {
        self.send(EngineCommand::Report {
            request_id,
            request: request.into(),
        });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            assist_warn!("Engine thread is gone; command dropped");
        }
    }
}

struct JobContext {
    backend: Arc<dyn Backend>,
    store: ReportStore,
    now_millis: MillisClock,
    sink: Arc<dyn EventSink>,
}

impl JobContext {
    async fn handle(&self, command: EngineCommand) {
        let event = match command {
            EngineCommand::Upload { request_id, files } => {
                let result = self
                    .backend
                    .upload(request_id, &files, self.sink.clone())
                    .await;
                log_outcome("upload", request_id, &result);
                EngineEvent::UploadCompleted { request_id, result }
            }
            EngineCommand::Chat { request_id, query } => {
                let result = self.backend.chat(&query).await;
                log_outcome("chat", request_id, &result);
                EngineEvent::ChatCompleted { request_id, result }
            }
            EngineCommand::Report {
                request_id,
                request,
            } => {
                let result = run_report_job(
                    self.backend.as_ref(),
                    &self.store,
                    (self.now_millis)(),
                    &request,
                )
                .await;
                log_outcome("report", request_id, &result);
                EngineEvent::ReportCompleted { request_id, result }
            }
        };
        self.sink.emit(event);
    }
}

/// Fetch a report and save it under its resolved filename.
pub async fn run_report_job(
    backend: &dyn Backend,
    store: &ReportStore,
    now_millis: i64,
    request: &str,
) -> Result<ReportDownload, BackendError> {
    let payload = backend.generate_report(request).await?;
    let filename = resolve_report_filename(payload.content_disposition.as_deref(), now_millis);
    let path = store.save(&filename, &payload.bytes).map_err(|err| {
        BackendError::new(FailureKind::Io, err.to_string())
            .with_detail(Some(format!("Could not save report '{filename}': {err}")))
    })?;
    Ok(ReportDownload {
        filename,
        path,
        bytes_written: payload.bytes.len() as u64,
    })
}

fn log_outcome<T>(operation: &str, request_id: RequestId, result: &Result<T, BackendError>) {
    match result {
        Ok(_) => assist_info!("{} request {} succeeded", operation, request_id),
        Err(err) => assist_warn!("{} request {} failed: {}", operation, request_id, err),
    }
}
