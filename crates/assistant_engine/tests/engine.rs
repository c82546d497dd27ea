use std::sync::{mpsc, Arc};
use std::time::Duration;

use assistant_engine::{
    run_report_job, Backend, BackendError, ChannelEventSink, EngineConfig,
    EngineEvent, EngineHandle, EventSink, FailureKind, ReportPayload, ReqwestBackend,
    BackendSettings, ReportStore, RequestId, UploadFile,
};
use bytes::Bytes;
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct ScriptedBackend;

#[async_trait::async_trait]
impl Backend for ScriptedBackend {
    async fn upload(
        &self,
        request_id: RequestId,
        files: &[UploadFile],
        sink: Arc<dyn EventSink>,
    ) -> Result<String, BackendError> {
        let total = files.iter().map(|f| f.bytes.len() as u64).sum();
        sink.emit(EngineEvent::UploadProgress {
            request_id,
            loaded: total,
            total,
        });
        Ok(format!("Successfully uploaded and processed {} files.", files.len()))
    }

    async fn chat(&self, query: &str) -> Result<String, BackendError> {
        Ok(format!("echo: {query}"))
    }

    async fn generate_report(&self, _request: &str) -> Result<ReportPayload, BackendError> {
        Ok(ReportPayload {
            bytes: Bytes::from_static(b"%PDF"),
            content_disposition: None,
        })
    }
}

fn fixed_clock_config(dir: std::path::PathBuf) -> EngineConfig {
    let mut config = EngineConfig::default_with_download_dir(dir);
    config.now_millis = Arc::new(|| 1_700_000_000_000_i64);
    config
}

fn recv(rx: &mpsc::Receiver<EngineEvent>) -> EngineEvent {
    rx.recv_timeout(Duration::from_secs(5)).expect("engine event")
}

#[test]
fn engine_emits_one_completion_per_command() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(tx));
    let engine = EngineHandle::with_backend(
        Arc::new(ScriptedBackend),
        fixed_clock_config(dir.path().to_path_buf()),
        sink,
    )
    .unwrap();

    engine.upload(1, vec![UploadFile::new("a.pdf", b"abcd".to_vec())]);
    assert_eq!(
        recv(&rx),
        EngineEvent::UploadProgress {
            request_id: 1,
            loaded: 4,
            total: 4,
        }
    );
    assert_eq!(
        recv(&rx),
        EngineEvent::UploadCompleted {
            request_id: 1,
            result: Ok("Successfully uploaded and processed 1 files.".to_string()),
        }
    );

    engine.chat(2, "hello");
    assert_eq!(
        recv(&rx),
        EngineEvent::ChatCompleted {
            request_id: 2,
            result: Ok("echo: hello".to_string()),
        }
    );

    engine.generate_report(3, "Introduction");
    match recv(&rx) {
        EngineEvent::ReportCompleted {
            request_id: 3,
            result: Ok(download),
        } => {
            assert_eq!(download.filename, "generated_report_1700000000000.pdf");
            assert_eq!(download.bytes_written, 4);
            assert_eq!(std::fs::read(&download.path).unwrap(), b"%PDF");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn report_job_saves_under_server_filename() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_report/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", r#"attachment; filename="clinical.pdf""#)
                .set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;
    let backend = ReqwestBackend::new(BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    })
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::new(dir.path().to_path_buf());

    let download = run_report_job(&backend, &store, 5, "Introduction")
        .await
        .expect("report saved");

    assert_eq!(download.filename, "clinical.pdf");
    assert_eq!(download.path, dir.path().join("clinical.pdf"));
    assert_eq!(std::fs::read(&download.path).unwrap(), b"%PDF-1.7");
}

#[tokio::test]
async fn report_job_without_disposition_uses_timestamp_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_report/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF".to_vec(), "application/pdf"))
        .mount(&server)
        .await;
    let backend = ReqwestBackend::new(BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    })
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::new(dir.path().to_path_buf());

    let download = run_report_job(&backend, &store, 1_712_345_678_901, "x")
        .await
        .unwrap();

    assert_eq!(download.filename, "generated_report_1712345678901.pdf");
}

#[tokio::test]
async fn report_job_save_failure_is_io_error_with_detail() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("downloads");
    std::fs::write(&blocker, b"file, not dir").unwrap();
    let store = ReportStore::new(blocker);

    let err = run_report_job(&ScriptedBackend, &store, 1, "x")
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Io);
    assert!(err
        .detail
        .as_deref()
        .unwrap()
        .starts_with("Could not save report 'generated_report_1.pdf'"));
}
