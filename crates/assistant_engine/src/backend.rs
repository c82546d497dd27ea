use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use assistant_logging::{assist_debug, assist_info};
use bytes::Bytes;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::error_body::{decode_error_body, ErrorBody};
use crate::{BackendError, EngineEvent, FailureKind, ReportPayload, RequestId, UploadFile};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Shown when the server accepts an upload without saying anything about it.
pub const UPLOAD_SUCCESS_FALLBACK: &str = "Documents uploaded and processed.";

const UPLOAD_PATH: &str = "upload/";
const CHAT_PATH: &str = "chat/";
const REPORT_PATH: &str = "generate_report/";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request timeout. Ingestion and report generation run an LLM on
    /// the server, so this is generous.
    pub request_timeout: Duration,
    /// Upload bodies are streamed in chunks of this size; progress is
    /// reported once per chunk.
    pub upload_chunk_size: usize,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            upload_chunk_size: 64 * 1024,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The three backend endpoints the panels talk to.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Upload all files in one multipart request. Returns the backend's message.
    async fn upload(
        &self,
        request_id: RequestId,
        files: &[UploadFile],
        sink: Arc<dyn EventSink>,
    ) -> Result<String, BackendError>;

    /// Ask one question. Returns the assistant's answer.
    async fn chat(&self, query: &str) -> Result<String, BackendError>;

    /// Request a PDF report.
    async fn generate_report(&self, request: &str) -> Result<ReportPayload, BackendError>;
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    query: &'a str,
}

#[derive(Serialize)]
struct ReportRequestBody<'a> {
    request: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    answer: String,
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: Url,
    upload_chunk_size: usize,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let base_url = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            base_url,
            upload_chunk_size: settings.upload_chunk_size.max(1),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn build_form(
        &self,
        request_id: RequestId,
        files: &[UploadFile],
        sink: Arc<dyn EventSink>,
    ) -> Form {
        let total = files.iter().map(|file| file.bytes.len() as u64).sum();
        let tracker = Arc::new(UploadTracker {
            request_id,
            loaded: AtomicU64::new(0),
            total,
            sink,
        });
        files.iter().fold(Form::new(), |form, file| {
            form.part("files", self.tracked_part(file, tracker.clone()))
        })
    }

    fn tracked_part(&self, file: &UploadFile, tracker: Arc<UploadTracker>) -> Part {
        let length = file.bytes.len() as u64;
        let chunks = split_chunks(&file.bytes, self.upload_chunk_size);
        let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
            tracker.advance(chunk.len() as u64);
            Ok::<Bytes, std::io::Error>(chunk)
        }));
        Part::stream_with_length(reqwest::Body::wrap_stream(stream), length)
            .file_name(file.name.clone())
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn upload(
        &self,
        request_id: RequestId,
        files: &[UploadFile],
        sink: Arc<dyn EventSink>,
    ) -> Result<String, BackendError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        assist_info!("POST {} files={}", url, files.len());
        let form = self.build_form(request_id, files, sink);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        // The documents are ingested once the server answers 2xx; the body
        // only carries the text to show.
        let message = match response.bytes().await {
            Ok(bytes) => match serde_json::from_slice::<UploadResponse>(&bytes) {
                Ok(body) => body.message.filter(|message| !message.trim().is_empty()),
                Err(err) => {
                    assist_debug!("Upload response without a readable message: {}", err);
                    None
                }
            },
            Err(err) => {
                assist_debug!("Could not read upload response body: {}", err);
                None
            }
        };
        Ok(message.unwrap_or_else(|| UPLOAD_SUCCESS_FALLBACK.to_string()))
    }

    async fn chat(&self, query: &str) -> Result<String, BackendError> {
        let url = self.endpoint(CHAT_PATH)?;
        assist_info!("POST {} query_len={}", url, query.len());
        let response = self
            .client
            .post(url)
            .json(&ChatRequestBody { query })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: ChatResponse = read_json(response).await?;
        Ok(body.answer)
    }

    async fn generate_report(&self, request: &str) -> Result<ReportPayload, BackendError> {
        let url = self.endpoint(REPORT_PATH)?;
        assist_info!("POST {} request_len={}", url, request.len());
        let response = self
            .client
            .post(url)
            .json(&ReportRequestBody { request })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(ReportPayload {
            bytes,
            content_disposition,
        })
    }
}

struct UploadTracker {
    request_id: RequestId,
    loaded: AtomicU64,
    total: u64,
    sink: Arc<dyn EventSink>,
}

impl UploadTracker {
    fn advance(&self, bytes: u64) {
        let loaded = self.loaded.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.sink.emit(EngineEvent::UploadProgress {
            request_id: self.request_id,
            loaded: loaded.min(self.total),
            total: self.total,
        });
    }
}

fn split_chunks(bytes: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(bytes.len() / chunk_size + 1);
    let mut offset = 0;
    while offset < bytes.len() {
        let end = (offset + chunk_size).min(bytes.len());
        chunks.push(bytes.slice(offset..end));
        offset = end;
    }
    chunks
}

fn parse_base_url(raw: &str) -> Result<Url, BackendError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    let url = Url::parse(&normalized)
        .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BackendError::new(
            FailureKind::InvalidUrl,
            format!("unsupported scheme {other}"),
        )),
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| BackendError::new(FailureKind::Decode, err.to_string()))
}

async fn error_from_response(response: reqwest::Response) -> BackendError {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());
    let detail = match response.bytes().await {
        Ok(body) => match decode_error_body(&body, content_type.as_deref()) {
            ErrorBody::Unreadable { stage, reason } => {
                assist_debug!("Unreadable error body ({:?}): {}", stage, reason);
                None
            }
            decoded => decoded.into_detail(),
        },
        Err(err) => {
            assist_debug!("Could not read error body: {}", err);
            None
        }
    };
    BackendError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
        .with_detail(detail)
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash_for_joining() {
        let backend = ReqwestBackend::new(BackendSettings {
            base_url: "http://localhost:9000/api".to_string(),
            ..BackendSettings::default()
        })
        .unwrap();
        assert_eq!(
            backend.endpoint(CHAT_PATH).unwrap().as_str(),
            "http://localhost:9000/api/chat/"
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = ReqwestBackend::new(BackendSettings {
            base_url: "ftp://example.com".to_string(),
            ..BackendSettings::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }

    #[test]
    fn chunks_cover_whole_payload() {
        let bytes = Bytes::from_static(b"abcdefghij");
        let chunks = split_chunks(&bytes, 4);
        let lens: Vec<_> = chunks.iter().map(Bytes::len).collect();
        assert_eq!(lens, vec![4, 4, 2]);
        assert!(split_chunks(&Bytes::new(), 4).is_empty());
    }
}
