use async_trait::async_trait;
use log::info;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };

use super::{ http_stream_events, DoctorClient, EventStream };
use crate::config::ServiceConfig;
use crate::llm::AssistError;
use crate::models::chat::ChatTurn;
use crate::models::diagnosis::{ DiagnosisRequest, DiagnosisResult, MedicalRecord };
use crate::models::stream::ChatRequest;

const CHAT_STREAM_ROUTE: &str = "/chat/stream";
const DIAGNOSIS_ROUTE: &str = "/diagnosis";

/// HTTP client for the AssistDoctor service.
///
/// Holds no per-call state, so one instance can serve any number of concurrent
/// sends; each send gets its own decoder and accumulator.
#[derive(Debug, Clone)]
pub struct AssistDoctorClient {
    http: HttpClient,
    config: ServiceConfig,
}

impl AssistDoctorClient {
    pub fn new(config: ServiceConfig) -> Result<Self, AssistError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl DoctorClient for AssistDoctorClient {
    async fn stream_chat(
        &self,
        query: &str,
        history: &[ChatTurn]
    ) -> Result<EventStream, AssistError> {
        let url = self.config.endpoint(CHAT_STREAM_ROUTE);
        let req = ChatRequest::new(query, history);
        info!("Sending chat query ({} history turns) to {}", history.len(), url);

        http_stream_events(&self.http, &url, &req).await
    }

    async fn diagnose(&self, record: &MedicalRecord) -> Result<DiagnosisResult, AssistError> {
        let url = self.config.endpoint(DIAGNOSIS_ROUTE);
        let req = DiagnosisRequest::from(record);
        info!("Requesting diagnosis from {}", url);

        let resp = self.http.post(&url).json(&req).send().await?;
        if !resp.status().is_success() {
            return Err(AssistError::Status(resp.status()));
        }

        Ok(resp.json::<DiagnosisResult>().await?)
    }
}
