pub mod assist_doctor;

use async_trait::async_trait;
use futures::{ Future, Stream, StreamExt };
use log::{ debug, error };
use reqwest::Client as HttpClient;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use self::assist_doctor::AssistDoctorClient;
use super::stream::{ collect_stream, parse_frame, ChunkCallback, LineDecoder };
use super::AssistError;
use crate::config::ServiceConfig;
use crate::models::chat::ChatTurn;
use crate::models::diagnosis::{ DiagnosisResult, MedicalRecord };
use crate::models::stream::{ AggregatedResult, StreamEvent };

/// Events of one streamed answer. Dropping it stops the body read and any further
/// callbacks.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, AssistError>> + Send>>;

#[async_trait]
pub trait DoctorClient: Send + Sync {
    /// Starts a streamed chat turn. Fails if the request is rejected or answered
    /// with a non-success status.
    async fn stream_chat(
        &self,
        query: &str,
        history: &[ChatTurn]
    ) -> Result<EventStream, AssistError>;

    async fn diagnose(&self, record: &MedicalRecord) -> Result<DiagnosisResult, AssistError>;

    /// Sends a message and folds the streamed answer, reporting each fragment to
    /// `on_chunk` as it arrives.
    async fn send_message_with(
        &self,
        query: &str,
        history: &[ChatTurn],
        on_chunk: Option<ChunkCallback<'_>>
    ) -> Result<AggregatedResult, AssistError> {
        let events = self.stream_chat(query, history).await?;
        collect_stream(events, history, on_chunk).await
    }

    /// Like `send_message_with`, but every failure becomes the placeholder answer
    /// with `error` set.
    async fn send_message(
        &self,
        query: &str,
        history: &[ChatTurn],
        on_chunk: Option<ChunkCallback<'_>>
    ) -> AggregatedResult {
        match self.send_message_with(query, history, on_chunk).await {
            Ok(result) => result,
            Err(e) => {
                error!("Error calling AssistDoctor API: {}", e);
                AggregatedResult::fallback(e.to_string())
            }
        }
    }

    /// Like `diagnose`, but failures become `{results: [], error}`.
    async fn diagnose_disease(&self, record: &MedicalRecord) -> DiagnosisResult {
        match self.diagnose(record).await {
            Ok(result) => result,
            Err(e) => {
                error!("Error calling AssistDoctor diagnosis API: {}", e);
                DiagnosisResult::fallback(e.to_string())
            }
        }
    }
}

pub fn create_streaming_response<F, Fut>(response_fn: F) -> EventStream
    where
        F: FnOnce(mpsc::Sender<Result<StreamEvent, AssistError>>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static
{
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        response_fn(tx).await;
    });

    Box::pin(ReceiverStream::new(rx))
}

/// POSTs `payload` to `url` and exposes the `data: ` frames of the response body
/// as an `EventStream`.
pub async fn http_stream_events(
    http: &HttpClient,
    url: &str,
    payload: &(impl serde::Serialize + Sync)
) -> Result<EventStream, AssistError> {
    let resp = http.post(url).json(payload).send().await?;
    if !resp.status().is_success() {
        return Err(AssistError::Status(resp.status()));
    }

    Ok(
        create_streaming_response(move |tx| async move {
            let mut bytes = resp.bytes_stream();
            let mut decoder = LineDecoder::new();

            loop {
                // the consumer may go away while the server only sends non-data lines
                let chunk = tokio::select! {
                    _ = tx.closed() => {
                        debug!("Event stream dropped, closing AssistDoctor response");
                        return;
                    }
                    chunk = bytes.next() => chunk,
                };
                let Some(chunk) = chunk else {
                    break;
                };
                let buf = match chunk {
                    Ok(buf) => buf,
                    Err(e) => {
                        let _ = tx.send(Err(AssistError::Transport(e))).await;
                        return;
                    }
                };
                debug!("AssistDoctor raw chunk: {} bytes", buf.len());

                for line in decoder.feed(&buf) {
                    let Some(event) = parse_frame(&line) else {
                        continue;
                    };
                    let terminal = event.service_error().is_some();
                    if tx.send(Ok(event)).await.is_err() || terminal {
                        return;
                    }
                }
            }

            decoder.finish();
        })
    )
}

pub fn new_client(config: &ServiceConfig) -> Result<Arc<dyn DoctorClient>, AssistError> {
    let client = AssistDoctorClient::new(config.clone())?;
    Ok(Arc::new(client))
}
