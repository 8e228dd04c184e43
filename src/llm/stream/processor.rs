//! Turns decoded lines into `StreamEvent`s and folds them into an `AggregatedResult`.

use futures::{ Stream, StreamExt };
use log::warn;

use crate::llm::AssistError;
use crate::models::chat::ChatTurn;
use crate::models::stream::{ AggregatedResult, StreamChunk, StreamEvent };

pub const DATA_PREFIX: &str = "data: ";

/// Callback invoked once per content fragment, in arrival order.
pub type ChunkCallback<'a> = &'a mut (dyn FnMut(&StreamChunk) + Send);

/// Parses one decoded line.
///
/// Returns `None` for lines that are not `data: ` frames. A frame whose payload is
/// not valid JSON is logged and also yields `None`, so one corrupt frame never ends
/// the stream.
pub fn parse_frame(line: &str) -> Option<StreamEvent> {
    let data = line.strip_prefix(DATA_PREFIX)?;
    match serde_json::from_str::<StreamEvent>(data) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Error parsing SSE data: {} for line: {}", e, line);
            None
        }
    }
}

/// Running state of one send. Never shared between sends.
#[derive(Debug, Default)]
pub struct StreamAggregator {
    full_content: String,
    final_messages: Option<Vec<ChatTurn>>,
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event.
    ///
    /// An event carrying a non-empty `error` is terminal and returns
    /// `AssistError::Service`; the caller must stop feeding events after that.
    /// Otherwise returns the chunk to hand to the callback when the event carried
    /// content.
    pub fn apply(&mut self, event: StreamEvent) -> Result<Option<StreamChunk>, AssistError> {
        if let Some(message) = event.service_error() {
            return Err(AssistError::Service(message.to_string()));
        }

        if let Some(messages) = event.final_messages() {
            self.final_messages = Some(messages.clone());
        }

        let done = event.is_done();
        Ok(event.content.map(|content| {
            self.full_content.push_str(&content);
            StreamChunk {
                content,
                full_content: self.full_content.clone(),
                done,
            }
        }))
    }

    pub fn full_content(&self) -> &str {
        &self.full_content
    }

    /// Builds the final result, using `history` when no final frame supplied one.
    pub fn finish(self, history: &[ChatTurn]) -> AggregatedResult {
        AggregatedResult {
            answer: self.full_content.clone(),
            content: self.full_content,
            messages: self.final_messages.unwrap_or_else(|| history.to_vec()),
            error: None,
        }
    }
}

/// Drains an event stream into an `AggregatedResult`, calling `on_chunk` for every
/// content fragment. Stops at the first error, whether it came from the transport
/// or from an error frame; the remaining stream is dropped unread.
pub async fn collect_stream<S>(
    mut events: S,
    history: &[ChatTurn],
    mut on_chunk: Option<ChunkCallback<'_>>
) -> Result<AggregatedResult, AssistError>
    where S: Stream<Item = Result<StreamEvent, AssistError>> + Unpin
{
    let mut aggregator = StreamAggregator::new();

    while let Some(event) = events.next().await {
        if let Some(chunk) = aggregator.apply(event?)? {
            if let Some(callback) = on_chunk.as_deref_mut() {
                callback(&chunk);
            }
        }
    }

    Ok(aggregator.finish(history))
}
