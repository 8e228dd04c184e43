use log::warn;
use serde::{ Deserialize, Deserializer, Serialize };
use serde_json::Value;

use super::chat::ChatTurn;

pub const FALLBACK_ANSWER: &str = "抱歉，当前无法连接到 AssistDoctor 服务。请检查 API 配置。";

/// Body of `POST /chat/stream`.
#[derive(Serialize, Debug, Clone)]
pub struct ChatRequest<'a> {
    pub query: &'a str,
    pub messages: &'a [ChatTurn],
    pub stream: bool,
}

impl<'a> ChatRequest<'a> {
    pub fn new(query: &'a str, messages: &'a [ChatTurn]) -> Self {
        Self { query: query.trim(), messages, stream: true }
    }
}

/// One decoded `data:` frame.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StreamEvent {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default, deserialize_with = "lenient_history")]
    pub messages: Option<Vec<ChatTurn>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A history that doesn't fit `ChatTurn` is dropped so the rest of the frame
/// (its content in particular) still gets through.
fn lenient_history<'de, D>(deserializer: D) -> Result<Option<Vec<ChatTurn>>, D::Error>
    where D: Deserializer<'de>
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(
        value.and_then(|v| {
            match serde_json::from_value::<Vec<ChatTurn>>(v) {
                Ok(turns) => Some(turns),
                Err(e) => {
                    warn!("Ignoring unrecognised history in stream frame: {}", e);
                    None
                }
            }
        })
    )
}

impl StreamEvent {
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }

    /// Error text when the frame reports a non-empty service error.
    pub fn service_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// History carried by a final frame, if non-empty.
    pub fn final_messages(&self) -> Option<&Vec<ChatTurn>> {
        if !self.is_done() {
            return None;
        }
        self.messages.as_ref().filter(|m| !m.is_empty())
    }
}

/// What the per-chunk callback receives.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreamChunk {
    pub content: String,
    pub full_content: String,
    pub done: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AggregatedResult {
    pub answer: String,
    pub content: String,
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AggregatedResult {
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            content: FALLBACK_ANSWER.to_string(),
            messages: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_trims_query() {
        let history = vec![ChatTurn::user("earlier")];
        let req = ChatRequest::new("  发烧三天 \n", &history);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "query": "发烧三天",
                "messages": [{ "role": "user", "content": "earlier" }],
                "stream": true
            })
        );
    }

    #[test]
    fn test_event_defaults() {
        let event: StreamEvent = serde_json::from_str("{}").unwrap();
        assert_eq!(event, StreamEvent::default());
        assert!(!event.is_done());
        assert!(event.service_error().is_none());
    }

    #[test]
    fn test_empty_error_is_not_a_service_error() {
        let event: StreamEvent = serde_json::from_str(r#"{"error":""}"#).unwrap();
        assert!(event.service_error().is_none());
    }

    #[test]
    fn test_final_messages_requires_done_and_non_empty() {
        let not_done: StreamEvent = serde_json::from_str(
            r#"{"messages":[{"role":"user","content":"a"}]}"#
        ).unwrap();
        assert!(not_done.final_messages().is_none());

        let empty: StreamEvent = serde_json::from_str(r#"{"done":true,"messages":[]}"#).unwrap();
        assert!(empty.final_messages().is_none());

        let full: StreamEvent = serde_json::from_str(
            r#"{"done":true,"messages":[{"role":"user","content":"a"}]}"#
        ).unwrap();
        assert_eq!(full.final_messages().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_unrecognised_history_keeps_rest_of_frame() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"content":"lo","done":true,"messages":[{"role":"system","content":"be brief"},{"role":"assistant","content":"Hello"}]}"#
        ).unwrap();
        assert_eq!(event.content.as_deref(), Some("lo"));
        assert!(event.is_done());
        assert!(event.messages.is_none());

        let missing_content: StreamEvent = serde_json::from_str(
            r#"{"content":"x","messages":[{"role":"user"}]}"#
        ).unwrap();
        assert_eq!(missing_content.content.as_deref(), Some("x"));
        assert!(missing_content.messages.is_none());

        let null_history: StreamEvent = serde_json::from_str(r#"{"messages":null}"#).unwrap();
        assert!(null_history.messages.is_none());
    }

    #[test]
    fn test_fallback_shape() {
        let result = AggregatedResult::fallback("HTTP error! status: 502");
        assert_eq!(result.answer, FALLBACK_ANSWER);
        assert_eq!(result.content, FALLBACK_ANSWER);
        assert_eq!(result.error.as_deref(), Some("HTTP error! status: 502"));
        assert!(result.is_error());
    }

    #[test]
    fn test_chunk_serializes_camel_case() {
        let chunk = StreamChunk { content: "lo".into(), full_content: "Hello".into(), done: true };
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["fullContent"], "Hello");
    }
}
