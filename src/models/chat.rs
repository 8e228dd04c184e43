use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };
use uuid::Uuid;

pub const WELCOME_MESSAGE: &str =
    "您好！我是 AssistDoctor 医疗助手。我可以回答您关于疾病的问题，也可以基于您提供的电子病历进行诊断。请告诉我您需要什么帮助？";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), timestamp: None }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), timestamp: None }
    }

    pub fn stamped(mut self) -> Self {
        self.timestamp = Some(Utc::now().timestamp_millis());
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ChatTurn>,
}

impl Conversation {
    pub fn push_turn(&mut self, turn: ChatTurn) {
        self.messages.push(turn);
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.messages
    }

    /// Replaces the turns with the authoritative history returned by the service.
    pub fn replace_history(&mut self, messages: Vec<ChatTurn>) {
        self.messages = messages;
    }
}

pub fn create_welcome_message() -> ChatTurn {
    ChatTurn::assistant(WELCOME_MESSAGE).stamped()
}

pub fn create_conversation(index: usize) -> Conversation {
    let created_at = Utc::now();
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(6).collect();

    Conversation {
        id: format!("conversation-{}-{}", created_at.timestamp_millis(), suffix),
        title: format!("对话 {}", index),
        created_at,
        messages: vec![create_welcome_message()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_wire_shape() {
        let json = serde_json::to_value(ChatTurn::user("头痛")).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "user", "content": "头痛" }));

        let turn: ChatTurn = serde_json::from_str(
            r#"{"role":"assistant","content":"Hello"}"#
        ).unwrap();
        assert_eq!(turn, ChatTurn::assistant("Hello"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let parsed = serde_json::from_str::<ChatTurn>(r#"{"role":"system","content":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_create_conversation_seeds_welcome_turn() {
        let conversation = create_conversation(3);

        assert_eq!(conversation.title, "对话 3");
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].role, Role::Assistant);
        assert_eq!(conversation.messages[0].content, WELCOME_MESSAGE);
        assert!(conversation.messages[0].timestamp.is_some());

        let parts: Vec<&str> = conversation.id.splitn(3, '-').collect();
        assert_eq!(parts[0], "conversation");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_conversation_ids_are_unique() {
        let a = create_conversation(1);
        let b = create_conversation(1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_push_and_replace_history() {
        let mut conversation = create_conversation(1);
        conversation.push_turn(ChatTurn::user("hi"));
        assert_eq!(conversation.history().len(), 2);

        conversation.replace_history(vec![ChatTurn::assistant("Hello")]);
        assert_eq!(conversation.history(), &[ChatTurn::assistant("Hello")]);
    }
}
