use serde::{Deserialize, Serialize};

// ─── Message types ────────────────────────────────────────────────────────────

/// A single message in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, content: text.into() }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: text.into() }
    }

    /// Approximate token count used for context management.
    ///
    /// Uses the 4-chars-per-token heuristic, rounded up.
    pub fn approx_tokens(&self) -> usize {
        self.content.len().div_ceil(4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Request sent to a model provider.
///
/// The provider itself carries the model id, credentials, and endpoint; the
/// request is just the composed conversation.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// The last user message in the request, if any.
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Normalized response from one completion call.
///
/// Token fields are `None` for providers that do not report usage
/// (the Brave summarizer has no usage block at all).
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
    /// The model id that actually served the request.
    pub model_used: String,
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Message construction ──────────────────────────────────────────────────

    #[test]
    fn message_user_sets_role_and_text() {
        let m = Message::user("hello");
        assert_eq!(m.role, Role::User);
        assert_eq!(m.content, "hello");
    }

    #[test]
    fn message_assistant_sets_role_and_text() {
        let m = Message::assistant("reply");
        assert_eq!(m.role, Role::Assistant);
        assert_eq!(m.content, "reply");
    }

    #[test]
    fn message_system_sets_role_and_text() {
        let m = Message::system("prompt");
        assert_eq!(m.role, Role::System);
        assert_eq!(m.content, "prompt");
    }

    // ── Token approximation ───────────────────────────────────────────────────

    #[test]
    fn approx_tokens_divides_by_four() {
        let m = Message::user("12345678");
        assert_eq!(m.approx_tokens(), 2);
    }

    #[test]
    fn approx_tokens_rounds_up() {
        let m = Message::user("12345");
        assert_eq!(m.approx_tokens(), 2);
    }

    #[test]
    fn approx_tokens_empty_is_zero() {
        let m = Message::user("");
        assert_eq!(m.approx_tokens(), 0);
    }

    // ── Serialisation ─────────────────────────────────────────────────────────

    #[test]
    fn role_serialises_lowercase() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn message_round_trips() {
        let original = Message::assistant("test payload");
        let json = serde_json::to_string(&original).unwrap();
        let decoded: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, original);
    }

    // ── Request accessors ─────────────────────────────────────────────────────

    #[test]
    fn last_user_text_skips_trailing_assistant() {
        let req = CompletionRequest::new(vec![
            Message::system("sys"),
            Message::user("first"),
            Message::assistant("reply"),
        ]);
        assert_eq!(req.last_user_text(), Some("first"));
    }

    #[test]
    fn last_user_text_none_when_no_user() {
        let req = CompletionRequest::new(vec![Message::system("sys")]);
        assert_eq!(req.last_user_text(), None);
    }
}
