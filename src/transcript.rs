use uuid::Uuid;

pub type MessageId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    /// Parse a stored history role; anything unrecognized renders as system.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            _ => Self::System,
        }
    }
}

/// One transcript entry. Ordering within the transcript is append-order;
/// message ids are stable and unique for the life of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    /// Reference identifiers attached on finalization; assistant-only.
    pub sources: Vec<String>,
}

impl ChatMessage {
    #[must_use]
    pub fn new(id: impl Into<MessageId>, role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            sources: Vec::new(),
        }
    }
}

pub const WELCOME_MESSAGE_ID: &str = "welcome";
pub const WELCOME_TEXT: &str =
    "Hi 👋 I'm your CV screener. Ask me things like: \"Who has experience with Python?\"";

/// The fixed transcript a fresh or reset conversation starts from.
#[must_use]
pub fn welcome_transcript() -> Vec<ChatMessage> {
    vec![ChatMessage::new(
        WELCOME_MESSAGE_ID,
        ChatRole::Assistant,
        WELCOME_TEXT,
    )]
}

#[must_use]
pub fn fresh_message_id() -> MessageId {
    Uuid::new_v4().to_string()
}

/// Append a user message with a freshly generated id. User content arrives
/// whole, never streamed.
#[must_use]
pub fn add_user_message(list: &[ChatMessage], text: &str) -> Vec<ChatMessage> {
    let mut next = list.to_vec();
    next.push(ChatMessage::new(fresh_message_id(), ChatRole::User, text));
    next
}

/// Append the empty assistant message that later token/final events target.
#[must_use]
pub fn add_assistant_placeholder(list: &[ChatMessage], id: &str) -> Vec<ChatMessage> {
    let mut next = list.to_vec();
    next.push(ChatMessage::new(id, ChatRole::Assistant, ""));
    next
}

/// Concatenate a streamed chunk onto the message with the given id.
///
/// An absent id is a stale callback (for example after a reset) and must
/// not fail; the result is content-equal to the input.
#[must_use]
pub fn append_assistant(list: &[ChatMessage], id: &str, chunk: &str) -> Vec<ChatMessage> {
    list.iter()
        .map(|message| {
            if message.id == id {
                let mut updated = message.clone();
                updated.content.push_str(chunk);
                updated
            } else {
                message.clone()
            }
        })
        .collect()
}

/// Replace the message content wholesale with the authoritative final text
/// and attach its sources. Safe to apply twice with the same arguments.
#[must_use]
pub fn finalize_assistant(
    list: &[ChatMessage],
    id: &str,
    full_text: &str,
    sources: &[String],
) -> Vec<ChatMessage> {
    list.iter()
        .map(|message| {
            if message.id == id {
                let mut updated = message.clone();
                updated.content = full_text.to_string();
                updated.sources = sources.to_vec();
                updated
            } else {
                message.clone()
            }
        })
        .collect()
}

/// Replace the message content with a user-visible error string, closing
/// the open slot so the placeholder is never left perpetually empty.
#[must_use]
pub fn set_assistant_error(list: &[ChatMessage], id: &str, error_text: &str) -> Vec<ChatMessage> {
    list.iter()
        .map(|message| {
            if message.id == id {
                let mut updated = message.clone();
                updated.content = error_text.to_string();
                updated
            } else {
                message.clone()
            }
        })
        .collect()
}
