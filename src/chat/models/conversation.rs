use serde::{Deserialize, Serialize};

/// Fixed greeting seeded as the first model message of every conversation.
pub const GREETING: &str = "👋 Hi! I'm your Gemini helper. What would you like to talk about?";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One conversation turn: a role plus an ordered sequence of text parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Full message text, parts joined by newlines.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Ordered message history.
///
/// Append-only, except for the rollback that removes the trailing
/// user/placeholder pair after a failed stream. Always holds at least the
/// greeting.
#[derive(Clone, Debug)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::model(GREETING)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append the user message and its empty model placeholder in one step.
    pub fn push_exchange(&mut self, user_text: impl Into<String>) {
        self.messages.push(Message::user(user_text));
        self.messages.push(Message::model(""));
    }

    /// Append streamed text to the placeholder.
    ///
    /// Returns false (and leaves the history untouched) when the last
    /// message is not a model message.
    pub fn append_to_placeholder(&mut self, text: &str) -> bool {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Model => match last.parts.first_mut() {
                Some(part) => {
                    part.text.push_str(text);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Drop the trailing user/placeholder pair after a failed stream.
    pub fn rollback_exchange(&mut self) {
        let len = self.messages.len();
        self.messages.truncate(len.saturating_sub(2));
    }

    /// Reset to the single greeting.
    pub fn reset(&mut self) {
        self.messages = vec![Message::model(GREETING)];
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
