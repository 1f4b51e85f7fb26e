use thiserror::Error;
use tracing::debug;

use super::conversation::{Conversation, Message};

/// Lifecycle of the single in-flight send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendPhase {
    Idle,
    AwaitingFirstChunk,
    Streaming,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// Blank input after trimming. The UI ignores it silently.
    #[error("message is empty")]
    EmptyMessage,
    /// A previous send is still in flight. The UI ignores it silently.
    #[error("a response is already streaming")]
    Busy,
    /// Shown inline; the send is blocked before any history mutation.
    #[error("enter a valid Gemini API key first")]
    MissingApiKey,
}

/// Everything the streaming service needs to issue one request:
/// the prior history (greeting included) plus the new user turn, tagged
/// with the send id that stream events must carry back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendTicket {
    pub send_id: u64,
    pub user_text: String,
    pub history: Vec<Message>,
}

/// Holds the conversation and drives the per-send state machine
/// `Idle → AwaitingFirstChunk → Streaming → Idle`, with the error path
/// rolling back the trailing user/placeholder pair.
///
/// Stream events are tagged with a send id; events from an earlier send
/// (a stream that outlived its error) are dropped here rather than
/// corrupting a later placeholder.
pub struct ChatSession {
    conversation: Conversation,
    phase: SendPhase,
    send_seq: u64,
    error: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            conversation: Conversation::new(),
            phase: SendPhase::Idle,
            send_seq: 0,
            error: None,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn phase(&self) -> SendPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_streaming(&self) -> bool {
        self.phase != SendPhase::Idle
    }

    /// Accept a new send, or explain why not.
    ///
    /// On acceptance the user message and its empty placeholder are
    /// appended atomically and any prior error is cleared. A missing API
    /// key surfaces as the session error without touching history.
    pub fn begin_send(&mut self, text: &str, has_api_key: bool) -> Result<SendTicket, SendError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if self.is_streaming() {
            return Err(SendError::Busy);
        }
        if !has_api_key {
            self.error = Some(SendError::MissingApiKey.to_string());
            return Err(SendError::MissingApiKey);
        }

        self.error = None;
        self.send_seq += 1;
        let history = self.conversation.messages().to_vec();
        self.conversation.push_exchange(content);
        self.phase = SendPhase::AwaitingFirstChunk;

        Ok(SendTicket {
            send_id: self.send_seq,
            user_text: content.to_string(),
            history,
        })
    }

    /// Append streamed text to the placeholder; stale send ids are dropped.
    pub fn apply_chunk(&mut self, send_id: u64, text: &str) {
        if !self.is_current(send_id) {
            debug!(send_id, "dropping chunk from stale stream");
            return;
        }
        if self.conversation.append_to_placeholder(text) {
            self.phase = SendPhase::Streaming;
        }
    }

    /// Finalize the placeholder; it is immutable from here on.
    pub fn finish(&mut self, send_id: u64) {
        if !self.is_current(send_id) {
            debug!(send_id, "dropping completion from stale stream");
            return;
        }
        self.phase = SendPhase::Idle;
    }

    /// Roll back the user/placeholder pair and surface the error.
    ///
    /// The composer text is not restored; the original input is lost, as
    /// in the system this reimplements.
    pub fn fail(&mut self, send_id: u64, message: &str) {
        if !self.is_current(send_id) {
            debug!(send_id, "dropping failure from stale stream");
            return;
        }
        self.conversation.rollback_exchange();
        self.error = Some(message.to_string());
        self.phase = SendPhase::Idle;
    }

    /// Reset to the greeting and clear any error. Refused (returns false)
    /// while a stream is active.
    pub fn clear(&mut self) -> bool {
        if self.is_streaming() {
            return false;
        }
        self.conversation.reset();
        self.error = None;
        true
    }

    fn is_current(&self, send_id: u64) -> bool {
        self.is_streaming() && send_id == self.send_seq
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::GREETING;

    fn accepted_send(session: &mut ChatSession, text: &str) -> SendTicket {
        session.begin_send(text, true).expect("send accepted")
    }

    #[test]
    fn accepted_send_appends_exactly_two_messages() {
        let mut session = ChatSession::new();
        let before = session.conversation().len();

        let ticket = accepted_send(&mut session, "  Hello  ");

        assert_eq!(session.conversation().len(), before + 2);
        assert_eq!(ticket.user_text, "Hello");
        assert_eq!(ticket.history.len(), before);
        assert_eq!(session.phase(), SendPhase::AwaitingFirstChunk);
    }

    #[test]
    fn empty_input_is_a_noop() {
        let mut session = ChatSession::new();
        assert_eq!(session.begin_send("   ", true), Err(SendError::EmptyMessage));
        assert_eq!(session.conversation().len(), 1);
        assert!(session.error().is_none());
    }

    #[test]
    fn second_send_while_in_flight_is_a_noop() {
        let mut session = ChatSession::new();
        accepted_send(&mut session, "first");

        assert_eq!(session.begin_send("second", true), Err(SendError::Busy));
        assert_eq!(session.conversation().len(), 3);
    }

    #[test]
    fn missing_key_blocks_send_without_mutating_history() {
        let mut session = ChatSession::new();

        assert_eq!(
            session.begin_send("Hello", false),
            Err(SendError::MissingApiKey)
        );
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.error(), Some("enter a valid Gemini API key first"));
    }

    #[test]
    fn chunks_grow_the_placeholder_and_finish_finalizes() {
        let mut session = ChatSession::new();
        let ticket = accepted_send(&mut session, "Hello");

        session.apply_chunk(ticket.send_id, "Hi");
        assert_eq!(session.phase(), SendPhase::Streaming);
        session.apply_chunk(ticket.send_id, " there");
        session.finish(ticket.send_id);

        let messages = session.conversation().messages();
        assert_eq!(messages[0].text(), GREETING);
        assert_eq!(messages[1].text(), "Hello");
        assert_eq!(messages[2].text(), "Hi there");
        assert_eq!(session.phase(), SendPhase::Idle);
    }

    #[test]
    fn failure_restores_the_pre_send_length() {
        let mut session = ChatSession::new();
        let before = session.conversation().len();
        let ticket = accepted_send(&mut session, "Hello");
        session.apply_chunk(ticket.send_id, "partial");

        session.fail(ticket.send_id, "stream broke");

        assert_eq!(session.conversation().len(), before);
        assert_eq!(session.error(), Some("stream broke"));
        assert_eq!(session.phase(), SendPhase::Idle);
    }

    #[test]
    fn next_accepted_send_clears_the_error() {
        let mut session = ChatSession::new();
        let ticket = accepted_send(&mut session, "Hello");
        session.fail(ticket.send_id, "stream broke");

        accepted_send(&mut session, "again");

        assert!(session.error().is_none());
    }

    #[test]
    fn stale_stream_events_are_dropped() {
        let mut session = ChatSession::new();
        let first = accepted_send(&mut session, "Hello");
        session.fail(first.send_id, "stream broke");

        let second = accepted_send(&mut session, "again");
        session.apply_chunk(first.send_id, "late chunk");
        session.finish(first.send_id);

        assert!(session.is_streaming());
        assert_eq!(session.conversation().messages()[2].text(), "");

        session.apply_chunk(second.send_id, "fresh");
        assert_eq!(session.conversation().messages()[2].text(), "fresh");
    }

    #[test]
    fn clear_is_refused_while_streaming() {
        let mut session = ChatSession::new();
        let ticket = accepted_send(&mut session, "Hello");

        assert!(!session.clear());
        assert_eq!(session.conversation().len(), 3);

        session.finish(ticket.send_id);
        assert!(session.clear());
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.conversation().messages()[0].text(), GREETING);
    }
}
