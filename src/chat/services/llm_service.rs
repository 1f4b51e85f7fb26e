use anyhow::Result;
use futures::StreamExt;
use futures::stream::BoxStream;
use rig::OneOrMany;
use rig::agent::Agent;
use rig::client::CompletionClient;
use rig::completion::Message as RigMessage;
use rig::completion::message::{AssistantContent, Text, UserContent};
use rig::streaming::StreamingPrompt;
use tokio::sync::mpsc::UnboundedSender;

use crate::chat::models::{Message, Role};

/// Chunks emitted while a response streams in.
#[derive(Debug, Clone)]
pub enum StreamChunk {
    Text(String),
    Done,
    Error(String),
}

/// Type alias for response streams
pub type ResponseStream = BoxStream<'static, Result<StreamChunk>>;

/// Stream event delivered to the UI loop, tagged with the send it
/// belongs to so a stream that outlived its send cannot touch a later
/// placeholder.
#[derive(Debug)]
pub enum StreamEvent {
    Chunk { send_id: u64, text: String },
    Finished { send_id: u64 },
    Failed { send_id: u64, message: String },
}

/// Gemini agent handle built from the configured key and model id.
///
/// The SDK (`rig`) is the external collaborator here; this wrapper only
/// shapes its stream into [`StreamChunk`]s.
#[derive(Clone)]
pub struct GeminiAgent {
    agent: Agent<rig::providers::gemini::completion::CompletionModel>,
}

impl GeminiAgent {
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        let client = rig::providers::gemini::Client::new(api_key)?;
        let agent = client.agent(model).build();
        Ok(Self { agent })
    }

    /// Open a streaming request for `user_text` on top of `history`
    /// (the full prior conversation, greeting included).
    pub async fn stream_reply(&self, history: &[Message], user_text: &str) -> ResponseStream {
        let user_message = RigMessage::User {
            content: OneOrMany::one(UserContent::Text(Text {
                text: user_text.to_string(),
            })),
        };
        let history: Vec<RigMessage> = history.iter().map(to_rig_message).collect();

        let mut stream = self
            .agent
            .stream_prompt(user_message)
            .with_history(history)
            .multi_turn(1)
            .await;

        Box::pin(async_stream::stream! {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(rig::agent::MultiTurnStreamItem::StreamAssistantItem(content)) => {
                        if let rig::streaming::StreamedAssistantContent::Text(text) = content {
                            yield Ok(StreamChunk::Text(text.text));
                        }
                    }
                    Err(e) => {
                        yield Ok(StreamChunk::Error(e.to_string()));
                        return;
                    }
                    _ => {}
                }
            }
            yield Ok(StreamChunk::Done);
        })
    }
}

fn to_rig_message(message: &Message) -> RigMessage {
    match message.role {
        Role::User => RigMessage::User {
            content: OneOrMany::one(UserContent::Text(Text {
                text: message.text(),
            })),
        },
        Role::Model => RigMessage::Assistant {
            id: None,
            content: OneOrMany::one(AssistantContent::Text(Text {
                text: message.text(),
            })),
        },
    }
}

/// Pump a response stream into the UI event channel.
///
/// Consumes the stream to exhaustion; the first error terminates the
/// pump. There is no abort handle, matching the one-shot semantics of a
/// send: the stale-id guard on the session makes late events harmless.
pub fn spawn_stream_pump(
    mut stream: ResponseStream,
    send_id: u64,
    tx: UnboundedSender<StreamEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(item) = stream.next().await {
            match item {
                Ok(StreamChunk::Text(text)) => {
                    if tx.send(StreamEvent::Chunk { send_id, text }).is_err() {
                        return;
                    }
                }
                Ok(StreamChunk::Done) => {
                    let _ = tx.send(StreamEvent::Finished { send_id });
                    return;
                }
                Ok(StreamChunk::Error(message)) => {
                    let _ = tx.send(StreamEvent::Failed { send_id, message });
                    return;
                }
                Err(e) => {
                    let _ = tx.send(StreamEvent::Failed {
                        send_id,
                        message: e.to_string(),
                    });
                    return;
                }
            }
        }
        let _ = tx.send(StreamEvent::Finished { send_id });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn chunk_stream(chunks: Vec<StreamChunk>) -> ResponseStream {
        Box::pin(futures::stream::iter(chunks.into_iter().map(Ok)))
    }

    #[test]
    fn history_converts_roles_to_rig_messages() {
        let user = to_rig_message(&Message::user("hi"));
        assert!(matches!(user, RigMessage::User { .. }));

        let model = to_rig_message(&Message::model("hello"));
        assert!(matches!(model, RigMessage::Assistant { .. }));
    }

    #[tokio::test]
    async fn pump_forwards_chunks_in_order_then_finishes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stream = chunk_stream(vec![
            StreamChunk::Text("Hi".into()),
            StreamChunk::Text(" there".into()),
            StreamChunk::Done,
        ]);

        spawn_stream_pump(stream, 7, tx).await.unwrap();

        match rx.recv().await.unwrap() {
            StreamEvent::Chunk { send_id, text } => {
                assert_eq!((send_id, text.as_str()), (7, "Hi"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await.unwrap() {
            StreamEvent::Chunk { text, .. } => assert_eq!(text, " there"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(
            rx.recv().await.unwrap(),
            StreamEvent::Finished { send_id: 7 }
        ));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn pump_translates_stream_errors_into_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stream = chunk_stream(vec![
            StreamChunk::Text("partial".into()),
            StreamChunk::Error("connection reset".into()),
        ]);

        spawn_stream_pump(stream, 3, tx).await.unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            StreamEvent::Chunk { send_id: 3, .. }
        ));
        match rx.recv().await.unwrap() {
            StreamEvent::Failed { send_id, message } => {
                assert_eq!(send_id, 3);
                assert_eq!(message, "connection reset");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
