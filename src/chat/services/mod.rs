pub mod llm_service;

pub use llm_service::{GeminiAgent, ResponseStream, StreamChunk, StreamEvent, spawn_stream_pump};
