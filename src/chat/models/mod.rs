pub mod conversation;
pub mod session;

pub use conversation::{Conversation, GREETING, Message, Part, Role};
pub use session::{ChatSession, SendError, SendPhase, SendTicket};
