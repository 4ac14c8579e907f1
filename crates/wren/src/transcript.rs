use crate::models::message::Message;

/// Append-only conversation log. Past entries are never mutated or removed;
/// a failed reply is simply never appended. Not safe for concurrent
/// mutation, which is acceptable because the session is single-threaded.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user<S: Into<String>>(&mut self, content: S) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant<S: Into<String>>(&mut self, content: S) {
        self.messages.push(Message::assistant(content));
    }

    /// Full ordered history, for request construction.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
