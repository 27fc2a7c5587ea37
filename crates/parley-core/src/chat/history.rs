//! Append-only conversation history.
//!
//! `History` is the sole piece of state the chat loop keeps. Messages
//! are appended in the order user input and agent replies occur; there
//! is no reordering or deletion, except rolling back the trailing user
//! message when a generation attempt fails.
//!
//! Single-writer discipline: only the loop task mutates a `History`.
//! The streaming task hands finalized messages back over a channel
//! instead of appending concurrently.

use parley_types::llm::{Message, MessageRole};

/// Ordered log of exchanged messages forming the conversational context.
#[derive(Debug, Clone, Default)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user-role message.
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append a finalized message from the agent reply stream.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Roll back the trailing user message after a failed generation,
    /// so the next request does not carry a question that was never
    /// answered. No-op if the last message is not user-role.
    pub fn pop_user_message(&mut self) -> Option<Message> {
        if self.messages.last()?.role == MessageRole::User {
            self.messages.pop()
        } else {
            None
        }
    }

    /// The messages in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages exchanged so far.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether any messages have been exchanged.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut history = History::new();
        history.add_user_message("first");
        history.push(Message::assistant("second"));
        history.add_user_message("third");

        let roles: Vec<MessageRole> = history.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
        assert_eq!(history.messages()[2].content, "third");
    }

    #[test]
    fn test_pop_user_message_rolls_back_trailing_user() {
        let mut history = History::new();
        history.add_user_message("unanswered");
        let popped = history.pop_user_message().unwrap();
        assert_eq!(popped.content, "unanswered");
        assert!(history.is_empty());
    }

    #[test]
    fn test_pop_user_message_refuses_assistant_tail() {
        let mut history = History::new();
        history.add_user_message("q");
        history.push(Message::assistant("a"));
        assert!(history.pop_user_message().is_none());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_pop_user_message_on_empty() {
        let mut history = History::new();
        assert!(history.pop_user_message().is_none());
    }
}
