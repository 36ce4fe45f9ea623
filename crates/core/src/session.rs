//! Conversation transcript for a generation session.
//!
//! A [`Session`] is owned by the caller, handed to the pipeline and handed
//! back with the new turns appended. Nothing is kept process-wide.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Ordered transcript of requests and outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    turns: Vec<Turn>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session with a user turn appended.
    pub fn with_user(self, content: impl Into<String>) -> Self {
        self.with_turn(Role::User, content)
    }

    /// Return the session with an assistant turn appended.
    pub fn with_assistant(self, content: impl Into<String>) -> Self {
        self.with_turn(Role::Assistant, content)
    }

    fn with_turn(mut self, role: Role, content: impl Into<String>) -> Self {
        self.turns.push(Turn {
            role,
            content: content.into(),
        });
        self
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
