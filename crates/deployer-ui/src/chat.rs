//! Chat transcript
//!
//! Messages are stored and rendered verbatim; nothing in a message is ever
//! interpreted as markup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person typing
    User,
    /// The backend reply
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "you",
            Self::Assistant => "assistant",
        })
    }
}

/// One message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub speaker: Speaker,
    /// Text as typed or received
    pub text: String,
}

/// Ordered chat history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    /// Empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the input box contents as a user message
    ///
    /// Clears `input`. Blank input records nothing and returns `None`;
    /// otherwise returns the text to send.
    pub fn submit_input(&mut self, input: &mut String) -> Option<String> {
        let text = std::mem::take(input);
        if text.trim().is_empty() {
            return None;
        }
        self.push(Speaker::User, text.clone());
        Some(text)
    }

    /// Append a reply
    pub fn push_reply(&mut self, text: impl Into<String>) {
        self.push(Speaker::Assistant, text);
    }

    /// Append a message
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.messages.push(ChatMessage {
            speaker,
            text: text.into(),
        });
    }

    /// All messages, oldest first
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True before the first message
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// `speaker: text` lines
    #[must_use]
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}\n", m.speaker, m.text))
            .collect()
    }
}
