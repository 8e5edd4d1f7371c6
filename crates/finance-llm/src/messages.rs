//! Chat messages exchanged with a provider

use serde::{Deserialize, Serialize};

/// Who a chat message is from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name used by OpenAI-compatible APIs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Plain-text chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    /// True when the message has only whitespace
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_role() {
        assert_eq!(Message::user("Compare AAPL and MSFT").role, Role::User);
        assert_eq!(Message::assistant("Done").text(), "Done");
    }

    #[test]
    fn test_blank_message() {
        assert!(Message::assistant("  \n").is_blank());
        assert!(!Message::assistant("Summary").is_blank());
    }

    #[test]
    fn test_role_wire_names() {
        let json = serde_json::to_string(&Message::assistant("Be brief")).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }
}
