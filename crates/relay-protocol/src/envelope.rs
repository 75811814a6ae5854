use serde::{Deserialize, Serialize};

pub const CONNECTED_NOTICE: &str = "A new client has connected.";
pub const DISCONNECTED_NOTICE: &str = "A client has disconnected.";

/// Who produced an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub text: String,
    pub role: Role,
}

/// Every frame the server pushes to clients.
/// Wire: `{ "sender": "3f2c…", "content": { "text": "hi", "role": "USER" } }`
///
/// SYSTEM envelopes come from the hub itself and carry an empty sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub sender: String,
    pub content: Content,
}

impl Envelope {
    /// Wrap a raw inbound payload from `sender`.
    pub fn user(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: Content {
                text: text.into(),
                role: Role::User,
            },
        }
    }

    /// Hub-originated notice with no sender.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            sender: String::new(),
            content: Content {
                text: text.into(),
                role: Role::System,
            },
        }
    }

    pub fn connected() -> Self {
        Self::system(CONNECTED_NOTICE)
    }

    pub fn disconnected() -> Self {
        Self::system(DISCONNECTED_NOTICE)
    }

    pub fn is_system(&self) -> bool {
        self.content.role == Role::System
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
