//! Chat transport boundary.
//!
//! The transport itself (message delivery, inline keyboards, callback
//! dispatch) is an external collaborator. It hands the router
//! `(user, text)` or `(user, selection token)` events and renders the
//! returned reply text plus labeled options however it likes.

pub mod router;

pub use router::Router;

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// Free-form message text.
    Text(String),
    /// An option token previously offered in a reply.
    Selection(String),
}

/// One inbound chat event.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub user_id: u64,
    pub input: Incoming,
}

impl ChatEvent {
    pub fn text(user_id: u64, text: impl Into<String>) -> Self {
        Self {
            user_id,
            input: Incoming::Text(text.into()),
        }
    }

    pub fn selection(user_id: u64, token: impl Into<String>) -> Self {
        Self {
            user_id,
            input: Incoming::Selection(token.into()),
        }
    }
}

/// A labeled option the transport renders as a button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub token: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// The router's answer to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub options: Vec<Choice>,
}

impl Reply {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    pub fn with_options(text: impl Into<String>, options: Vec<Choice>) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }
}
