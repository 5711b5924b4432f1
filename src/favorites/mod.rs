//! Saved locations.
//!
//! [`FavoriteStore`] is the server-side truth per (viewer, location) pair.
//! [`FavoriteController`] is the single client-side owner of one card's
//! favorite flag: it applies toggles optimistically, talks to a
//! [`FavoriteApi`], and rolls back when the call fails.

pub mod api;
pub mod cache;
pub mod controller;
pub mod notify;
pub mod store;

use thiserror::Error;

pub use api::{FavoriteApi, HttpFavoriteApi};
pub use cache::{QueryCache, QueryKey};
pub use controller::{ControlKind, FavoriteControl, FavoriteController};
pub use notify::{Notification, NotificationKind, Notifier, TracingNotifier};
pub use store::FavoriteStore;

/// Shown when the server gives no usable reason
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FavoriteError {
    #[error("Sign in to save locations")]
    Unauthorized,

    #[error("Server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),
}

impl FavoriteError {
    /// Text suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => self.to_string(),
            Self::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Rejected { .. } | Self::Transport(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for FavoriteError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}
