//! Domain DTOs for the Readeck API.
//!
//! # Design
//! Only the fields this client reads are modeled; serde ignores the rest of
//! what Readeck sends back. The mock-server crate defines its own copies of
//! the wire types, and integration tests catch schema drift between the two.

use serde::{Deserialize, Serialize};

/// Application label Readeck shows next to the issued token.
pub const DEFAULT_APPLICATION: &str = "Readeck Sharer";

/// Request payload for `POST /api/auth`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub application: String,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            application: DEFAULT_APPLICATION.to_string(),
        }
    }
}

/// Token issued by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResult {
    pub id: String,
    pub token: String,
}

/// The authenticated user's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub email: String,
    pub username: String,
}

/// Wire shape of `GET /api/profile`; the client unwraps `user`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileEnvelope {
    pub user: Profile,
}

/// Request payload for creating a bookmark. Omitted optionals are left out
/// of the JSON body entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateBookmark {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl CreateBookmark {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            title: None,
            labels: None,
        }
    }
}

/// Identifier of a freshly created bookmark, taken from the `Bookmark-Id`
/// response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBookmark {
    pub bookmark_id: String,
}

/// Whether the server has finished scraping a bookmark's content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarkStatus {
    pub loaded: bool,
}

/// Readeck error bodies look like `{"status": 403, "message": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}
