//! Client core for sharing links to a Readeck server.
//!
//! # Overview
//! `ReadeckClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern). `ReadeckApi`
//! drives it over a `Transport` with a hard per-request timeout. The
//! preferences store persists the server URL, token and flags, and the
//! startup hook turns a failed load into `StartupState::NotConfigured`.
//!
//! # Design
//! - The client's only mutable state is its credential, replaced by login.
//! - Each operation is split into `build_*` and `parse_*`, so the C ABI and
//!   the async API share one implementation.
//! - Readeck reports the new bookmark id in a response header, so responses
//!   carry headers, not just a body.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod preferences;
pub mod startup;
pub mod transport;
pub mod types;

pub use api::ReadeckApi;
pub use client::{ReadeckClient, DEFAULT_TIMEOUT};
pub use error::{ApiError, PreferencesError};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use preferences::{
    AuthMethod, JsonFileStore, KeyValueStore, MemoryStore, PreferencesStore, StoredPreferences,
};
pub use startup::{default_preferences, load_startup_state, StartupState};
pub use transport::Transport;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use types::{
    BookmarkStatus, CreateBookmark, CreatedBookmark, LoginRequest, LoginResult, Profile,
};
