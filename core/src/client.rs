//! Request builder and response parser for the Readeck API.
//!
//! # Design
//! `ReadeckClient` holds the base URL, the bearer credential and the request
//! timeout. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! caller executes the HTTP round-trip in between, which keeps this type free
//! of I/O and lets the C ABI and the async `ReadeckApi` share it.
//!
//! The only mutable state is the credential, and the only path that changes
//! it is `parse_login`.

use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    BookmarkStatus, CreateBookmark, CreatedBookmark, ErrorBody, LoginRequest, LoginResult, Profile,
    ProfileEnvelope,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Response header carrying the id of a created bookmark.
pub const BOOKMARK_ID_HEADER: &str = "Bookmark-Id";

/// Client for a single Readeck server.
#[derive(Debug, Clone)]
pub struct ReadeckClient {
    base_url: String,
    credential: Option<String>,
    timeout: Duration,
}

impl ReadeckClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Attach a bearer credential. An empty string means "no credential".
    pub fn with_credential(mut self, credential: &str) -> Self {
        self.credential = (!credential.is_empty()).then(|| credential.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Post, "/auth", Some(body), false))
    }

    pub fn build_profile(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/profile", None, true)
    }

    pub fn build_create_bookmark(&self, input: &CreateBookmark) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Post, "/bookmarks", Some(body), true))
    }

    pub fn build_bookmark_status(&self, bookmark_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/bookmarks/{bookmark_id}"), None, true)
    }

    /// Parse a login response. On success the returned token replaces this
    /// client's credential for every request built afterwards.
    pub fn parse_login(&mut self, response: HttpResponse) -> Result<LoginResult, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Authentication {
                status: response.status,
                message: server_message(&response),
            });
        }
        let result: LoginResult = from_json(&response.body)?;
        self.credential = Some(result.token.clone());
        Ok(result)
    }

    pub fn parse_profile(&self, response: HttpResponse) -> Result<Profile, ApiError> {
        check_success(&response)?;
        let envelope: ProfileEnvelope = from_json(&response.body)?;
        Ok(envelope.user)
    }

    /// Parse a bookmark creation response. The id comes from the
    /// `Bookmark-Id` header; the body is only read on failure.
    pub fn parse_create_bookmark(
        &self,
        response: HttpResponse,
    ) -> Result<CreatedBookmark, ApiError> {
        check_success(&response)?;
        match response.header(BOOKMARK_ID_HEADER) {
            Some(id) if !id.is_empty() => Ok(CreatedBookmark {
                bookmark_id: id.to_string(),
            }),
            _ => Err(ApiError::ProtocolViolation(format!(
                "{BOOKMARK_ID_HEADER} header not found in response"
            ))),
        }
    }

    /// Parse a bookmark status response. Only an exact 200 is accepted.
    pub fn parse_bookmark_status(
        &self,
        response: HttpResponse,
    ) -> Result<BookmarkStatus, ApiError> {
        check_success(&response)?;
        if response.status != 200 {
            return Err(ApiError::UnexpectedStatus {
                expected: 200,
                status: response.status,
            });
        }
        from_json(&response.body)
    }

    fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<String>,
        authorize: bool,
    ) -> HttpRequest {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let (true, Some(credential)) = (authorize, &self.credential) {
            headers.push(("Authorization".to_string(), format!("Bearer {credential}")));
        }
        HttpRequest {
            method,
            url: format!("{}/api{endpoint}", self.base_url),
            headers,
            body,
            timeout: self.timeout,
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx responses to `ApiError::Server`.
fn check_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Server {
        status: response.status,
        message: server_message(response),
    })
}

/// Best available error text: the JSON `message` field, then the raw body,
/// then the canonical reason phrase.
fn server_message(response: &HttpResponse) -> String {
    if let Ok(ErrorBody {
        message: Some(message),
    }) = serde_json::from_str(&response.body)
    {
        return message;
    }
    let body = response.body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    ::http::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown status")
        .to_string()
}
