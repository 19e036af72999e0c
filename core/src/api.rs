//! Async Readeck API built on `ReadeckClient` and a `Transport`.
//!
//! # Design
//! Each call is build → send under the client's timeout → parse. There is no
//! retry and no shared session state beyond the credential, so calls taking
//! `&self` may run concurrently. `login` takes `&mut self` because it swaps
//! the credential. Every failure is logged before it is returned.

use crate::client::ReadeckClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{
    BookmarkStatus, CreateBookmark, CreatedBookmark, LoginRequest, LoginResult, Profile,
};

pub struct ReadeckApi<T> {
    client: ReadeckClient,
    transport: T,
}

impl<T: Transport> ReadeckApi<T> {
    pub fn new(client: ReadeckClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ReadeckClient {
        &self.client
    }

    pub fn into_parts(self) -> (ReadeckClient, T) {
        (self.client, self.transport)
    }

    /// Current bearer credential. After `login` the caller is responsible
    /// for persisting it.
    pub fn credential(&self) -> Option<&str> {
        self.client.credential()
    }

    /// Exchange a username and password for an API token. On success the
    /// token becomes this instance's credential.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
        application: Option<&str>,
    ) -> Result<LoginResult, ApiError> {
        let mut input = LoginRequest::new(username, password);
        if let Some(application) = application {
            input.application = application.to_string();
        }
        let result = match self.client.build_login(&input) {
            Ok(request) => self
                .execute(request)
                .await
                .and_then(|response| self.client.parse_login(response)),
            Err(e) => Err(e),
        };
        logged(result)
    }

    pub async fn fetch_profile(&self) -> Result<Profile, ApiError> {
        let request = self.client.build_profile();
        let result = self
            .execute(request)
            .await
            .and_then(|response| self.client.parse_profile(response));
        logged(result)
    }

    pub async fn create_bookmark(
        &self,
        input: &CreateBookmark,
    ) -> Result<CreatedBookmark, ApiError> {
        let result = match self.client.build_create_bookmark(input) {
            Ok(request) => self
                .execute(request)
                .await
                .and_then(|response| self.client.parse_create_bookmark(response)),
            Err(e) => Err(e),
        };
        logged(result)
    }

    pub async fn fetch_bookmark_status(
        &self,
        bookmark_id: &str,
    ) -> Result<BookmarkStatus, ApiError> {
        let request = self.client.build_bookmark_status(bookmark_id);
        let result = self
            .execute(request)
            .await
            .and_then(|response| self.client.parse_bookmark_status(response));
        logged(result)
    }

    /// Send one request, aborting it once the request's deadline elapses.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let timeout = request.timeout;
        log::debug!("{} {}", request.method.as_str(), request.url);
        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(timeout.as_millis() as u64)),
        }
    }
}

fn logged<R>(result: Result<R, ApiError>) -> Result<R, ApiError> {
    result.inspect_err(|e| log::error!("Readeck request failed: {e}"))
}
