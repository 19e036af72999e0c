use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const TEST_USERNAME: &str = "alice";
pub const TEST_PASSWORD: &str = "correct horse";
pub const TEST_EMAIL: &str = "alice@example.org";
/// Token that is valid from startup, as if created in Readeck's settings.
pub const TEST_TOKEN: &str = "static-test-token";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub loaded: bool,
}

#[derive(Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
    pub application: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserInfo,
}

#[derive(Deserialize)]
pub struct CreateBookmark {
    pub url: String,
    pub title: Option<String>,
    pub labels: Option<Vec<String>>,
}

pub struct ServerState {
    /// token -> (username, application)
    tokens: HashMap<String, (String, String)>,
    bookmarks: HashMap<String, Bookmark>,
}

pub type Db = Arc<RwLock<ServerState>>;

/// Error response in Readeck's `{"status", "message"}` shape.
struct Failure(StatusCode, &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "status": self.0.as_u16(), "message": self.1 });
        (self.0, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    let mut tokens = HashMap::new();
    tokens.insert(
        TEST_TOKEN.to_string(),
        (TEST_USERNAME.to_string(), "settings".to_string()),
    );
    let db: Db = Arc::new(RwLock::new(ServerState {
        tokens,
        bookmarks: HashMap::new(),
    }));
    Router::new()
        .route("/api/auth", post(login))
        .route("/api/profile", get(profile))
        .route("/api/bookmarks", post(create_bookmark))
        .route("/api/bookmarks/{id}", get(get_bookmark))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn authenticate(db: &Db, headers: &HeaderMap) -> Result<String, Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(Failure(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    db.read()
        .await
        .tokens
        .get(token)
        .map(|(username, _)| username.clone())
        .ok_or(Failure(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<AuthRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Failure> {
    if input.username != TEST_USERNAME || input.password != TEST_PASSWORD {
        return Err(Failure(StatusCode::FORBIDDEN, "Invalid user and/or password"));
    }
    let response = AuthResponse {
        id: short_id(),
        token: Uuid::new_v4().simple().to_string(),
    };
    db.write()
        .await
        .tokens
        .insert(response.token.clone(), (input.username, input.application));
    Ok((StatusCode::CREATED, Json(response)))
}

async fn profile(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, Failure> {
    let username = authenticate(&db, &headers).await?;
    Ok(Json(ProfileResponse {
        user: UserInfo {
            username,
            email: TEST_EMAIL.to_string(),
        },
    }))
}

/// Accepts the link and reports the new id in the `Bookmark-Id` header,
/// leaving scraping for later.
async fn create_bookmark(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateBookmark>,
) -> Result<Response, Failure> {
    authenticate(&db, &headers).await?;
    if input.url.trim().is_empty() {
        return Err(Failure(StatusCode::UNPROCESSABLE_ENTITY, "url: field is required"));
    }
    let bookmark = Bookmark {
        id: short_id(),
        url: input.url,
        title: input.title,
        labels: input.labels.unwrap_or_default(),
        loaded: false,
    };
    let id = bookmark.id.clone();
    db.write().await.bookmarks.insert(id.clone(), bookmark);

    let body = serde_json::json!({ "status": 202, "message": "Link submitted" });
    Ok((
        StatusCode::ACCEPTED,
        [
            (HeaderName::from_static("bookmark-id"), id.clone()),
            (header::LOCATION, format!("/api/bookmarks/{id}")),
        ],
        Json(body),
    )
        .into_response())
}

/// Reports the current scrape state. Scraping "finishes" once the bookmark
/// has been observed, so the second read reports `loaded: true`.
async fn get_bookmark(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Bookmark>, Failure> {
    authenticate(&db, &headers).await?;
    let mut state = db.write().await;
    let bookmark = state
        .bookmarks
        .get_mut(&id)
        .ok_or(Failure(StatusCode::NOT_FOUND, "Not Found"))?;
    let snapshot = bookmark.clone();
    bookmark.loaded = true;
    Ok(Json(snapshot))
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..22].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bookmark_serializes_to_json() {
        let bookmark = Bookmark {
            id: "abc".to_string(),
            url: "https://example.org".to_string(),
            title: None,
            labels: vec!["x".to_string()],
            loaded: false,
        };
        let json = serde_json::to_value(&bookmark).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["loaded"], false);
        assert_eq!(json["labels"], serde_json::json!(["x"]));
    }

    #[test]
    fn create_bookmark_optionals_default_to_none() {
        let input: CreateBookmark =
            serde_json::from_str(r#"{"url":"https://example.org"}"#).unwrap();
        assert!(input.title.is_none());
        assert!(input.labels.is_none());
    }

    #[test]
    fn create_bookmark_rejects_missing_url() {
        let result: Result<CreateBookmark, _> = serde_json::from_str(r#"{"title":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn short_ids_are_unique() {
        assert_ne!(short_id(), short_id());
        assert_eq!(short_id().len(), 22);
    }
}
