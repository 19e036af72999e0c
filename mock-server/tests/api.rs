use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{
    app, AuthResponse, Bookmark, ProfileResponse, TEST_EMAIL, TEST_PASSWORD, TEST_TOKEN,
    TEST_USERNAME,
};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<String> {
    json_request("GET", uri, token, "")
}

fn login_body(password: &str) -> String {
    serde_json::json!({
        "username": TEST_USERNAME,
        "password": password,
        "application": "tests",
    })
    .to_string()
}

// --- auth ---

#[tokio::test]
async fn login_returns_201_with_token() {
    let resp = app()
        .oneshot(json_request("POST", "/api/auth", None, &login_body(TEST_PASSWORD)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = body_json(resp).await;
    assert!(!auth.token.is_empty());
    assert!(!auth.id.is_empty());
}

#[tokio::test]
async fn login_wrong_password_returns_403() {
    let resp = app()
        .oneshot(json_request("POST", "/api/auth", None, &login_body("nope")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["status"], 403);
    assert_eq!(body["message"], "Invalid user and/or password");
}

// --- profile ---

#[tokio::test]
async fn profile_requires_token() {
    let resp = app().oneshot(get_request("/api/profile", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app()
        .oneshot(get_request("/api/profile", Some("bogus")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_with_static_token() {
    let resp = app()
        .oneshot(get_request("/api/profile", Some(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let profile: ProfileResponse = body_json(resp).await;
    assert_eq!(profile.user.username, TEST_USERNAME);
    assert_eq!(profile.user.email, TEST_EMAIL);
}

// --- bookmarks ---

#[tokio::test]
async fn create_bookmark_sets_id_header() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/bookmarks",
            Some(TEST_TOKEN),
            r#"{"url":"https://example.org/post"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let id = resp.headers()["bookmark-id"].to_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(
        resp.headers()[http::header::LOCATION].to_str().unwrap(),
        format!("/api/bookmarks/{id}")
    );
    let body: serde_json::Value = body_json(resp).await;
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn create_bookmark_empty_url_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/bookmarks", Some(TEST_TOKEN), r#"{"url":" "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["message"], "url: field is required");
}

#[tokio::test]
async fn create_bookmark_without_token_returns_401() {
    let resp = app()
        .oneshot(json_request("POST", "/api/bookmarks", None, r#"{"url":"https://example.org"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_bookmark_not_found() {
    let resp = app()
        .oneshot(get_request("/api/bookmarks/missing", Some(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_bytes(resp).await;
    assert!(!body.is_empty());
}

// --- full share flow ---

#[tokio::test]
async fn login_share_and_wait_for_scrape() {
    use tower::Service;

    let mut app = app().into_service();

    // login
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/auth", None, &login_body(TEST_PASSWORD)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = body_json(resp).await;
    let token = auth.token.as_str();

    // create with the fresh token
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/bookmarks",
            Some(token),
            r#"{"url":"https://example.org/a","title":"A","labels":["rust"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let id = resp.headers()["bookmark-id"].to_str().unwrap().to_string();

    // first read: still scraping
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/api/bookmarks/{id}"), Some(token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bookmark: Bookmark = body_json(resp).await;
    assert_eq!(bookmark.id, id);
    assert_eq!(bookmark.title.as_deref(), Some("A"));
    assert_eq!(bookmark.labels, vec!["rust".to_string()]);
    assert!(!bookmark.loaded);

    // second read: done
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/api/bookmarks/{id}"), Some(token)))
        .await
        .unwrap();
    let bookmark: Bookmark = body_json(resp).await;
    assert!(bookmark.loaded);
}
