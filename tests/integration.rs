//! Integration tests for the pinboard API.
//!
//! These tests require a running Redis instance (default: redis://127.0.0.1:6379).
//! Set REDIS_URL env var to override.

use pinboard::{auth::middleware::AppState, config::Config, middleware::security_headers, routes};
use std::sync::Arc;

/// Helper to get Redis URL from environment or use default.
fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// Spin up a test server and return its base URL.
async fn spawn_test_server_with_ttl(session_ttl_secs: u64) -> String {
    let config = Config {
        redis_url: redis_url(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        session_ttl_secs,
        // Minimum cost keeps registration fast in tests
        bcrypt_cost: 4,
        max_body_bytes: 65_536,
    };

    let redis_client = redis::Client::open(redis_url()).expect("Failed to open Redis");

    let state = AppState {
        redis: redis_client,
        config: Arc::new(config),
    };

    let app = routes::app_router()
        .layer(axum::middleware::from_fn(security_headers))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn spawn_test_server() -> String {
    spawn_test_server_with_ttl(3600).await
}

/// Client with a cookie store and no redirect following, so the 303s and
/// Set-Cookie headers can be asserted directly.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn unique_identifier(tag: &str) -> String {
    format!("{}_{}@example.com", tag, nanoid::nanoid!(8))
}

async fn register(
    client: &reqwest::Client,
    base_url: &str,
    identifier: &str,
    display_name: &str,
    secret: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/register", base_url))
        .form(&[
            ("identifier", identifier),
            ("display_name", display_name),
            ("secret", secret),
            ("secret_confirm", secret),
        ])
        .send()
        .await
        .expect("Failed to send request")
}

async fn login(
    client: &reqwest::Client,
    base_url: &str,
    identifier: &str,
    secret: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/login", base_url))
        .form(&[("identifier", identifier), ("secret", secret)])
        .send()
        .await
        .expect("Failed to send request")
}

/// Register a fresh user, log in, and return (identifier, display_name).
async fn register_and_login(
    client: &reqwest::Client,
    base_url: &str,
    tag: &str,
) -> (String, String) {
    let identifier = unique_identifier(tag);
    let display_name = format!("User {}", tag);

    let resp = register(client, base_url, &identifier, &display_name, "pw1pw1pw1").await;
    assert_eq!(resp.status(), 303);

    let resp = login(client, base_url, &identifier, "pw1pw1pw1").await;
    assert_eq!(resp.status(), 303);

    (identifier, display_name)
}

async fn create_post(
    client: &reqwest::Client,
    base_url: &str,
    title: &str,
    content: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/post", base_url))
        .form(&[("title", title), ("content", content)])
        .send()
        .await
        .expect("Failed to send request")
}

/// Fetch the list and return the posts array.
async fn list_posts(client: &reqwest::Client, base_url: &str) -> Vec<serde_json::Value> {
    let resp = client
        .get(format!("{}/list", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    body["posts"].as_array().unwrap().clone()
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_login_list_flow() {
    let base_url = spawn_test_server().await;
    let client = client();

    let identifier = unique_identifier("flow");
    let resp = register(&client, &base_url, &identifier, "Flow User", "pw1pw1pw1").await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("location").unwrap(), "/?registered=1");

    let resp = login(&client, &base_url, &identifier, "pw1pw1pw1").await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("location").unwrap(), "/list");
    let cookie = resp.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    // The session cookie now opens the gate
    let resp = client
        .get(format!("{}/list", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["display_name"], "Flow User");
    assert_eq!(body["user"]["identifier"], identifier);
    // The resolved identity never exposes the secret hash
    assert!(body["user"].get("secret_hash").is_none());
}

#[tokio::test]
async fn test_login_wrong_secret() {
    let base_url = spawn_test_server().await;
    let client = client();

    let identifier = unique_identifier("wrongpw");
    register(&client, &base_url, &identifier, "Wrong PW", "pw1pw1pw1").await;

    let resp = login(&client, &base_url, &identifier, "not the secret").await;
    assert_eq!(resp.status(), 401);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid identifier or secret");
}

#[tokio::test]
async fn test_login_unknown_identifier_same_body() {
    let base_url = spawn_test_server().await;
    let client = client();

    // Unknown identifier and bad secret must be indistinguishable to callers
    let resp = login(&client, &base_url, "never@registered.example", "whatever1").await;
    assert_eq!(resp.status(), 401);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid identifier or secret");
}

#[tokio::test]
async fn test_duplicate_registration_conflict() {
    let base_url = spawn_test_server().await;
    let client = client();

    let identifier = unique_identifier("dup");
    let resp = register(&client, &base_url, &identifier, "First", "pw1pw1pw1").await;
    assert_eq!(resp.status(), 303);

    // Second registration with the same identifier must not touch the first
    let resp = register(&client, &base_url, &identifier, "Second", "different9").await;
    assert_eq!(resp.status(), 409);

    // The original credentials still work...
    let resp = login(&client, &base_url, &identifier, "pw1pw1pw1").await;
    assert_eq!(resp.status(), 303);

    // ...and the usurper's never did
    let other = self::client();
    let resp = login(&other, &base_url, &identifier, "different9").await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_register_mismatched_confirmation() {
    let base_url = spawn_test_server().await;
    let client = client();

    let resp = client
        .post(format!("{}/register", base_url))
        .form(&[
            ("identifier", unique_identifier("mismatch").as_str()),
            ("display_name", "Mismatch"),
            ("secret", "pw1pw1pw1"),
            ("secret_confirm", "pw2pw2pw2"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_register_invalid_identifier() {
    let base_url = spawn_test_server().await;
    let client = client();

    let resp = register(&client, &base_url, "no-at-sign", "Bad Id", "pw1pw1pw1").await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let base_url = spawn_test_server().await;
    let client = client();

    register_and_login(&client, &base_url, "logout").await;

    // Gate is open
    let resp = client
        .get(format!("{}/list", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{}/logout", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("location").unwrap(), "/");

    // Session is gone server-side, so the gate closes even if the client
    // were to keep replaying the old cookie
    let resp = client
        .get(format!("{}/list", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "/?login=required"
    );

    // Logging out again without a session still lands on the root
    let resp = client
        .post(format!("{}/logout", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("location").unwrap(), "/");
}

#[tokio::test]
async fn test_session_expiry_closes_gate() {
    let base_url = spawn_test_server_with_ttl(1).await;
    let client = client();

    register_and_login(&client, &base_url, "expiry").await;

    let resp = client
        .get(format!("{}/list", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // TTL elapses with no explicit logout
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let resp = client
        .get(format!("{}/list", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "/?login=required"
    );
}

#[tokio::test]
async fn test_gate_redirects_anonymous_callers() {
    let base_url = spawn_test_server().await;
    let client = client();

    for path in ["/list", "/detail/AAAAAAAAAAAA", "/post/AAAAAAAAAAAA/edit"] {
        let resp = client
            .get(format!("{}{}", base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 303, "GET {} should bounce", path);
        assert_eq!(
            resp.headers().get("location").unwrap(),
            "/?login=required"
        );
    }

    let resp = create_post(&client, &base_url, "title", "content").await;
    assert_eq!(resp.status(), 303);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "/?login=required"
    );
}

#[tokio::test]
async fn test_root_echoes_login_marker() {
    let base_url = spawn_test_server().await;
    let client = client();

    let resp = client
        .get(format!("{}/?login=required", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["login_required"], true);
    assert!(body["user"].is_null());
}

// ============================================================================
// Post Tests
// ============================================================================

#[tokio::test]
async fn test_create_post_stamps_author() {
    let base_url = spawn_test_server().await;
    let client = client();

    let (_, display_name) = register_and_login(&client, &base_url, "author").await;

    let title = format!("post_{}", nanoid::nanoid!(8));
    let resp = create_post(&client, &base_url, &title, "the content").await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("location").unwrap(), "/list");

    let posts = list_posts(&client, &base_url).await;
    let post = posts
        .iter()
        .find(|p| p["title"] == title.as_str())
        .expect("created post missing from list");

    assert_eq!(post["author_name"], display_name.as_str());
    assert!(!post["author_id"].as_str().unwrap().is_empty());
    assert!(post["created_at"].as_u64().unwrap() > 0);

    // Detail returns the same document
    let id = post["id"].as_str().unwrap();
    let resp = client
        .get(format!("{}/detail/{}", base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["post"]["title"], title.as_str());
    assert_eq!(body["post"]["content"], "the content");
}

#[tokio::test]
async fn test_list_is_reverse_chronological() {
    let base_url = spawn_test_server().await;
    let client = client();

    register_and_login(&client, &base_url, "order").await;

    let first = format!("first_{}", nanoid::nanoid!(8));
    let second = format!("second_{}", nanoid::nanoid!(8));
    create_post(&client, &base_url, &first, "one").await;
    create_post(&client, &base_url, &second, "two").await;

    let posts = list_posts(&client, &base_url).await;
    let first_pos = posts.iter().position(|p| p["title"] == first.as_str()).unwrap();
    let second_pos = posts
        .iter()
        .position(|p| p["title"] == second.as_str())
        .unwrap();
    assert!(second_pos < first_pos, "newer post should come first");
}

#[tokio::test]
async fn test_update_post_preserves_author() {
    let base_url = spawn_test_server().await;
    let client = client();

    register_and_login(&client, &base_url, "editor").await;

    let title = format!("orig_{}", nanoid::nanoid!(8));
    create_post(&client, &base_url, &title, "original content").await;

    let posts = list_posts(&client, &base_url).await;
    let post = posts.iter().find(|p| p["title"] == title.as_str()).unwrap();
    let id = post["id"].as_str().unwrap().to_string();
    let author_id = post["author_id"].as_str().unwrap().to_string();
    let created_at = post["created_at"].as_u64().unwrap();

    let resp = client
        .put(format!("{}/post/{}", base_url, id))
        .form(&[("title", "edited title"), ("content", "edited content")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(
        resp.headers().get("location").unwrap().to_str().unwrap(),
        format!("/detail/{}", id)
    );

    let resp = client
        .get(format!("{}/detail/{}", base_url, id))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["post"]["title"], "edited title");
    assert_eq!(body["post"]["content"], "edited content");
    // Author and creation time survive the edit untouched
    assert_eq!(body["post"]["author_id"], author_id.as_str());
    assert_eq!(body["post"]["created_at"].as_u64().unwrap(), created_at);
}

#[tokio::test]
async fn test_delete_post_by_another_user() {
    let base_url = spawn_test_server().await;

    // User A writes a post
    let author = client();
    register_and_login(&author, &base_url, "writer").await;
    let title = format!("victim_{}", nanoid::nanoid!(8));
    create_post(&author, &base_url, &title, "soon gone").await;

    let posts = list_posts(&author, &base_url).await;
    let id = posts
        .iter()
        .find(|p| p["title"] == title.as_str())
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // User B, authenticated but not the author, deletes it: no ownership
    // check is enforced on delete
    let other = client();
    register_and_login(&other, &base_url, "deleter").await;

    let resp = other
        .delete(format!("{}/post/{}", base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers().get("location").unwrap(), "/list");

    let resp = other
        .get(format!("{}/detail/{}", base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_post_not_found() {
    let base_url = spawn_test_server().await;
    let client = client();

    register_and_login(&client, &base_url, "notfound").await;

    let resp = client
        .get(format!("{}/detail/AAAAAAAAAAAA", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .delete(format!("{}/post/AAAAAAAAAAAA", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Malformed id is a 400, not a 404
    let resp = client
        .get(format!("{}/detail/short", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_create_post_rejects_empty_input() {
    let base_url = spawn_test_server().await;
    let client = client();

    register_and_login(&client, &base_url, "empty").await;

    let resp = create_post(&client, &base_url, "", "content").await;
    assert_eq!(resp.status(), 400);

    let resp = create_post(&client, &base_url, "title", "   ").await;
    assert_eq!(resp.status(), 400);
}

// ============================================================================
// Security Header Tests
// ============================================================================

#[tokio::test]
async fn test_security_headers_on_responses() {
    let base_url = spawn_test_server().await;
    let client = client();

    let resp = client.get(format!("{}/", base_url)).send().await.unwrap();

    let headers = resp.headers();
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");
    assert_eq!(headers.get("referrer-policy").unwrap(), "no-referrer");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("strict-transport-security").is_some());
    assert!(headers.get("content-security-policy").is_some());
}
