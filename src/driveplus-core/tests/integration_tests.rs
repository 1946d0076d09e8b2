//! Integration tests for driveplus-core.
//!
//! Runs the facade against the fake file API and a mocked token API, so a
//! single test covers token refresh, document queries and writes together.

use std::sync::Arc;

use driveplus_common::DriveplusConfig;
use driveplus_core::{Driveplus, SetOutcome};
use driveplus_drive::MetadataStore;
use driveplus_drive::testing::{FAKE_TOKEN, FakeDrive};
use driveplus_login::{MemorySessionStore, Session, SessionStore, TokenProvider};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const META: &str = "drive++meta.json";

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

struct Stack {
    fake: FakeDrive,
    token_api: MockServer,
    sessions: Arc<MemorySessionStore>,
    app: Arc<Driveplus>,
}

/// Facade whose stored access token has expired and must be refreshed.
async fn expired_stack() -> Stack {
    let fake = FakeDrive::start().await;
    let token_api = MockServer::start().await;
    let sessions = Arc::new(MemorySessionStore::with_session(&Session::new(
        "stale-token".to_string(),
        Some("refresh-1".to_string()),
        now() - 10,
    )));

    let tokens = Arc::new(TokenProvider::new(
        sessions.clone(),
        reqwest_client(),
        token_api.uri(),
    ));
    let store = MetadataStore::new(fake.client(tokens), META);
    let app = Arc::new(Driveplus::from_parts(DriveplusConfig::default(), store).unwrap());

    Stack {
        fake,
        token_api,
        sessions,
        app,
    }
}

fn reqwest_client() -> reqwest::Client {
    driveplus_common::create_default_client().unwrap()
}

#[tokio::test]
async fn test_concurrent_reads_share_one_refresh() {
    let stack = expired_stack().await;
    stack
        .fake
        .insert_raw("abc123", META, br#"[{"url":"https://example.com"}]"#);

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(serde_json::json!({"refresh_token": "refresh-1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "accessToken": FAKE_TOKEN,
                    "expiresAt": now() + 3600
                }))
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&stack.token_api)
        .await;

    let reads = (0..6).map(|_| {
        let app = Arc::clone(&stack.app);
        tokio::spawn(async move { app.get_links("abc123").await })
    });
    for read in futures::future::join_all(reads).await {
        let links = read.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com");
    }

    let session = stack.sessions.load().await.unwrap();
    assert_eq!(session.access_token(), Some(FAKE_TOKEN));
    assert_eq!(session.refresh_token(), Some("refresh-1"));
}

#[tokio::test]
async fn test_rejected_refresh_degrades_and_keeps_session() {
    let stack = expired_stack().await;
    stack
        .fake
        .insert_raw("abc123", META, br#"[{"url":"https://example.com"}]"#);

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
        .expect(3)
        .mount(&stack.token_api)
        .await;

    // One refresh attempt for the read, two for the add (read, then the write's lookup).
    assert!(stack.app.get_links("abc123").await.is_empty());
    assert_eq!(stack.app.add_link("abc123", "https://x.example").await, None);

    let session = stack.sessions.load().await.unwrap();
    assert_eq!(session.access_token(), Some("stale-token"));
    assert_eq!(stack.fake.files_in("abc123"), 1);
}

#[tokio::test]
async fn test_edit_round_trip_after_refresh() {
    let stack = expired_stack().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessToken": FAKE_TOKEN,
            "expiresAt": now() + 3600
        })))
        .expect(1)
        .mount(&stack.token_api)
        .await;

    let app = &stack.app;
    assert!(matches!(
        app.add_link("abc123", "https://one.example").await,
        Some(SetOutcome::Created(_))
    ));
    assert_eq!(
        app.add_link("abc123", "https://two.example").await,
        Some(SetOutcome::Updated)
    );
    assert_eq!(stack.fake.files_in("abc123"), 1);

    assert_eq!(app.remove_link("abc123", 0).await, Some(SetOutcome::Updated));
    assert_eq!(app.remove_link("abc123", 0).await, Some(SetOutcome::Deleted));
    assert!(app.get_links("abc123").await.is_empty());
    assert_eq!(stack.fake.files_in("abc123"), 0);
}
