//! HTTP-level tests for the hosted REST backend.

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use candle_client::backend::supabase::SupabaseBackend;
use candle_client::{BackendError, CandleBackend, NewCandle, Position, RejectionReport, Session};

fn marker(id: &str, emotion: &str) -> serde_json::Value {
    json!({
        "id": id,
        "position": [10.0, 20.0],
        "emotion": emotion,
        "timestamp": "2025-03-03T12:00:00Z",
        "user_timestamp": "2025-03-03T14:00:00+02:00",
        "user_id": "u1"
    })
}

fn test_session() -> Session {
    Session {
        user_id: "anon-1".to_string(),
        access_token: "session-token".to_string(),
        issued_at: Utc::now(),
        expires_at: None,
    }
}

#[tokio::test]
async fn list_concatenates_pages_until_short_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/markers"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([marker("a", "sorrow"), marker("b", "awe")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/markers"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([marker("c", "annoyed")])))
        .mount(&server)
        .await;

    let backend = SupabaseBackend::new(server.uri(), "anon-key").with_page_size(2);
    let candles = backend.list_candles().await.unwrap();

    assert_eq!(candles.len(), 3);
    assert_eq!(candles[0].id, "a");
    assert_eq!(candles[2].id, "c");
}

#[tokio::test]
async fn stream_emits_one_batch_per_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/markers"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([marker("a", "sorrow"), marker("b", "awe")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/markers"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let backend = SupabaseBackend::new(server.uri(), "anon-key").with_page_size(2);
    let stream = backend.stream_candles().await.unwrap();
    let candles = stream.collect_all().await;

    assert_eq!(candles.len(), 2);
}

#[tokio::test]
async fn signup_forwards_the_challenge_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_json(json!({
            "gotrue_meta_security": { "captcha_token": "turnstile-token" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "expires_in": 3600,
            "user": { "id": "anon-42" }
        })))
        .mount(&server)
        .await;

    let backend = SupabaseBackend::new(server.uri(), "anon-key");
    let session = backend
        .issue_session(Some("turnstile-token"))
        .await
        .unwrap();

    assert_eq!(session.user_id, "anon-42");
    assert_eq!(session.access_token, "jwt-token");
    assert!(session.expires_at.is_some());
    assert!(!session.is_expired());
}

#[tokio::test]
async fn create_classifies_429_as_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/create_candle"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "30")
                .set_body_string("Too Many Requests"),
        )
        .mount(&server)
        .await;

    let backend = SupabaseBackend::new(server.uri(), "anon-key");
    let result = backend
        .create_candle(
            &test_session(),
            &NewCandle::new("lonely", Position::new(0.0, 0.0).unwrap()),
        )
        .await;

    match result {
        Err(BackendError::RateLimited { retry_after_ms }) => {
            assert_eq!(retry_after_ms, Some(30_000));
        }
        other => panic!("expected rate limit, got {:?}", other),
    }
}

#[tokio::test]
async fn create_classifies_rate_limit_message_bodies() {
    let server = MockServer::start().await;

    // The creation RPC rejects throttled callers with a plain Postgres error.
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/create_candle"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Rate limit exceeded: one candle per minute"
        })))
        .mount(&server)
        .await;

    let backend = SupabaseBackend::new(server.uri(), "anon-key");
    let result = backend
        .create_candle(
            &test_session(),
            &NewCandle::new("lonely", Position::new(0.0, 0.0).unwrap()),
        )
        .await;

    assert!(matches!(result, Err(ref err) if err.is_rate_limit()));
}

#[tokio::test]
async fn create_returns_the_inserted_row() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/create_candle"))
        .and(body_json(json!({
            "emotion": "lonely",
            "position": [38.9072, -77.0369],
            "user_timestamp": "2025-03-03T14:00:00+02:00"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(marker("created-1", "lonely")))
        .mount(&server)
        .await;

    let backend = SupabaseBackend::new(server.uri(), "anon-key");
    let payload = NewCandle::new("lonely", Position::new(38.9072, -77.0369).unwrap())
        .with_user_timestamp("2025-03-03T14:00:00+02:00");
    let candle = backend
        .create_candle(&test_session(), &payload)
        .await
        .unwrap();

    assert_eq!(candle.id, "created-1");
    assert_eq!(candle.emotion.as_deref(), Some("lonely"));
}

#[tokio::test]
async fn delete_reports_not_owner_when_rls_filters_the_row() {
    let server = MockServer::start().await;

    // Row-level security returns an empty representation for foreign rows.
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/markers"))
        .and(query_param("id", "eq.foreign-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/markers"))
        .and(query_param("id", "eq.mine-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([marker("mine-1", "awe")])))
        .mount(&server)
        .await;

    let backend = SupabaseBackend::new(server.uri(), "anon-key");

    let result = backend.delete_candle(&test_session(), "foreign-1").await;
    assert!(matches!(result, Err(BackendError::NotOwner(id)) if id == "foreign-1"));

    backend
        .delete_candle(&test_session(), "mine-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn rejection_log_posts_the_report() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rejection_logs"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let backend = SupabaseBackend::new(server.uri(), "anon-key");
    let report = RejectionReport::rate_limited(
        Some("lonely".to_string()),
        Some(Position::new(1.0, 2.0).unwrap()),
    );
    backend.log_rejection(&report).await.unwrap();
}

#[tokio::test]
async fn availability_tracks_the_auth_health_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let backend = SupabaseBackend::new(server.uri(), "anon-key");
    assert!(backend.is_available().await);

    let unreachable = SupabaseBackend::new("http://127.0.0.1:9", "anon-key");
    assert!(!unreachable.is_available().await);
}
