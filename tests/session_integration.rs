//! Integration tests for the authenticated session client.
//!
//! These tests verify login, cookie handling and retry behavior against mock
//! qBittorrent servers.

mod support;

use std::time::{Duration, Instant};

use auto_tagger_core::client::{ClientError, Method, RetryPolicy, SessionClient, SessionConfig};
use support::{
    FlakyResponder, INFO_PATH, LOGIN_PATH, SESSION_COOKIE, closed_port, fast_config, mount_login,
};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ==================== Login Tests ====================

#[tokio::test]
async fn test_connect_posts_credentials_as_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("username=admin&password=adminadmin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Ok."))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = SessionClient::connect(&fast_config(&mock_server.uri(), 3)).await;
    assert!(result.is_ok(), "login should succeed: {:?}", result.err());
}

#[tokio::test]
async fn test_connect_accepts_success_marker_with_trailing_newline() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("Ok.\n"))
        .mount(&mock_server)
        .await;

    assert!(
        SessionClient::connect(&fast_config(&mock_server.uri(), 1))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_connect_rejected_credentials_is_auth_error_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("Fails."))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = SessionClient::connect(&fast_config(&mock_server.uri(), 5))
        .await
        .unwrap_err();
    assert!(err.is_auth(), "expected auth error, got: {err:?}");
    assert!(err.to_string().contains("Fails."));
}

#[tokio::test]
async fn test_connect_forbidden_status_is_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("Your IP address has been banned"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = SessionClient::connect(&fast_config(&mock_server.uri(), 5))
        .await
        .unwrap_err();
    match err {
        ClientError::Auth { message } => assert!(message.contains("403")),
        other => panic!("Expected Auth, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_invalid_host_fails_before_any_request() {
    let config = SessionConfig::new("localhost:8080", "admin", "adminadmin");
    let err = SessionClient::connect(&config).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidHost { .. }), "{err:?}");
}

#[tokio::test]
async fn test_connect_strips_trailing_slash_from_host() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    let host = format!("{}/", mock_server.uri());
    let session = SessionClient::connect(&fast_config(&host, 1)).await.unwrap();
    assert_eq!(session.base_url(), mock_server.uri());
}

// ==================== Session Cookie Tests ====================

#[tokio::test]
async fn test_session_cookie_is_resent_on_later_requests() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(INFO_PATH))
        .and(header("cookie", SESSION_COOKIE))
        .and(query_param("hashes", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = SessionClient::connect(&fast_config(&mock_server.uri(), 1))
        .await
        .unwrap();
    let body = session
        .get(INFO_PATH, &[("hashes", "abc123")])
        .await
        .unwrap();
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_cloned_session_shares_cookie_jar() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(INFO_PATH))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let session = SessionClient::connect(&fast_config(&mock_server.uri(), 1))
        .await
        .unwrap();
    let clone = session.clone();
    let (first, second) = tokio::join!(
        session.get(INFO_PATH, &[]),
        clone.get(INFO_PATH, &[])
    );
    assert!(first.is_ok());
    assert!(second.is_ok());
}

// ==================== Retry Tests ====================

#[tokio::test]
async fn test_request_retries_timeouts_then_succeeds() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(INFO_PATH))
        .respond_with(FlakyResponder::new(2, "[]"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let session = SessionClient::connect(&fast_config(&mock_server.uri(), 3))
        .await
        .unwrap();
    let body = session.get(INFO_PATH, &[]).await;
    assert_eq!(body.unwrap(), "[]");
}

#[tokio::test]
async fn test_request_exhausts_attempts_with_transport_error() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(INFO_PATH))
        .respond_with(FlakyResponder::new(usize::MAX, "[]"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let session = SessionClient::connect(&fast_config(&mock_server.uri(), 3))
        .await
        .unwrap();
    let err = session.get(INFO_PATH, &[]).await.unwrap_err();
    match err {
        ClientError::Transport {
            attempts, source, ..
        } => {
            assert_eq!(attempts, 3);
            assert!(source.is_timeout(), "last cause should be a timeout: {source}");
        }
        other => panic!("Expected Transport, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_host_waits_full_backoff_sequence() {
    let host = format!("http://127.0.0.1:{}", closed_port());
    let config = SessionConfig::new(host, "admin", "adminadmin")
        .with_request_timeout(Duration::from_millis(500))
        .with_retry_policy(RetryPolicy::new(3, 2.0).with_backoff_unit(Duration::from_millis(10)));

    let started = Instant::now();
    let err = SessionClient::connect(&config).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_transport(), "expected transport error, got: {err:?}");
    assert!(matches!(err, ClientError::Transport { attempts: 3, .. }));
    // 10ms * 2^1 + 10ms * 2^2
    assert!(
        elapsed >= Duration::from_millis(60),
        "expected full backoff, took {elapsed:?}"
    );
}

#[tokio::test]
async fn test_single_attempt_policy_does_not_retry() {
    let host = format!("http://127.0.0.1:{}", closed_port());
    let config = SessionConfig::new(host, "admin", "adminadmin")
        .with_retry_policy(RetryPolicy::with_max_attempts(1));

    let err = SessionClient::connect(&config).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { attempts: 1, .. }));
}

#[tokio::test]
async fn test_http_error_status_is_not_retried() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(INFO_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = SessionClient::connect(&fast_config(&mock_server.uri(), 5))
        .await
        .unwrap();
    let err = session
        .request(Method::GET, INFO_PATH, &[], None)
        .await
        .unwrap_err();
    assert!(err.is_api());
    assert!(matches!(err, ClientError::HttpStatus { status: 500, .. }));
}
