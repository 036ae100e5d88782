// Integration tests for the booking availability client

use chrono::NaiveDate;
use chrono_tz::Tz;
use common::client::BookingClient;
use common::config::BookingConfig;
use common::errors::FetchError;
use common::models::DayQuery;
use common::window::day_start_timestamp;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: &str) -> BookingConfig {
    BookingConfig {
        base_url: base_url.to_string(),
        service_id: "8029".to_string(),
        location_id: "1651".to_string(),
        client_session: "session-cookie".to_string(),
        timeout_seconds: 5,
    }
}

fn sample_day() -> DayQuery {
    let date = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
    DayQuery {
        date,
        timestamp: day_start_timestamp(date, Tz::UTC),
    }
}

#[tokio::test]
async fn test_fetch_sends_expected_query_and_cookie() {
    let mock_server = MockServer::start().await;
    let day = sample_day();

    Mock::given(method("GET"))
        .and(path("/api/get_available_slots"))
        .and(query_param("service_id", "8029"))
        .and(query_param("location_id", "1651"))
        .and(query_param("date", day.timestamp.to_string()))
        .and(query_param("day_only", "1"))
        .and(header(
            "cookie",
            "cookie_message=0; client_session=session-cookie",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": 1,
            "available_slots": [
                {"time": day.timestamp + 16 * 3600, "staff_id": 3, "is_available": 1}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = BookingClient::new(&config(&mock_server.uri())).unwrap();
    let response = client.fetch_day(&day).await.unwrap();

    assert!(response.has_openings());
    assert_eq!(response.available_slots.len(), 1);
    assert_eq!(response.available_slots[0].staff_id, Some(3));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_no_openings_reply_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_available_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": 0
        })))
        .mount(&mock_server)
        .await;

    let client = BookingClient::new(&config(&mock_server.uri())).unwrap();
    let response = client.fetch_day(&sample_day()).await.unwrap();

    assert!(!response.has_openings());
    assert!(response.available_slots.is_empty());
}

#[tokio::test]
async fn test_server_error_is_retryable_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_available_slots"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = BookingClient::new(&config(&mock_server.uri())).unwrap();
    let err = client.fetch_day(&sample_day()).await.unwrap_err();

    match &err {
        FetchError::Status { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_auth_failure_is_terminal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_available_slots"))
        .respond_with(ResponseTemplate::new(401).set_body_string("session expired"))
        .mount(&mock_server)
        .await;

    let client = BookingClient::new(&config(&mock_server.uri())).unwrap();
    let err = client.fetch_day(&sample_day()).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 401, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get_available_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let client = BookingClient::new(&config(&mock_server.uri())).unwrap();
    let err = client.fetch_day(&sample_day()).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
    assert!(!err.is_retryable());
}
