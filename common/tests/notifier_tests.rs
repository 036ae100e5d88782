// Integration tests for Telegram notification delivery

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use common::config::TelegramConfig;
use common::errors::NotifyError;
use common::models::{DayQuery, DayReport, DayStatus, ScanReport, Slot};
use common::notify::{Notifier, TelegramNotifier};
use common::window::day_start_timestamp;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn telegram_config(api_base: &str) -> TelegramConfig {
    TelegramConfig {
        bot_token: Some("123456:bot-secret".to_string()),
        chat_id: Some("987".to_string()),
        api_base: api_base.to_string(),
        timeout_seconds: 5,
    }
}

fn open_report() -> ScanReport {
    let date = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
    let base = day_start_timestamp(date, Tz::UTC);
    ScanReport {
        scan_id: Uuid::new_v4(),
        days: vec![DayReport {
            day: DayQuery {
                date,
                timestamp: base,
            },
            slots: vec![Slot {
                time: base + 16 * 3600,
                staff_id: Some(5),
                is_available: 1,
            }],
            status: DayStatus::Open,
        }],
        started_at: Utc::now(),
        completed_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_delivery_posts_form_to_bot_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123456:bot-secret/sendMessage"))
        .and(body_string_contains("chat_id=987"))
        .and(body_string_contains("2025-04-10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let notifier =
        TelegramNotifier::from_config(&telegram_config(&mock_server.uri()), Tz::UTC).unwrap();
    notifier.notify(&open_report()).await.unwrap();

    mock_server.verify().await;
}

#[tokio::test]
async fn test_rejected_delivery_surfaces_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string("bot was blocked by the user"),
        )
        .mount(&mock_server)
        .await;

    let notifier =
        TelegramNotifier::from_config(&telegram_config(&mock_server.uri()), Tz::UTC).unwrap();
    let err = notifier.notify(&open_report()).await.unwrap_err();

    match err {
        NotifyError::Rejected { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("blocked"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejection_body_never_contains_bot_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("no route for /bot123456:bot-secret/sendMessage"),
        )
        .mount(&mock_server)
        .await;

    let notifier =
        TelegramNotifier::from_config(&telegram_config(&mock_server.uri()), Tz::UTC).unwrap();
    let err = notifier.notify(&open_report()).await.unwrap_err();

    assert!(!err.to_string().contains("bot-secret"));
}
