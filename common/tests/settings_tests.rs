// Layered configuration loading tests

use common::config::Settings;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_files_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_from_path(dir.path()).unwrap();

    assert_eq!(settings.booking.service_id, "8029");
    assert_eq!(settings.booking.location_id, "1651");
    assert!(settings.watcher.enabled);
    assert!(!settings.telegram.is_configured());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        r#"
[booking]
client_session = "cookie-value"
service_id = "9000"

[window]
days_ahead = 3
start_time = "08:00"
end_time = "12:00"
timezone = "Europe/Bucharest"

[telegram]
bot_token = "token"
chat_id = "42"
"#,
    )
    .unwrap();

    let settings = Settings::load_from_path(dir.path()).unwrap();

    assert_eq!(settings.booking.service_id, "9000");
    assert_eq!(settings.booking.location_id, "1651");
    assert_eq!(settings.window.days_ahead, Some(3));
    assert!(settings.telegram.is_configured());
    assert!(settings.validate().is_ok());
}

#[test]
fn test_local_file_overrides_default_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        r#"
[booking]
client_session = "default-session"
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("local.toml"),
        r#"
[booking]
client_session = "local-session"

[watcher]
enabled = false
"#,
    )
    .unwrap();

    let settings = Settings::load_from_path(dir.path()).unwrap();

    assert_eq!(settings.booking.client_session, "local-session");
    assert!(!settings.watcher.enabled);
}

#[test]
fn test_loaded_specific_days_are_validated() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        r#"
[booking]
client_session = "cookie"

[window]
specific_days = ["2025-04-10", "not-a-date"]
"#,
    )
    .unwrap();

    let settings = Settings::load_from_path(dir.path()).unwrap();
    assert!(settings.validate().is_err());
}
