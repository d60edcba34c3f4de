use std::env;
use std::sync::{Mutex, OnceLock};

use reach_cli::commands::{doctor, migrate, seed};
use serde_json::Value;
use tempfile::TempDir;

const MEMORY_DB: &[(&str, &str)] =
    &[("REACH_DATABASE_URL", "sqlite::memory:"), ("REACH_DATABASE_MAX_CONNECTIONS", "1")];

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(MEMORY_DB, || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("REACH_DATABASE_URL", "postgres://localhost/reach")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn migrate_returns_db_failure_when_file_cannot_be_opened() {
    let dir = TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}/missing/reach.db", dir.path().display());

    with_env(&[("REACH_DATABASE_URL", url.as_str()), ("REACH_DATABASE_TIMEOUT_SECS", "2")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 4, "expected database connectivity failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "db_connectivity");
    });
}

#[test]
fn seed_loads_demo_dataset() {
    with_env(MEMORY_DB, || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected seed success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("owner `demo`"));
        assert!(message.contains("customers 6 inserted, 0 already present"));
        assert!(message.contains("campaigns 2 inserted, 0 already present"));
    });
}

#[test]
fn seed_is_idempotent_against_a_file_store() {
    let dir = TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("reach.db").display());

    with_env(&[("REACH_DATABASE_URL", url.as_str())], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let payload = parse_payload(&second.output);
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("customers 0 inserted, 6 already present"));
        assert!(message.contains("campaigns 0 inserted, 2 already present"));
    });
}

#[test]
fn doctor_flags_pending_migrations_until_migrate_runs() {
    let dir = TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("reach.db").display());

    with_env(&[("REACH_DATABASE_URL", url.as_str())], || {
        let before = doctor::run(true);
        assert_eq!(before.exit_code, 4);
        let report = parse_payload(&before.output);
        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][1]["status"], "pass");
        assert_eq!(report["checks"][2]["name"], "schema_migrations");
        assert_eq!(report["checks"][2]["status"], "fail");

        assert_eq!(migrate::run().exit_code, 0);

        let after = doctor::run(true);
        assert_eq!(after.exit_code, 0);
        let report = parse_payload(&after.output);
        assert_eq!(report["overall_status"], "pass");
    });
}

#[test]
fn doctor_skips_store_checks_when_config_is_invalid() {
    with_env(&[("REACH_SERVER_PORT", "not-a-port")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 2);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [skip] database_connectivity"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "REACH_DATABASE_URL",
        "REACH_DATABASE_MAX_CONNECTIONS",
        "REACH_DATABASE_TIMEOUT_SECS",
        "REACH_SERVER_BIND_ADDRESS",
        "REACH_SERVER_PORT",
        "REACH_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "REACH_CORS_ALLOWED_ORIGINS",
        "REACH_CORS_ALLOW_CREDENTIALS",
        "REACH_LOGGING_LEVEL",
        "REACH_LOGGING_FORMAT",
        "REACH_LOG_LEVEL",
        "REACH_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
