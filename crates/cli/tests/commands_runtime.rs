use std::env;
use std::sync::{Arc, Mutex, OnceLock};

use elogie_cli::commands::{config, doctor, remind};
use elogie_slack::{
    client::{ChannelMembersPage, SlackUser},
    testing::RecordingSlackApi,
};
use serde_json::Value;

const VALID_ENV: &[(&str, &str)] = &[
    ("ELOGIE_SLACK_BOT_TOKEN", "xoxb-test"),
    ("ELOGIE_SLACK_SIGNING_SECRET", "signing-secret"),
    ("ELOGIE_SLACK_CHANNEL_ID", "C0KUDOS"),
];

#[test]
fn remind_returns_config_failure_without_tokens() {
    with_env(&[], || {
        let result = remind::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "remind");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn remind_reports_summary_for_a_channel_sweep() {
    let slack = Arc::new(
        RecordingSlackApi::default()
            .with_member_pages(vec![ChannelMembersPage {
                members: vec!["U1".to_owned(), "B1".to_owned(), "U2".to_owned()],
                next_cursor: None,
            }])
            .with_user(user("U1", false))
            .with_user(user("B1", true))
            .with_user(user("U2", false))
            .fail_post_to("U2", "cannot_dm"),
    );

    let result = remind::run_with(slack.clone(), "C0KUDOS");
    assert_eq!(result.exit_code, 0, "DM failures do not fail the sweep");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["members"], 2);
    assert_eq!(payload["details"]["skipped"], 1);
    assert_eq!(payload["details"]["sent"], 1);
    assert_eq!(payload["details"]["failed"], 1);

    let runtime = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
    let posted = runtime.block_on(slack.posted_messages());
    assert_eq!(posted.len(), 2);
}

#[test]
fn remind_fails_when_members_cannot_be_listed() {
    let slack = Arc::new(RecordingSlackApi::default().fail_members("channel_not_found"));

    let result = remind::run_with(slack, "C0KUDOS");
    assert_eq!(result.exit_code, 4, "expected reminder failure code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "reminder");
    assert!(payload["message"].as_str().unwrap_or_default().contains("channel_not_found"));
}

#[test]
fn doctor_json_passes_with_valid_env() {
    with_env(VALID_ENV, || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn doctor_human_output_flags_config_failure() {
    with_env(&[], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 2);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation"));
        assert!(result.output.contains("- [skip] slack_channel"));
    });
}

#[test]
fn config_redacts_secrets_and_attributes_sources() {
    with_env(VALID_ENV, || {
        let output = config::run();

        assert!(output.contains("- slack.bot_token = xoxb-*** (source: env (ELOGIE_SLACK_BOT_TOKEN))"));
        assert!(output.contains("- slack.signing_secret = <redacted>"));
        assert!(!output.contains("signing-secret"));
        assert!(output.contains("- slack.channel_id = C0KUDOS"));
        assert!(output.contains("- server.port = 8080 (source: default)"));
    });
}

fn user(id: &str, is_bot: bool) -> SlackUser {
    SlackUser { id: id.to_owned(), name: id.to_lowercase(), is_bot, deleted: false }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "ELOGIE_SLACK_BOT_TOKEN",
        "ELOGIE_SLACK_SIGNING_SECRET",
        "ELOGIE_SLACK_CHANNEL_ID",
        "ELOGIE_SLACK_API_BASE_URL",
        "ELOGIE_SLACK_TIMEOUT_SECS",
        "ELOGIE_SERVER_BIND_ADDRESS",
        "ELOGIE_SERVER_PORT",
        "ELOGIE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "ELOGIE_LOGGING_LEVEL",
        "ELOGIE_LOGGING_FORMAT",
        "ELOGIE_LOG_LEVEL",
        "ELOGIE_LOG_FORMAT",
        "SLACK_BOT_TOKEN",
        "SLACK_SIGNING_SECRET",
        "SLACK_CHANNEL_ID",
        "PORT",
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
