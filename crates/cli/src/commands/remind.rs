use std::sync::Arc;

use elogie_core::config::{AppConfig, LoadOptions};
use elogie_slack::{
    client::{HttpSlackClient, SlackApi},
    interactions::EventContext,
    reminder::{ReminderService, ReminderSummary},
};
use uuid::Uuid;

use crate::logging;

use super::{CommandResult, EXIT_CONFIG, EXIT_REMINDER, EXIT_RUNTIME};

const COMMAND: &str = "remind";

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            )
        }
    };

    logging::init(&config.logging);

    let slack = match HttpSlackClient::from_config(&config.slack) {
        Ok(client) => client,
        Err(error) => {
            return CommandResult::failure(COMMAND, "slack_client", error.to_string(), EXIT_RUNTIME)
        }
    };

    run_with(Arc::new(slack), &config.slack.channel_id)
}

/// Runs one reminder sweep against `slack` on a dedicated current-thread runtime.
pub fn run_with(slack: Arc<dyn SlackApi>, channel_id: &str) -> CommandResult {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            )
        }
    };

    let ctx = EventContext::new(format!("remind-{}", Uuid::new_v4().simple()));
    let service = ReminderService::new(slack, channel_id);

    match runtime.block_on(service.run(&ctx)) {
        Ok(summary) => CommandResult::success(
            COMMAND,
            summary_message(&summary),
            serde_json::to_value(summary).ok(),
        ),
        Err(error) => CommandResult::failure(COMMAND, "reminder", error.to_string(), EXIT_REMINDER),
    }
}

fn summary_message(summary: &ReminderSummary) -> String {
    format!(
        "reminder sent to {} of {} members ({} failed, {} skipped)",
        summary.sent, summary.members, summary.failed, summary.skipped
    )
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use elogie_core::config::{LogFormat, LoggingConfig};
    use elogie_slack::{
        client::{ChannelMembersPage, SlackUser},
        testing::RecordingSlackApi,
    };

    use super::run_with;
    use crate::logging;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("log buffer").clone()).expect("utf8 logs")
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn member(id: &str) -> SlackUser {
        SlackUser { id: id.to_owned(), name: id.to_lowercase(), is_bot: false, deleted: false }
    }

    #[test]
    fn failed_dm_is_logged_with_the_member_id() {
        let slack = Arc::new(
            RecordingSlackApi::default()
                .with_member_pages(vec![ChannelMembersPage {
                    members: vec!["U1".to_owned(), "U2".to_owned()],
                    next_cursor: None,
                }])
                .with_user(member("U1"))
                .with_user(member("U2"))
                .fail_post_to("U2", "cannot_dm"),
        );
        let logs = CapturedLogs::default();
        let config = LoggingConfig { level: "info".to_owned(), format: LogFormat::Json };
        let writer = logs.clone();
        let subscriber = logging::subscriber(&config, move || writer.clone());

        let result =
            tracing::subscriber::with_default(subscriber, || run_with(slack.clone(), "C0KUDOS"));

        assert_eq!(result.exit_code, 0);
        let output = logs.contents();
        let failure = output
            .lines()
            .find(|line| line.contains("reminder.dm.failed"))
            .expect("dm failure log line");
        assert!(failure.contains("\"user_id\":\"U2\""));
        assert!(failure.contains("cannot_dm"));
        assert!(output.contains("reminder.run.completed"));
    }

    #[test]
    fn log_level_filters_out_lower_events() {
        let slack = Arc::new(RecordingSlackApi::default());
        let logs = CapturedLogs::default();
        let config = LoggingConfig { level: "warn".to_owned(), format: LogFormat::Json };
        let writer = logs.clone();
        let subscriber = logging::subscriber(&config, move || writer.clone());

        let result =
            tracing::subscriber::with_default(subscriber, || run_with(slack.clone(), "C0KUDOS"));

        assert_eq!(result.exit_code, 0);
        assert!(!logs.contents().contains("reminder.run.started"));
    }
}
