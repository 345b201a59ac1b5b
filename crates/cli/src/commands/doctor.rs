use elogie_core::config::{AppConfig, LoadOptions};
use elogie_slack::modal::ModalTemplate;
use serde::Serialize;

use super::{CommandResult, EXIT_CONFIG, EXIT_RUNTIME};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report(LoadOptions::default(), &ModalTemplate::give_kudos());
    let exit_code = exit_code_for(&report);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: LoadOptions, template: &ModalTemplate) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(DoctorCheck {
                name: "slack_channel",
                status: CheckStatus::Pass,
                details: format!(
                    "kudos will be posted to `{}` via {}",
                    config.slack.channel_id, config.slack.api_base_url
                ),
            });
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "slack_channel",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    checks.push(match template.validate() {
        Ok(block_count) => DoctorCheck {
            name: "modal_template",
            status: CheckStatus::Pass,
            details: format!("give-kudos modal parsed with {block_count} blocks"),
        },
        Err(error) => DoctorCheck {
            name: "modal_template",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    });

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn exit_code_for(report: &DoctorReport) -> u8 {
    let failed = |name: &str| {
        report.checks.iter().any(|check| check.name == name && check.status == CheckStatus::Fail)
    };

    if failed("config_validation") {
        EXIT_CONFIG
    } else if report.overall_status == CheckStatus::Fail {
        EXIT_RUNTIME
    } else {
        0
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use elogie_core::config::{ConfigOverrides, LoadOptions};
    use elogie_slack::modal::ModalTemplate;

    use super::{build_report, exit_code_for, render_human, CheckStatus};

    fn options(bot_token: &str) -> LoadOptions {
        LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            overrides: ConfigOverrides {
                slack_bot_token: Some(bot_token.to_string()),
                slack_signing_secret: Some("signing-secret".to_string()),
                slack_channel_id: Some("C0KUDOS".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[test]
    fn healthy_setup_passes_every_check() {
        let report = build_report(options("xoxb-test"), &ModalTemplate::give_kudos());

        assert_eq!(report.overall_status, CheckStatus::Pass);
        assert_eq!(report.checks.len(), 3);
        assert_eq!(exit_code_for(&report), 0);
        assert!(render_human(&report).contains("- [ok] modal_template"));
    }

    #[test]
    fn config_failure_skips_channel_check_but_still_checks_template() {
        let report = build_report(options("xapp-wrong"), &ModalTemplate::give_kudos());

        assert_eq!(report.overall_status, CheckStatus::Fail);
        assert_eq!(report.checks[0].status, CheckStatus::Fail);
        assert_eq!(report.checks[1].status, CheckStatus::Skipped);
        assert_eq!(report.checks[2].status, CheckStatus::Pass);
        assert_eq!(exit_code_for(&report), 2);
    }

    #[test]
    fn broken_template_is_a_runtime_failure() {
        let template = ModalTemplate::from_source("{\"view\":{\"blocks\":[]}}");

        let report = build_report(options("xoxb-test"), &template);

        assert_eq!(report.checks[2].status, CheckStatus::Fail);
        assert_eq!(exit_code_for(&report), 3);
    }
}
