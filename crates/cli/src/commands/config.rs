use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use elogie_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

/// One rendered configuration entry and the env keys that can override it.
struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let file_path = detect_config_path();
    let file_doc = load_config_file_doc(file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(&field, file_doc.as_ref(), file_path.as_deref());
        lines.push(format!("- {} = {} (source: {source})", field.key_path, field.value));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key_path: "slack.bot_token",
            env_keys: &["ELOGIE_SLACK_BOT_TOKEN", "SLACK_BOT_TOKEN"],
            value: redact_token(config.slack.bot_token.expose_secret()),
        },
        Field {
            key_path: "slack.signing_secret",
            env_keys: &["ELOGIE_SLACK_SIGNING_SECRET", "SLACK_SIGNING_SECRET"],
            value: redact_secret(&config.slack.signing_secret),
        },
        Field {
            key_path: "slack.channel_id",
            env_keys: &["ELOGIE_SLACK_CHANNEL_ID", "SLACK_CHANNEL_ID"],
            value: config.slack.channel_id.clone(),
        },
        Field {
            key_path: "slack.api_base_url",
            env_keys: &["ELOGIE_SLACK_API_BASE_URL"],
            value: config.slack.api_base_url.clone(),
        },
        Field {
            key_path: "slack.timeout_secs",
            env_keys: &["ELOGIE_SLACK_TIMEOUT_SECS"],
            value: config.slack.timeout_secs.to_string(),
        },
        Field {
            key_path: "server.bind_address",
            env_keys: &["ELOGIE_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        Field {
            key_path: "server.port",
            env_keys: &["ELOGIE_SERVER_PORT", "PORT"],
            value: config.server.port.to_string(),
        },
        Field {
            key_path: "server.graceful_shutdown_secs",
            env_keys: &["ELOGIE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            value: config.server.graceful_shutdown_secs.to_string(),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["ELOGIE_LOGGING_LEVEL", "ELOGIE_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["ELOGIE_LOGGING_FORMAT", "ELOGIE_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("elogie.toml"), PathBuf::from("config/elogie.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(field: &Field, file_doc: Option<&Value>, file_path: Option<&Path>) -> String {
    let from_env = field
        .env_keys
        .iter()
        .find(|key| env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false));
    if let Some(env_key) = from_env {
        return format!("env ({env_key})");
    }

    if file_doc.is_some_and(|doc| contains_path(doc, field.key_path)) {
        let file_path = file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({file_path})");
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.split_once('-') {
        Some((prefix, _)) => format!("{prefix}-***"),
        None => "<redacted>".to_string(),
    }
}

fn redact_secret(secret: &SecretString) -> String {
    if secret.expose_secret().trim().is_empty() {
        "<empty>".to_string()
    } else {
        "<redacted>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{contains_path, redact_token};

    #[test]
    fn tokens_keep_only_their_prefix() {
        assert_eq!(redact_token("xoxb-123-456"), "xoxb-***");
        assert_eq!(redact_token("   "), "<empty>");
        assert_eq!(redact_token("opaque"), "<redacted>");
    }

    #[test]
    fn dotted_paths_walk_nested_tables() {
        let doc: toml::Value = "[slack]\nchannel_id = \"C1\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "slack.channel_id"));
        assert!(!contains_path(&doc, "slack.bot_token"));
        assert!(!contains_path(&doc, "server.port"));
    }
}
