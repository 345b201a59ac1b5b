use std::sync::Arc;

use elogie_core::errors::InterfaceError;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    client::{SlackApi, SlackApiError},
    interactions::EventContext,
    modal::{ModalTemplate, TemplateError},
};

/// Fields of the slash-command form this service reads; Slack sends more.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SlashCommandForm {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub trigger_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing trigger_id")]
    MissingTriggerId,
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Slack(#[from] SlackApiError),
}

impl From<CommandError> for InterfaceError {
    fn from(error: CommandError) -> Self {
        match error {
            CommandError::MissingTriggerId => InterfaceError::bad_request(error.to_string()),
            CommandError::Template(_) | CommandError::Slack(_) => {
                InterfaceError::internal(error.to_string())
            }
        }
    }
}

/// Answers `/elogie` by opening the give-kudos modal.
#[derive(Clone)]
pub struct SlashCommandHandler {
    slack: Arc<dyn SlackApi>,
    template: ModalTemplate,
}

impl SlashCommandHandler {
    pub fn new(slack: Arc<dyn SlackApi>, template: ModalTemplate) -> Self {
        Self { slack, template }
    }

    pub async fn handle(
        &self,
        form: &SlashCommandForm,
        ctx: &EventContext,
    ) -> Result<(), CommandError> {
        info!(
            event_name = "ingress.slack.command_received",
            correlation_id = %ctx.correlation_id,
            command = %form.command,
            user_id = %form.user_id,
            channel_id = %form.channel_id,
            "slash command received"
        );

        open_kudos_modal(self.slack.as_ref(), &self.template, &form.trigger_id, ctx).await
    }
}

/// Opens the modal for `trigger_id`. An `ok:false` from Slack is only logged:
/// trigger ids are single-use, so there is nothing left to retry with.
pub(crate) async fn open_kudos_modal(
    slack: &dyn SlackApi,
    template: &ModalTemplate,
    trigger_id: &str,
    ctx: &EventContext,
) -> Result<(), CommandError> {
    if trigger_id.is_empty() {
        warn!(
            event_name = "slack.modal.open_rejected",
            correlation_id = %ctx.correlation_id,
            "interaction has no trigger_id"
        );
        return Err(CommandError::MissingTriggerId);
    }

    let body = template.build_initial_modal(trigger_id)?;
    let envelope = slack.open_view(&body).await.map_err(|error| {
        warn!(
            event_name = "slack.modal.open_failed",
            correlation_id = %ctx.correlation_id,
            trigger_id,
            error = %error,
            "views.open failed"
        );
        error
    })?;

    if envelope.ok {
        info!(
            event_name = "slack.modal.opened",
            correlation_id = %ctx.correlation_id,
            trigger_id,
            "kudos modal opened"
        );
    } else {
        warn!(
            event_name = "slack.modal.open_not_ok",
            correlation_id = %ctx.correlation_id,
            trigger_id,
            slack_error = envelope.error.as_deref().unwrap_or("unknown_error"),
            "views.open answered ok:false"
        );
    }
    Ok(())
}
