use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    blocks::KudosCard,
    client::{PostMessage, SlackApi, SlackApiError},
    interactions::EventContext,
};

const ALREADY_IN_CHANNEL: &str = "already_in_channel";

/// Splits a category option label such as `":zap: Resolvedor(a) de Problemas"`
/// into its glyph and its text. A label without a space after a non-empty
/// prefix yields an empty glyph.
pub fn parse_category_label(full_text: &str) -> (&str, &str) {
    match full_text.find(' ') {
        Some(index) if index > 0 => (&full_text[..index], &full_text[index + 1..]),
        _ => ("", full_text),
    }
}

/// Posts kudos to the configured channel.
#[derive(Clone)]
pub struct KudosPublisher {
    slack: Arc<dyn SlackApi>,
    channel_id: String,
}

impl KudosPublisher {
    pub fn new(slack: Arc<dyn SlackApi>, channel_id: impl Into<String>) -> Self {
        Self { slack, channel_id: channel_id.into() }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Invites every recipient to the channel, then posts the card. Invite
    /// failures never stop the post.
    pub async fn publish(&self, card: &KudosCard, ctx: &EventContext) -> Result<(), SlackApiError> {
        for user_id in &card.recipient_ids {
            self.invite(user_id, ctx).await;
        }

        let message = PostMessage::new(self.channel_id.clone(), card.render());
        self.slack.post_message(&message).await?;

        info!(
            event_name = "slack.kudos.posted",
            correlation_id = %ctx.correlation_id,
            channel_id = %self.channel_id,
            sender_id = %card.sender_id,
            recipients = card.recipient_ids.len(),
            "kudos posted"
        );
        Ok(())
    }

    async fn invite(&self, user_id: &str, ctx: &EventContext) {
        match self.slack.invite_to_channel(&self.channel_id, user_id).await {
            Ok(()) => info!(
                event_name = "slack.channel.invited",
                correlation_id = %ctx.correlation_id,
                channel_id = %self.channel_id,
                user_id,
                "recipient invited to kudos channel"
            ),
            Err(error) if error.api_error() == Some(ALREADY_IN_CHANNEL) => info!(
                event_name = "slack.channel.already_member",
                correlation_id = %ctx.correlation_id,
                channel_id = %self.channel_id,
                user_id,
                "recipient already in kudos channel"
            ),
            Err(error) => warn!(
                event_name = "slack.channel.invite_failed",
                correlation_id = %ctx.correlation_id,
                channel_id = %self.channel_id,
                user_id,
                error = %error,
                "could not invite recipient to kudos channel"
            ),
        }
    }
}
