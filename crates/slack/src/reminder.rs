use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    blocks::reminder_message,
    client::{PostMessage, SlackApi, SlackApiError},
    interactions::EventContext,
};

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("failed to get channel members: {0}")]
    ListMembers(#[source] SlackApiError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReminderSummary {
    /// Humans eligible for a reminder.
    pub members: usize,
    /// Bots, deleted accounts and users whose profile could not be read.
    pub skipped: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Sends every human member of the kudos channel a reminder DM.
#[derive(Clone)]
pub struct ReminderService {
    slack: Arc<dyn SlackApi>,
    channel_id: String,
}

impl ReminderService {
    pub fn new(slack: Arc<dyn SlackApi>, channel_id: impl Into<String>) -> Self {
        Self { slack, channel_id: channel_id.into() }
    }

    pub async fn run(&self, ctx: &EventContext) -> Result<ReminderSummary, ReminderError> {
        info!(
            event_name = "reminder.run.started",
            correlation_id = %ctx.correlation_id,
            channel_id = %self.channel_id,
            "weekly reminder started"
        );

        let (recipients, skipped) = self.eligible_members(ctx).await?;
        let mut summary = ReminderSummary { members: recipients.len(), skipped, ..Default::default() };

        let template = reminder_message();
        for user_id in &recipients {
            let message = PostMessage::new(user_id.clone(), template.clone());
            match self.slack.post_message(&message).await {
                Ok(()) => summary.sent += 1,
                Err(error) => {
                    summary.failed += 1;
                    warn!(
                        event_name = "reminder.dm.failed",
                        correlation_id = %ctx.correlation_id,
                        user_id = %user_id,
                        error = %error,
                        "failed to send reminder DM"
                    );
                }
            }
        }

        info!(
            event_name = "reminder.run.completed",
            correlation_id = %ctx.correlation_id,
            channel_id = %self.channel_id,
            members = summary.members,
            skipped = summary.skipped,
            sent = summary.sent,
            failed = summary.failed,
            "weekly reminder completed"
        );
        Ok(summary)
    }

    async fn eligible_members(
        &self,
        ctx: &EventContext,
    ) -> Result<(Vec<String>, usize), ReminderError> {
        let mut eligible = Vec::new();
        let mut skipped = 0;
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .slack
                .list_channel_members(&self.channel_id, cursor.as_deref())
                .await
                .map_err(ReminderError::ListMembers)?;

            for user_id in page.members {
                match self.slack.user_info(&user_id).await {
                    Ok(user) if user.is_bot || user.deleted => skipped += 1,
                    Ok(_) => eligible.push(user_id),
                    Err(error) => {
                        skipped += 1;
                        warn!(
                            event_name = "reminder.member.lookup_failed",
                            correlation_id = %ctx.correlation_id,
                            user_id = %user_id,
                            error = %error,
                            "could not get user info; skipping member"
                        );
                    }
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok((eligible, skipped))
    }
}
