//! In-memory [`SlackApi`] that records every call. Enabled for this crate's
//! tests and, through the `testing` feature, for downstream test suites.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::client::{
    ApiEnvelope, ChannelMembersPage, PostMessage, SlackApi, SlackApiError, SlackUser,
};

#[derive(Clone, Debug, PartialEq)]
pub enum SlackCall {
    OpenView(Value),
    UpdateView(Value),
    PostMessage(PostMessage),
    Invite { channel_id: String, user_id: String },
    ListMembers { channel_id: String, cursor: Option<String> },
    UserInfo(String),
}

#[derive(Default)]
pub struct RecordingSlackApi {
    calls: Mutex<Vec<SlackCall>>,
    open_failure: Option<String>,
    open_not_ok: Option<String>,
    update_failure: Option<String>,
    post_failures: HashMap<String, String>,
    invite_failures: HashMap<String, String>,
    member_pages: Vec<ChannelMembersPage>,
    members_failure: Option<String>,
    users: HashMap<String, SlackUser>,
}

impl RecordingSlackApi {
    pub fn fail_open(mut self, error: &str) -> Self {
        self.open_failure = Some(error.to_owned());
        self
    }

    pub fn open_not_ok(mut self, error: &str) -> Self {
        self.open_not_ok = Some(error.to_owned());
        self
    }

    pub fn fail_update(mut self, error: &str) -> Self {
        self.update_failure = Some(error.to_owned());
        self
    }

    /// Posting to `channel` fails with `error`.
    pub fn fail_post_to(mut self, channel: &str, error: &str) -> Self {
        self.post_failures.insert(channel.to_owned(), error.to_owned());
        self
    }

    pub fn fail_invite(mut self, user_id: &str, error: &str) -> Self {
        self.invite_failures.insert(user_id.to_owned(), error.to_owned());
        self
    }

    /// Pages are served in order; each page's `next_cursor` selects the next one.
    pub fn with_member_pages(mut self, pages: Vec<ChannelMembersPage>) -> Self {
        self.member_pages = pages;
        self
    }

    pub fn fail_members(mut self, error: &str) -> Self {
        self.members_failure = Some(error.to_owned());
        self
    }

    pub fn with_user(mut self, user: SlackUser) -> Self {
        self.users.insert(user.id.clone(), user);
        self
    }

    pub async fn calls(&self) -> Vec<SlackCall> {
        self.calls.lock().await.clone()
    }

    pub async fn opened_views(&self) -> Vec<Value> {
        self.filter(|call| match call {
            SlackCall::OpenView(body) => Some(body.clone()),
            _ => None,
        })
        .await
    }

    pub async fn updated_views(&self) -> Vec<Value> {
        self.filter(|call| match call {
            SlackCall::UpdateView(body) => Some(body.clone()),
            _ => None,
        })
        .await
    }

    pub async fn posted_messages(&self) -> Vec<PostMessage> {
        self.filter(|call| match call {
            SlackCall::PostMessage(message) => Some(message.clone()),
            _ => None,
        })
        .await
    }

    pub async fn invites(&self) -> Vec<(String, String)> {
        self.filter(|call| match call {
            SlackCall::Invite { channel_id, user_id } => {
                Some((channel_id.clone(), user_id.clone()))
            }
            _ => None,
        })
        .await
    }

    async fn filter<T>(&self, select: impl Fn(&SlackCall) -> Option<T>) -> Vec<T> {
        self.calls.lock().await.iter().filter_map(select).collect()
    }

    async fn record(&self, call: SlackCall) {
        self.calls.lock().await.push(call);
    }
}

fn api_error(method: &'static str, error: &str) -> SlackApiError {
    SlackApiError::Api { method, error: error.to_owned() }
}

#[async_trait]
impl SlackApi for RecordingSlackApi {
    async fn open_view(&self, body: &Value) -> Result<ApiEnvelope, SlackApiError> {
        self.record(SlackCall::OpenView(body.clone())).await;
        if let Some(error) = &self.open_failure {
            return Err(api_error("views.open", error));
        }
        Ok(match &self.open_not_ok {
            Some(error) => ApiEnvelope { ok: false, error: Some(error.clone()) },
            None => ApiEnvelope { ok: true, error: None },
        })
    }

    async fn update_view(&self, body: &Value) -> Result<(), SlackApiError> {
        self.record(SlackCall::UpdateView(body.clone())).await;
        match &self.update_failure {
            Some(error) => Err(api_error("views.update", error)),
            None => Ok(()),
        }
    }

    async fn post_message(&self, message: &PostMessage) -> Result<(), SlackApiError> {
        self.record(SlackCall::PostMessage(message.clone())).await;
        match self.post_failures.get(&message.channel) {
            Some(error) => Err(api_error("chat.postMessage", error)),
            None => Ok(()),
        }
    }

    async fn invite_to_channel(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<(), SlackApiError> {
        self.record(SlackCall::Invite {
            channel_id: channel_id.to_owned(),
            user_id: user_id.to_owned(),
        })
        .await;
        match self.invite_failures.get(user_id) {
            Some(error) => Err(api_error("conversations.invite", error)),
            None => Ok(()),
        }
    }

    async fn list_channel_members(
        &self,
        channel_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChannelMembersPage, SlackApiError> {
        self.record(SlackCall::ListMembers {
            channel_id: channel_id.to_owned(),
            cursor: cursor.map(ToOwned::to_owned),
        })
        .await;
        if let Some(error) = &self.members_failure {
            return Err(api_error("conversations.members", error));
        }

        let index = match cursor {
            None => 0,
            Some(cursor) => self
                .member_pages
                .iter()
                .position(|page| page.next_cursor.as_deref() == Some(cursor))
                .map(|previous| previous + 1)
                .ok_or_else(|| api_error("conversations.members", "invalid_cursor"))?,
        };
        Ok(self.member_pages.get(index).cloned().unwrap_or_default())
    }

    async fn user_info(&self, user_id: &str) -> Result<SlackUser, SlackApiError> {
        self.record(SlackCall::UserInfo(user_id.to_owned())).await;
        self.users.get(user_id).cloned().ok_or_else(|| api_error("users.info", "user_not_found"))
    }
}
