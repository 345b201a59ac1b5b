//! Interactivity payloads and their routing.
//!
//! Slack posts every modal interaction to one endpoint. The dispatcher picks a
//! handler by payload `type`; anything it has no handler for is acknowledged
//! untouched so new Slack event types never fail the request.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use elogie_core::{
    catalog::{KudoCategory, CUSTOM_CATEGORY_GLYPH},
    errors::InterfaceError,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    blocks::{KudosCard, OPEN_KUDOS_MODAL_ACTION_ID, REMINDER_ACTIONS_BLOCK_ID},
    client::{SlackApi, SlackApiError},
    commands::{open_kudos_modal, CommandError},
    kudos::{parse_category_label, KudosPublisher},
    modal::{
        ModalTemplate, ModalUpdate, TemplateError, CATEGORY_BLOCK_ID, DESCRIPTION_BLOCK_ID,
        MESSAGE_BLOCK_ID, RECIPIENTS_BLOCK_ID,
    },
};

pub const MAX_CUSTOM_NAME_CHARS: usize = 150;
pub const EMPTY_CUSTOM_NAME_ERROR: &str = "Por favor, preencha o nome do tipo de elogio";
pub const CUSTOM_NAME_TOO_LONG_ERROR: &str =
    "Nome do tipo de elogio muito longo (máximo 150 caracteres)";
pub const EMPTY_CUSTOM_MESSAGE_ERROR: &str =
    "A mensagem é obrigatória para elogios personalizados";
pub const REMINDER_OPEN_FAILED_ERROR: &str =
    "Não foi possível abrir o modal. Tente usar o comando /elogie";

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct InteractionPayload {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub user: InteractionUser,
    #[serde(default)]
    pub trigger_id: String,
    #[serde(default)]
    pub view: Option<ViewPayload>,
    #[serde(default)]
    pub actions: Vec<BlockAction>,
}

impl InteractionPayload {
    pub fn interaction_kind(&self) -> InteractionKind {
        match self.kind.as_str() {
            "block_actions" => InteractionKind::BlockActions,
            "view_submission" => InteractionKind::ViewSubmission,
            _ => InteractionKind::Unsupported,
        }
    }

    /// `view.state.values`, when Slack sent it.
    pub fn state_values(&self) -> Option<&StateValues> {
        self.view.as_ref()?.state.as_ref()?.values.as_ref()
    }

    fn state_value(&self, block_id: &str, action_id: &str) -> Option<&StateValue> {
        self.state_values()?.get(block_id)?.get(action_id)
    }
}

pub type StateValues = HashMap<String, HashMap<String, StateValue>>;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct InteractionUser {
    #[serde(default)]
    pub id: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ViewPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub state: Option<ViewState>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ViewState {
    #[serde(default)]
    pub values: Option<StateValues>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct StateValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
    #[serde(default)]
    pub selected_users: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SelectedOption {
    #[serde(default)]
    pub text: Option<OptionText>,
    #[serde(default)]
    pub value: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct OptionText {
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct BlockAction {
    #[serde(default)]
    pub action_id: String,
    #[serde(default)]
    pub block_id: String,
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
    #[serde(default)]
    pub value: Option<String>,
}

impl BlockAction {
    /// The newly selected category slug, for a non-empty `kudo_type` change.
    fn selected_category(&self) -> Option<&str> {
        if self.action_id != CATEGORY_BLOCK_ID {
            return None;
        }
        self.selected_option.as_ref().map(|option| option.value.as_str()).filter(|value| !value.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    BlockActions,
    ViewSubmission,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl EventContext {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self { correlation_id: correlation_id.into() }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Empty-body 200.
    Acknowledged,
    /// Empty-body 200 for payload types nobody handles.
    Ignored,
    /// 200 with Slack's inline form errors, keyed by block id.
    ValidationErrors(BTreeMap<String, String>),
}

impl InteractionOutcome {
    pub fn response_body(&self) -> Option<Value> {
        match self {
            Self::Acknowledged | Self::Ignored => None,
            Self::ValidationErrors(errors) => {
                Some(json!({ "response_action": "errors", "errors": errors }))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("Missing payload")]
    MissingPayload,
    #[error("Invalid Slack Interaction Callback: {0}")]
    InvalidPayload(String),
    #[error("Missing trigger_id")]
    MissingTriggerId,
    #[error("Invalid view state")]
    MissingState,
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Error updating modal: {0}")]
    UpdateModal(#[source] SlackApiError),
}

impl From<InteractionError> for InterfaceError {
    fn from(error: InteractionError) -> Self {
        match error {
            InteractionError::InvalidPayload(_) => {
                InterfaceError::bad_request("Invalid Slack Interaction Callback")
            }
            InteractionError::MissingPayload
            | InteractionError::MissingTriggerId
            | InteractionError::MissingState => InterfaceError::bad_request(error.to_string()),
            InteractionError::Template(_) | InteractionError::UpdateModal(_) => {
                InterfaceError::internal(error.to_string())
            }
        }
    }
}

/// Decodes the `payload` field of an interactivity form.
pub fn parse_interaction(raw_payload: &str) -> Result<InteractionPayload, InteractionError> {
    if raw_payload.is_empty() {
        return Err(InteractionError::MissingPayload);
    }
    serde_json::from_str(raw_payload).map_err(|error| InteractionError::InvalidPayload(error.to_string()))
}

#[async_trait]
pub trait InteractionHandler: Send + Sync {
    fn kind(&self) -> InteractionKind;
    async fn handle(
        &self,
        payload: &InteractionPayload,
        ctx: &EventContext,
    ) -> Result<InteractionOutcome, InteractionError>;
}

#[derive(Default)]
pub struct InteractionDispatcher {
    handlers: HashMap<InteractionKind, Arc<dyn InteractionHandler>>,
}

impl InteractionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: InteractionHandler + 'static,
    {
        self.handlers.insert(handler.kind(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        payload: &InteractionPayload,
        ctx: &EventContext,
    ) -> Result<InteractionOutcome, InteractionError> {
        info!(
            event_name = "ingress.slack.interaction_received",
            correlation_id = %ctx.correlation_id,
            interaction_type = %payload.kind,
            user_id = %payload.user.id,
            "interaction received"
        );

        let Some(handler) = self.handlers.get(&payload.interaction_kind()) else {
            info!(
                event_name = "ingress.slack.interaction_ignored",
                correlation_id = %ctx.correlation_id,
                interaction_type = %payload.kind,
                "no handler for interaction type"
            );
            return Ok(InteractionOutcome::Ignored);
        };

        handler.handle(payload, ctx).await
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// The dispatcher wired for the give-kudos flow.
pub fn kudos_dispatcher(
    slack: Arc<dyn SlackApi>,
    template: ModalTemplate,
    channel_id: impl Into<String>,
) -> InteractionDispatcher {
    let mut dispatcher = InteractionDispatcher::new();
    dispatcher.register(BlockActionsHandler::new(slack.clone(), template));
    dispatcher.register(ViewSubmissionHandler::new(KudosPublisher::new(slack, channel_id)));
    dispatcher
}

/// Free text to replay onto the modal after a category change. Custom
/// categories pass the current text through as-is, even when it is a
/// suggestion left by a previously selected category.
pub fn free_text_for_category<'a>(selected_category: &str, current_free_text: &'a str) -> &'a str {
    match KudoCategory::from_slug(selected_category) {
        KudoCategory::Custom => current_free_text,
        category if current_free_text.is_empty() => category.suggested_message(),
        _ => current_free_text,
    }
}

/// Inline errors for a custom-category submission; empty when it is valid.
pub fn validate_custom_submission(name: &str, message: &str) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    if name.is_empty() {
        errors.insert(DESCRIPTION_BLOCK_ID.to_owned(), EMPTY_CUSTOM_NAME_ERROR.to_owned());
    } else if name.chars().count() > MAX_CUSTOM_NAME_CHARS {
        errors.insert(DESCRIPTION_BLOCK_ID.to_owned(), CUSTOM_NAME_TOO_LONG_ERROR.to_owned());
    }
    if message.is_empty() {
        errors.insert(MESSAGE_BLOCK_ID.to_owned(), EMPTY_CUSTOM_MESSAGE_ERROR.to_owned());
    }
    errors
}

pub struct BlockActionsHandler {
    slack: Arc<dyn SlackApi>,
    template: ModalTemplate,
}

impl BlockActionsHandler {
    pub fn new(slack: Arc<dyn SlackApi>, template: ModalTemplate) -> Self {
        Self { slack, template }
    }

    async fn open_from_reminder(
        &self,
        payload: &InteractionPayload,
        ctx: &EventContext,
    ) -> Result<InteractionOutcome, InteractionError> {
        match open_kudos_modal(self.slack.as_ref(), &self.template, &payload.trigger_id, ctx).await
        {
            Ok(()) => Ok(InteractionOutcome::Acknowledged),
            Err(CommandError::MissingTriggerId) => Err(InteractionError::MissingTriggerId),
            Err(error) => {
                warn!(
                    event_name = "slack.reminder.open_failed",
                    correlation_id = %ctx.correlation_id,
                    user_id = %payload.user.id,
                    error = %error,
                    "could not open kudos modal from reminder"
                );
                Ok(InteractionOutcome::ValidationErrors(BTreeMap::from([(
                    REMINDER_ACTIONS_BLOCK_ID.to_owned(),
                    REMINDER_OPEN_FAILED_ERROR.to_owned(),
                )])))
            }
        }
    }
}

#[async_trait]
impl InteractionHandler for BlockActionsHandler {
    fn kind(&self) -> InteractionKind {
        InteractionKind::BlockActions
    }

    async fn handle(
        &self,
        payload: &InteractionPayload,
        ctx: &EventContext,
    ) -> Result<InteractionOutcome, InteractionError> {
        if payload.actions.iter().any(|action| action.action_id == OPEN_KUDOS_MODAL_ACTION_ID) {
            return self.open_from_reminder(payload, ctx).await;
        }

        let Some(selected_category) = payload.actions.iter().find_map(BlockAction::selected_category)
        else {
            debug!(
                event_name = "ingress.slack.block_actions_skipped",
                correlation_id = %ctx.correlation_id,
                actions = payload.actions.len(),
                "no category change in block actions"
            );
            return Ok(InteractionOutcome::Acknowledged);
        };

        let current_free_text = payload
            .state_value(MESSAGE_BLOCK_ID, MESSAGE_BLOCK_ID)
            .and_then(|state| state.value.as_deref())
            .unwrap_or("");
        let (view_id, hash) = payload
            .view
            .as_ref()
            .map(|view| (view.id.as_str(), view.hash.as_str()))
            .unwrap_or(("", ""));

        let body = self.template.build_modal_update(&ModalUpdate {
            view_id,
            hash,
            selected_category,
            current_free_text: free_text_for_category(selected_category, current_free_text),
        })?;

        self.slack.update_view(&body).await.map_err(|error| {
            warn!(
                event_name = "slack.modal.update_failed",
                correlation_id = %ctx.correlation_id,
                view_id,
                selected_category,
                error = %error,
                "views.update failed"
            );
            InteractionError::UpdateModal(error)
        })?;

        info!(
            event_name = "slack.modal.updated",
            correlation_id = %ctx.correlation_id,
            view_id,
            selected_category,
            "kudos modal updated for category change"
        );
        Ok(InteractionOutcome::Acknowledged)
    }
}

pub struct ViewSubmissionHandler {
    publisher: KudosPublisher,
}

impl ViewSubmissionHandler {
    pub fn new(publisher: KudosPublisher) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl InteractionHandler for ViewSubmissionHandler {
    fn kind(&self) -> InteractionKind {
        InteractionKind::ViewSubmission
    }

    async fn handle(
        &self,
        payload: &InteractionPayload,
        ctx: &EventContext,
    ) -> Result<InteractionOutcome, InteractionError> {
        if payload.state_values().is_none() {
            warn!(
                event_name = "ingress.slack.view_state_missing",
                correlation_id = %ctx.correlation_id,
                user_id = %payload.user.id,
                "view submission without state values"
            );
            return Err(InteractionError::MissingState);
        }

        let recipient_ids = payload
            .state_value(RECIPIENTS_BLOCK_ID, RECIPIENTS_BLOCK_ID)
            .and_then(|state| state.selected_users.clone())
            .unwrap_or_default();
        let message = payload
            .state_value(MESSAGE_BLOCK_ID, MESSAGE_BLOCK_ID)
            .and_then(|state| state.value.clone())
            .unwrap_or_default();
        let selected_option = payload
            .state_value(CATEGORY_BLOCK_ID, CATEGORY_BLOCK_ID)
            .and_then(|state| state.selected_option.as_ref());
        let slug = selected_option.map(|option| option.value.as_str()).unwrap_or("");

        let card = match KudoCategory::from_slug(slug) {
            KudoCategory::Custom => {
                let name = payload
                    .state_value(DESCRIPTION_BLOCK_ID, DESCRIPTION_BLOCK_ID)
                    .and_then(|state| state.value.as_deref())
                    .unwrap_or("")
                    .trim();
                let errors = validate_custom_submission(name, &message);
                if !errors.is_empty() {
                    info!(
                        event_name = "ingress.slack.submission_rejected",
                        correlation_id = %ctx.correlation_id,
                        user_id = %payload.user.id,
                        fields = ?errors.keys().collect::<Vec<_>>(),
                        "custom kudos submission failed validation"
                    );
                    return Ok(InteractionOutcome::ValidationErrors(errors));
                }
                KudosCard {
                    sender_id: payload.user.id.clone(),
                    recipient_ids,
                    glyph: CUSTOM_CATEGORY_GLYPH.to_owned(),
                    label: name.to_owned(),
                    message,
                }
            }
            category => {
                let message =
                    if message.is_empty() { category.suggested_message().to_owned() } else { message };
                let full_label = selected_option
                    .and_then(|option| option.text.as_ref())
                    .map(|text| text.text.as_str())
                    .unwrap_or("");
                let (glyph, label) = parse_category_label(full_label);
                KudosCard {
                    sender_id: payload.user.id.clone(),
                    recipient_ids,
                    glyph: glyph.to_owned(),
                    label: label.to_owned(),
                    message,
                }
            }
        };

        if let Err(error) = self.publisher.publish(&card, ctx).await {
            warn!(
                event_name = "slack.kudos.post_failed",
                correlation_id = %ctx.correlation_id,
                channel_id = %self.publisher.channel_id(),
                sender_id = %card.sender_id,
                error = %error,
                "could not post kudos; submission still acknowledged"
            );
        }
        Ok(InteractionOutcome::Acknowledged)
    }
}
