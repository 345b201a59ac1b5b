//! Modal template engine.
//!
//! The give-kudos modal is a static JSON document. Every open and every update
//! re-parses it from the pristine source and replays the interaction state onto
//! it, so repeated category toggles never accumulate description blocks.

use std::sync::Arc;

use elogie_core::catalog::{KudoCategory, FALLBACK_DESCRIPTION};
use serde_json::{json, Value};
use thiserror::Error;

pub const GIVE_KUDOS_VIEW_TEMPLATE: &str = include_str!("../templates/give_kudos_view.json");

pub const CATEGORY_BLOCK_ID: &str = "kudo_type";
pub const DESCRIPTION_BLOCK_ID: &str = "kudo_description";
pub const MESSAGE_BLOCK_ID: &str = "kudo_message";
pub const RECIPIENTS_BLOCK_ID: &str = "kudo_users";

pub const CUSTOM_NAME_LABEL: &str = "Nome do tipo de elogio";
pub const CUSTOM_NAME_PLACEHOLDER: &str = "Ex: Super Colaborador, Líder Inspirador...";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("error parsing view template: {0}")]
    Malformed(String),
    #[error("view template has no `view` object")]
    MissingView,
    #[error("view template `blocks` is not a list")]
    BlocksNotAList,
    #[error("view template has no `{CATEGORY_BLOCK_ID}` block")]
    MissingCategoryBlock,
}

/// Interaction state replayed onto the template by [`ModalTemplate::build_modal_update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModalUpdate<'a> {
    pub view_id: &'a str,
    /// Optimistic-concurrency token from the triggering payload, passed through untouched.
    pub hash: &'a str,
    pub selected_category: &'a str,
    /// Empty when the user has not typed anything.
    pub current_free_text: &'a str,
}

#[derive(Clone, Debug)]
pub struct ModalTemplate {
    source: Arc<str>,
}

impl Default for ModalTemplate {
    fn default() -> Self {
        Self::give_kudos()
    }
}

impl ModalTemplate {
    pub fn give_kudos() -> Self {
        Self::from_source(GIVE_KUDOS_VIEW_TEMPLATE)
    }

    pub fn from_source(source: impl Into<Arc<str>>) -> Self {
        Self { source: source.into() }
    }

    /// Body for `views.open`: the template with `trigger_id` injected at the top level.
    pub fn build_initial_modal(&self, trigger_id: &str) -> Result<Value, TemplateError> {
        let mut root = self.parse()?;
        let object = root
            .as_object_mut()
            .ok_or_else(|| TemplateError::Malformed("template root is not an object".to_owned()))?;
        object.insert("trigger_id".to_owned(), Value::String(trigger_id.to_owned()));
        Ok(root)
    }

    /// Body for `views.update`. The description slot is inserted right after the
    /// category selector, or overwritten in place when the template already has one.
    pub fn build_modal_update(&self, update: &ModalUpdate<'_>) -> Result<Value, TemplateError> {
        let mut root = self.parse()?;
        let mut view = root
            .get_mut("view")
            .filter(|view| view.is_object())
            .map(Value::take)
            .ok_or(TemplateError::MissingView)?;

        splice_description(&mut view, update)?;

        Ok(json!({
            "view_id": update.view_id,
            "hash": update.hash,
            "view": view,
        }))
    }

    /// Checks the structure `build_modal_update` relies on without producing a body.
    pub fn validate(&self) -> Result<usize, TemplateError> {
        let root = self.parse()?;
        let view = root.get("view").filter(|view| view.is_object()).ok_or(TemplateError::MissingView)?;
        let blocks =
            view.get("blocks").and_then(Value::as_array).ok_or(TemplateError::BlocksNotAList)?;
        if !blocks.iter().any(|block| block_id(block) == Some(CATEGORY_BLOCK_ID)) {
            return Err(TemplateError::MissingCategoryBlock);
        }
        Ok(blocks.len())
    }

    fn parse(&self) -> Result<Value, TemplateError> {
        serde_json::from_str(&self.source).map_err(|error| TemplateError::Malformed(error.to_string()))
    }
}

fn splice_description(view: &mut Value, update: &ModalUpdate<'_>) -> Result<(), TemplateError> {
    let blocks =
        view.get_mut("blocks").and_then(Value::as_array_mut).ok_or(TemplateError::BlocksNotAList)?;

    let mut category_index = None;
    let mut description_index = None;
    let mut message_index = None;
    for (index, block) in blocks.iter().enumerate() {
        match block_id(block) {
            Some(CATEGORY_BLOCK_ID) if category_index.is_none() => category_index = Some(index),
            Some(DESCRIPTION_BLOCK_ID) if description_index.is_none() => {
                description_index = Some(index)
            }
            Some(MESSAGE_BLOCK_ID) if message_index.is_none() => message_index = Some(index),
            _ => {}
        }
    }
    let category_index = category_index.ok_or(TemplateError::MissingCategoryBlock)?;

    // Never clears: an empty value leaves whatever the template carries.
    if let Some(index) = message_index.filter(|_| !update.current_free_text.is_empty()) {
        if let Some(element) = blocks[index].get_mut("element").and_then(Value::as_object_mut) {
            element.insert(
                "initial_value".to_owned(),
                Value::String(update.current_free_text.to_owned()),
            );
        }
    }

    let replacement = match KudoCategory::from_slug(update.selected_category) {
        KudoCategory::Custom => {
            let previous_name = description_index
                .and_then(|index| blocks[index].pointer("/element/initial_value"))
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(ToOwned::to_owned);
            custom_name_block(previous_name)
        }
        category => description_context_block(category.description().unwrap_or(FALLBACK_DESCRIPTION)),
    };

    match description_index {
        Some(index) => blocks[index] = replacement,
        None => blocks.insert(category_index + 1, replacement),
    }
    Ok(())
}

fn block_id(block: &Value) -> Option<&str> {
    block.get("block_id").and_then(Value::as_str)
}

fn custom_name_block(previous_name: Option<String>) -> Value {
    let mut element = json!({
        "type": "plain_text_input",
        "action_id": DESCRIPTION_BLOCK_ID,
        "placeholder": {
            "type": "plain_text",
            "text": CUSTOM_NAME_PLACEHOLDER,
        },
    });
    if let Some(name) = previous_name {
        element["initial_value"] = Value::String(name);
    }

    json!({
        "type": "input",
        "block_id": DESCRIPTION_BLOCK_ID,
        "label": {
            "type": "plain_text",
            "text": CUSTOM_NAME_LABEL,
            "emoji": true,
        },
        "element": element,
    })
}

fn description_context_block(description: &str) -> Value {
    json!({
        "type": "context",
        "block_id": DESCRIPTION_BLOCK_ID,
        "elements": [
            {
                "type": "mrkdwn",
                "text": format!("💡 _{description}_"),
            }
        ],
    })
}
