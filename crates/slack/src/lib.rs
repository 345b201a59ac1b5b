//! Slack integration for the elogie kudos bot
//!
//! This crate holds everything that speaks Slack:
//! - **Block Kit** (`blocks`) - typed message blocks, the kudos card and the reminder DM
//! - **Modal** (`modal`) - the give-kudos view template and its per-interaction rewrite
//! - **Slash Commands** (`commands`) - `/elogie` opens the modal
//! - **Interactions** (`interactions`) - category changes, submissions and the reminder button
//! - **Kudos** (`kudos`) - invites recipients and posts the card to the kudos channel
//! - **Reminder** (`reminder`) - weekly DM sweep over the kudos channel
//! - **Signature** (`signature`) - `v0` request signing checks
//! - **Client** (`client`) - the Web API calls behind the `SlackApi` trait
//!
//! # Architecture
//!
//! ```text
//! HTTP entry point → SignatureVerifier → InteractionDispatcher → Handlers
//!                                                                  ↓
//!                                     ModalTemplate / KudosCard → SlackApi
//! ```
//!
//! # Key Types
//!
//! - `ModalTemplate` - re-parses the pristine view on every open and update
//! - `InteractionDispatcher` - routes payloads by `type`
//! - `KudosCard` - the seven-block kudos message
//! - `SlackApi` - trait implemented by `HttpSlackClient` and test fakes

pub mod blocks;
pub mod client;
pub mod commands;
pub mod interactions;
pub mod kudos;
pub mod modal;
pub mod reminder;
pub mod signature;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
