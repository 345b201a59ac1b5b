//! Core building blocks shared by the elogie crates: configuration, the
//! caller-visible error taxonomy and the kudos category catalog.

pub mod catalog;
pub mod config;
pub mod errors;

pub use catalog::{KudoCategory, CUSTOM_CATEGORY, FALLBACK_DESCRIPTION};
pub use errors::InterfaceError;
