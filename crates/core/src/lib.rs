//! Parley Core - turn model and shared configuration
//!
//! This crate holds the channel-agnostic data model for one conversational
//! turn and the pieces every other crate leans on:
//! - **Message model** (`message`) - tagged union of turn output (plain text,
//!   SSML, rich card, custom payload)
//! - **Turn model** (`request`, `response`) - the inbound event shape and the
//!   response envelope intent handlers produce
//! - **Configuration** (`config`) - TOML + env loading with validation
//! - **Message catalog** (`catalog`) - locale-aware prompt lookup, injected
//!   instead of ambient global state
//!
//! # Key Types
//!
//! - `Message` - one unit of turn output, serialized to the host wire schema
//! - `TurnRequest` / `TurnResponse` - one instance each per invocation, never
//!   shared across turns
//! - `Config` - immutable per-deployment settings

pub mod catalog;
pub mod config;
pub mod message;
pub mod request;
pub mod response;

pub use catalog::{MessageCatalog, StaticCatalog};
pub use config::{Config, ConfigError, LoadOptions, LogFormat, LoggingConfig};
pub use message::{Button, ImageCard, Message};
pub use request::{
    ActiveContext, BotMetadata, DialogAction, DialogActionType, Intent, IntentState, SessionState,
    Slot, SlotValue, TimeToLive, TurnRequest, ATTR_CALLBACK, ATTR_LEX_INTENT,
    ATTR_OPTIONS_PROVIDED,
};
pub use response::TurnResponse;
