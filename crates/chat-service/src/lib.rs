//! # chat-service
//!
//! A thin adapter over [serenity](https://docs.rs/serenity)'s HTTP client for
//! guild text channels. Models are serenity's own (`GuildChannel`, `Message`,
//! `Member`, ...); an [`Attached`] model carries the [`ChatClient`] it came
//! from, so follow-up operations need no extra handle.
//!
//! ## Architecture
//!
//! ```text
//! ChatClient ──► ChatService (seam trait)
//!     │              ├── SerenityService (serenity::http::Http)
//!     │              └── MockService (tests)
//!     └──► Attached<GuildChannel | Message | Member | Webhook | RichInvite>
//! ```
//!
//! Pagination is serenity's: [`ChatService::message_history`] and
//! [`ChatService::members`] wrap `messages_iter` and `members_iter` as
//! [`ItemStream`]s that fetch pages as they are consumed.
//!
//! ## Errors
//!
//! Every fallible operation returns [`Result`], whose error is
//! [`ServiceError`]. Lookups of a single resource return `Ok(None)` when the
//! platform does not know the id.

pub mod attached;
pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod request;
pub mod service;
pub mod typing;

pub use attached::Attached;
pub use client::{is_category, is_text, ChatClient};
pub use config::{ServiceConfig, MAX_TYPING_INTERVAL_MS, MIN_TYPING_INTERVAL_MS};
pub use error::{Result, ServiceError};
pub use request::{
    CacheMode, ChannelEdit, Direction, FileUpload, InviteSettings, MemberEdit, MessageEdit,
    MessageQuery, OutgoingMessage, DEFAULT_INVITE_MAX_AGE, DEFAULT_MESSAGE_LIMIT,
};
pub use service::{ChatService, ItemStream, SerenityService};
pub use typing::TypingGuard;

pub use serenity;
