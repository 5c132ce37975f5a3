//! # Chat Abstractions
//!
//! > **Trait contracts over the `chat_service` client.**
//!
//! This crate lets code program against channels, messages, users, webhooks
//! and invites without naming the client library's concrete types. Each
//! concrete resource is moved into a small wrapper that implements the
//! matching contract by forwarding every call to it.
//!
//! ## 🏗️ How It Fits Together
//!
//! ```text
//! caller ──► dyn TextChannel ──► RestTextChannelAbstraction ──► Attached<GuildChannel> ──► ChatService
//!    ▲                                                                   │
//!    └──────────────────── into_abstraction() ◄── concrete result ◄──────┘
//! ```
//!
//! - **Contracts** ([`channel`], [`message`], [`user`], [`webhook`],
//!   [`invite`], [`client`]): traits typed only in terms of other contracts,
//!   serenity ids and plain values.
//! - **Wrappers**: one struct per concrete type, owning it. They hold no state
//!   of their own, so every accessor reads through to the wrapped resource.
//! - **Conversions** ([`convert`]): one [`IntoAbstraction`] impl per concrete
//!   type, plus element-wise impls for `Option`, `Vec` and item streams.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use chat_abstractions::{CacheMode, IntoAbstraction, Message, MessageChannel, RestClient};
//! use chat_service::mock::{fixtures, MockService};
//! use chat_service::serenity::model::channel::Channel;
//! use chat_service::serenity::model::id::{ChannelId, MessageId};
//! use chat_service::ChatClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> chat_abstractions::Result<()> {
//!     let service = Arc::new(MockService::new());
//!     service.expect_channel().return_ok(Some(Channel::Guild(fixtures::text_channel(42, 1))));
//!     service.expect_message().return_ok(Some(fixtures::message(7, 42, "hello")));
//!
//!     let client = ChatClient::new(service.clone()).into_abstraction();
//!     let channel = client.fetch_text_channel(ChannelId::new(42)).await?;
//!     let channel = channel.expect("channel exists");
//!
//!     let message = channel.get_message(MessageId::new(7), CacheMode::AllowDownload).await?;
//!     assert_eq!(message.map(|m| m.content()), Some("hello".to_string()));
//!     Ok(())
//! }
//! ```
//!
//! ## ⚠️ Errors
//!
//! Failures raised by the client come back as the same [`ServiceError`], never
//! translated. The only error this crate raises itself is
//! [`AbstractionError::MissingResource`], when a wrapper is built with
//! `TryFrom<Option<_>>` from `None`.

pub mod channel;
pub mod client;
pub mod convert;
pub mod entity;
pub mod error;
pub mod invite;
pub mod message;
pub mod telemetry;
pub mod user;
pub mod webhook;

pub use channel::{
    CategoryChannel, Channel, GuildChannel, MessageChannel, NestedChannel, RestCategoryChannel,
    RestCategoryChannelAbstraction, RestGuildChannel, RestMessageChannel, RestTextChannel,
    RestTextChannelAbstraction, TextChannel, TypingState,
};
pub use client::{RestClient, RestClientAbstraction};
pub use convert::{abstract_stream, IntoAbstraction};
pub use entity::Entity;
pub use error::{AbstractionError, Result, ServiceError};
pub use invite::{InviteMetadata, RestInviteMetadataAbstraction};
pub use message::{
    Message, RestMessage, RestSystemMessageAbstraction, RestUserMessage, RestUserMessageAbstraction,
    UserMessage,
};
pub use user::{GuildUser, RestGuildUser, RestGuildUserAbstraction, RestUser, RestUserAbstraction, User};
pub use webhook::{RestWebhook, RestWebhookAbstraction, Webhook};

pub use chat_service::{
    CacheMode, ChannelEdit, Direction, FileUpload, InviteSettings, ItemStream, MemberEdit, MessageEdit,
    MessageQuery, OutgoingMessage,
};
