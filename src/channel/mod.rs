//! # Channel Contracts
//!
//! Channels are described by two families of traits.
//!
//! The **platform** family ([`Channel`], [`GuildChannel`], [`NestedChannel`],
//! [`MessageChannel`], [`TextChannel`], [`CategoryChannel`]) is what code
//! shared between REST and gateway-backed implementations programs against.
//! Lookups take a [`CacheMode`] and return platform-typed results.
//!
//! The **REST** family ([`RestGuildChannel`], [`RestMessageChannel`],
//! [`RestTextChannel`], [`RestCategoryChannel`]) extends it with operations
//! that always hit the network and hand back REST-typed results. Where both
//! families offer the same operation, the platform method is named `get_*` /
//! `send_*` and the REST method `fetch_*` / `post_*`:
//!
//! | Platform | REST |
//! |---|---|
//! | `get_message(id, mode)` | `fetch_message(id)` |
//! | `get_messages(limit, mode)` | `fetch_messages(limit)` |
//! | `get_message_history(mode)` | `fetch_message_history()` |
//! | `get_category(mode)` | `fetch_category()` |
//! | `get_user(id, mode)` | `fetch_user(id)` |
//! | `get_users(mode)` | `fetch_users()` |
//! | `send_message(..)` | `post_message(..)` |
//! | `create_webhook(..)` | `post_webhook(..)` |
//!
//! A `Box<dyn RestTextChannel>` can be passed wherever a `Box<dyn TextChannel>`
//! is expected; the conversion is an ordinary trait upcast.

mod category;
mod text;

pub use category::RestCategoryChannelAbstraction;
pub use text::RestTextChannelAbstraction;

use crate::entity::Entity;
use crate::invite::InviteMetadata;
use crate::message::{Message, RestMessage, RestUserMessage, UserMessage};
use crate::user::{GuildUser, RestGuildUser};
use crate::webhook::{RestWebhook, Webhook};
use async_trait::async_trait;
use chat_service::serenity::model::channel::PermissionOverwrite;
use chat_service::serenity::model::id::{ChannelId, GuildId, MessageId, UserId, WebhookId};
use chat_service::{
    CacheMode, ChannelEdit, Direction, FileUpload, InviteSettings, ItemStream, OutgoingMessage, Result,
    TypingGuard,
};
use std::path::Path;

// =============================================================================
// PLATFORM CONTRACTS
// =============================================================================

pub trait Channel: Entity<Id = ChannelId> + Send + Sync {
    fn name(&self) -> String;
}

/// A channel that belongs to a guild.
pub trait GuildChannel: Channel {
    fn guild_id(&self) -> GuildId;

    fn position(&self) -> u16;

    fn permission_overwrites(&self) -> Vec<PermissionOverwrite>;
}

/// A guild channel that may sit inside a category.
#[async_trait]
pub trait NestedChannel: GuildChannel {
    fn category_id(&self) -> Option<ChannelId>;

    /// The parent category. `CacheMode::CacheOnly` never downloads it.
    async fn get_category(&self, mode: CacheMode) -> Result<Option<Box<dyn CategoryChannel>>>;

    /// Replace this channel's permission overwrites with its category's.
    async fn sync_permissions(&mut self) -> Result<()>;
}

/// A channel that holds messages.
#[async_trait]
pub trait MessageChannel: Channel {
    async fn get_message(&self, message_id: MessageId, mode: CacheMode) -> Result<Option<Box<dyn Message>>>;

    /// The newest `limit` messages, newest first.
    async fn get_messages(&self, limit: u8, mode: CacheMode) -> Result<Vec<Box<dyn Message>>>;

    async fn get_messages_from(
        &self,
        from_message_id: MessageId,
        direction: Direction,
        limit: u8,
        mode: CacheMode,
    ) -> Result<Vec<Box<dyn Message>>>;

    async fn get_messages_from_message(
        &self,
        from_message: &dyn Message,
        direction: Direction,
        limit: u8,
        mode: CacheMode,
    ) -> Result<Vec<Box<dyn Message>>>;

    /// The whole history, newest first, fetched as it is consumed.
    fn get_message_history(&self, mode: CacheMode) -> ItemStream<Box<dyn Message>>;

    async fn get_pinned_messages(&self) -> Result<Vec<Box<dyn Message>>>;

    async fn send_message(&self, message: OutgoingMessage) -> Result<Box<dyn UserMessage>>;

    async fn send_file(&self, file: FileUpload, message: OutgoingMessage) -> Result<Box<dyn UserMessage>>;

    async fn send_file_from_path(
        &self,
        path: &Path,
        is_spoiler: bool,
        message: OutgoingMessage,
    ) -> Result<Box<dyn UserMessage>>;

    async fn delete_message(&self, message: &dyn Message) -> Result<()>;

    async fn delete_message_by_id(&self, message_id: MessageId) -> Result<()>;

    async fn trigger_typing(&self) -> Result<()>;

    /// Show the typing indicator until the returned state is dropped.
    ///
    /// Fails when called outside a Tokio runtime.
    fn enter_typing_state(&self) -> Result<TypingState>;
}

/// A guild text channel.
#[async_trait]
pub trait TextChannel: MessageChannel + NestedChannel {
    fn topic(&self) -> Option<String>;

    fn is_nsfw(&self) -> bool;

    /// Slow-mode interval in seconds; zero when disabled.
    fn slow_mode_interval(&self) -> u16;

    fn mention(&self) -> String;

    async fn modify(&mut self, edit: ChannelEdit) -> Result<()>;

    async fn delete_messages(&self, messages: &[&dyn Message]) -> Result<()>;

    async fn delete_messages_by_id(&self, message_ids: &[MessageId]) -> Result<()>;

    /// A member of the channel's guild, or `None` if the user is not one.
    async fn get_user(&self, user_id: UserId, mode: CacheMode) -> Result<Option<Box<dyn GuildUser>>>;

    /// Every member of the channel's guild. `CacheMode::CacheOnly` yields
    /// nothing.
    fn get_users(&self, mode: CacheMode) -> ItemStream<Box<dyn GuildUser>>;

    async fn create_webhook(&self, name: &str, avatar: Option<FileUpload>) -> Result<Box<dyn Webhook>>;

    async fn get_webhook(&self, webhook_id: WebhookId) -> Result<Option<Box<dyn Webhook>>>;

    async fn get_webhooks(&self) -> Result<Vec<Box<dyn Webhook>>>;

    async fn create_invite(&self, settings: InviteSettings) -> Result<Box<dyn InviteMetadata>>;

    async fn get_invites(&self) -> Result<Vec<Box<dyn InviteMetadata>>>;
}

pub trait CategoryChannel: GuildChannel {}

// =============================================================================
// REST CONTRACTS
// =============================================================================

/// A guild channel fetched over REST.
#[async_trait]
pub trait RestGuildChannel: GuildChannel {
    /// Re-read the channel's state from the platform.
    async fn update(&mut self) -> Result<()>;

    async fn delete(&self) -> Result<()>;
}

/// Message operations that always go to the network.
#[async_trait]
pub trait RestMessageChannel: MessageChannel {
    async fn fetch_message(&self, message_id: MessageId) -> Result<Option<Box<dyn RestMessage>>>;

    async fn fetch_messages(&self, limit: u8) -> Result<Vec<Box<dyn RestMessage>>>;

    async fn fetch_messages_from(
        &self,
        from_message_id: MessageId,
        direction: Direction,
        limit: u8,
    ) -> Result<Vec<Box<dyn RestMessage>>>;

    async fn fetch_messages_from_message(
        &self,
        from_message: &dyn Message,
        direction: Direction,
        limit: u8,
    ) -> Result<Vec<Box<dyn RestMessage>>>;

    fn fetch_message_history(&self) -> ItemStream<Box<dyn RestMessage>>;

    async fn fetch_pinned_messages(&self) -> Result<Vec<Box<dyn RestMessage>>>;

    async fn post_message(&self, message: OutgoingMessage) -> Result<Box<dyn RestUserMessage>>;

    async fn post_file(&self, file: FileUpload, message: OutgoingMessage) -> Result<Box<dyn RestUserMessage>>;

    async fn post_file_from_path(
        &self,
        path: &Path,
        is_spoiler: bool,
        message: OutgoingMessage,
    ) -> Result<Box<dyn RestUserMessage>>;
}

/// A guild text channel fetched over REST.
#[async_trait]
pub trait RestTextChannel: TextChannel + RestMessageChannel + RestGuildChannel {
    async fn fetch_category(&self) -> Result<Option<Box<dyn RestCategoryChannel>>>;

    /// A member of the channel's guild, or `None` if the user is not one.
    async fn fetch_user(&self, user_id: UserId) -> Result<Option<Box<dyn RestGuildUser>>>;

    fn fetch_users(&self) -> ItemStream<Box<dyn RestGuildUser>>;

    async fn post_webhook(&self, name: &str, avatar: Option<FileUpload>) -> Result<Box<dyn RestWebhook>>;

    async fn fetch_webhook(&self, webhook_id: WebhookId) -> Result<Option<Box<dyn RestWebhook>>>;

    async fn fetch_webhooks(&self) -> Result<Vec<Box<dyn RestWebhook>>>;
}

pub trait RestCategoryChannel: CategoryChannel + RestGuildChannel {}

// =============================================================================
// TYPING
// =============================================================================

/// Typing indicator held open on a channel. Dropping it stops the indicator.
#[derive(Debug)]
pub struct TypingState {
    guard: TypingGuard,
}

impl TypingState {
    pub(crate) fn new(guard: TypingGuard) -> Self {
        Self { guard }
    }

    pub fn channel_id(&self) -> ChannelId {
        self.guard.channel_id()
    }

    pub fn is_active(&self) -> bool {
        self.guard.is_active()
    }
}
