//! # Service Seam
//!
//! [`ChatService`] is the one place the crate talks to the platform. Each
//! method is a single platform operation taking ids and request values and
//! returning serenity models. [`SerenityService`] forwards to serenity's HTTP
//! client; [`MockService`](crate::mock::MockService) scripts responses for
//! tests.
//!
//! Lookups of a single resource return `Ok(None)` when the platform answers
//! 404. Every other failure is returned as raised.

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::request::{
    ChannelEdit, Direction, FileUpload, InviteSettings, MemberEdit, MessageEdit, MessageQuery,
    OutgoingMessage,
};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use serenity::builder::{
    CreateAttachment, CreateInvite, CreateMessage, CreateWebhook, EditChannel, EditMember,
    EditMessage, GetMessages,
};
use serenity::http::Http;
use serenity::model::channel::{Channel, GuildChannel, Message};
use serenity::model::guild::Member;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId, WebhookId};
use serenity::model::invite::RichInvite;
use serenity::model::user::User;
use serenity::model::webhook::Webhook;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Lazily fetched, one-shot sequence of results. Dropping it stops fetching.
pub type ItemStream<T> = BoxStream<'static, Result<T>>;

/// Platform operations used by the client.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn channel(&self, channel_id: ChannelId) -> Result<Option<Channel>>;

    /// A guild channel already held locally.
    fn cached_channel(&self, _channel_id: ChannelId) -> Option<GuildChannel> {
        None
    }

    async fn edit_channel(&self, channel_id: ChannelId, edit: ChannelEdit) -> Result<GuildChannel>;

    async fn delete_channel(&self, channel_id: ChannelId) -> Result<()>;

    async fn broadcast_typing(&self, channel_id: ChannelId) -> Result<()>;

    async fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<Option<Message>>;

    /// A message already held locally.
    fn cached_message(&self, _channel_id: ChannelId, _message_id: MessageId) -> Option<Message> {
        None
    }

    async fn messages(&self, channel_id: ChannelId, query: MessageQuery) -> Result<Vec<Message>>;

    /// The channel's whole history, newest first, fetched as it is consumed.
    fn message_history(&self, channel_id: ChannelId) -> ItemStream<Message>;

    async fn pins(&self, channel_id: ChannelId) -> Result<Vec<Message>>;

    async fn send_message(&self, channel_id: ChannelId, message: OutgoingMessage) -> Result<Message>;

    async fn edit_message(&self, channel_id: ChannelId, message_id: MessageId, edit: MessageEdit) -> Result<Message>;

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()>;

    async fn delete_messages(&self, channel_id: ChannelId, message_ids: Vec<MessageId>) -> Result<()>;

    async fn pin(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()>;

    async fn unpin(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()>;

    async fn user(&self, user_id: UserId) -> Result<Option<User>>;

    async fn member(&self, guild_id: GuildId, user_id: UserId) -> Result<Option<Member>>;

    /// A guild member already held locally.
    fn cached_member(&self, _guild_id: GuildId, _user_id: UserId) -> Option<Member> {
        None
    }

    /// Every member of the guild, fetched as it is consumed.
    fn members(&self, guild_id: GuildId) -> ItemStream<Member>;

    async fn edit_member(&self, guild_id: GuildId, user_id: UserId, edit: MemberEdit) -> Result<Member>;

    async fn webhook(&self, webhook_id: WebhookId) -> Result<Option<Webhook>>;

    async fn webhooks(&self, channel_id: ChannelId) -> Result<Vec<Webhook>>;

    async fn create_webhook(&self, channel_id: ChannelId, name: String, avatar: Option<FileUpload>) -> Result<Webhook>;

    async fn delete_webhook(&self, webhook_id: WebhookId) -> Result<()>;

    async fn invites(&self, channel_id: ChannelId) -> Result<Vec<RichInvite>>;

    async fn create_invite(&self, channel_id: ChannelId, settings: InviteSettings) -> Result<RichInvite>;

    async fn delete_invite(&self, code: String) -> Result<()>;
}

// =============================================================================
// SERENITY
// =============================================================================

/// [`ChatService`] backed by serenity's HTTP client.
#[derive(Clone)]
pub struct SerenityService {
    http: Arc<Http>,
}

impl std::fmt::Debug for SerenityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerenityService").finish_non_exhaustive()
    }
}

impl SerenityService {
    pub fn new(token: &str) -> Self {
        Self::from_http(Arc::new(Http::new(token)))
    }

    /// Share an HTTP client the host already owns.
    pub fn from_http(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Build from the token named by `config`.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Ok(Self::new(&config.token()?))
    }

    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }
}

/// Log a failed request and lift it into a [`ServiceError`].
fn logged<T>(operation: &'static str, result: serenity::Result<T>) -> Result<T> {
    result.map_err(|e| {
        warn!(operation, error = %e, "Request failed");
        ServiceError::from(e)
    })
}

/// Like [`logged`], with a 404 answer turned into `None`.
fn found<T>(operation: &'static str, result: serenity::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(serenity::Error::Http(e)) if e.status_code().map(|status| status.as_u16()) == Some(404) => {
            debug!(operation, "Resource not found");
            Ok(None)
        }
        Err(e) => logged(operation, Err(e)),
    }
}

fn attachment(file: &FileUpload) -> CreateAttachment {
    CreateAttachment::bytes(file.data.clone(), file.wire_filename())
}

fn create_message(message: OutgoingMessage) -> CreateMessage {
    let mut builder = CreateMessage::new().content(message.content).tts(message.tts);
    if let Some(embed) = message.embed {
        builder = builder.embed(embed);
    }
    for file in &message.files {
        builder = builder.add_file(attachment(file));
    }
    builder
}

fn get_messages(query: MessageQuery) -> GetMessages {
    let builder = GetMessages::new().limit(query.limit);
    match query.anchor {
        Some((Direction::Before, id)) => builder.before(id),
        Some((Direction::After, id)) => builder.after(id),
        Some((Direction::Around, id)) => builder.around(id),
        None => builder,
    }
}

fn edit_channel(edit: ChannelEdit) -> EditChannel<'static> {
    let mut builder = EditChannel::new();
    if let Some(name) = edit.name {
        builder = builder.name(name);
    }
    if let Some(position) = edit.position {
        builder = builder.position(position);
    }
    if let Some(topic) = edit.topic {
        builder = builder.topic(topic);
    }
    if let Some(nsfw) = edit.nsfw {
        builder = builder.nsfw(nsfw);
    }
    if let Some(seconds) = edit.rate_limit_per_user {
        builder = builder.rate_limit_per_user(seconds);
    }
    if let Some(category) = edit.category {
        builder = builder.category(category);
    }
    if let Some(overwrites) = edit.permission_overwrites {
        builder = builder.permissions(overwrites);
    }
    builder
}

fn edit_message(edit: MessageEdit) -> EditMessage {
    let mut builder = EditMessage::new();
    if let Some(content) = edit.content {
        builder = builder.content(content);
    }
    if let Some(embed) = edit.embed {
        builder = builder.embed(embed);
    }
    builder
}

fn edit_member(edit: MemberEdit) -> EditMember<'static> {
    let mut builder = EditMember::new();
    if let Some(nickname) = edit.nickname {
        builder = builder.nickname(nickname);
    }
    if let Some(roles) = edit.roles {
        builder = builder.roles(roles);
    }
    builder
}

#[async_trait]
impl ChatService for SerenityService {
    #[instrument(skip(self))]
    async fn channel(&self, channel_id: ChannelId) -> Result<Option<Channel>> {
        debug!("Sending request");
        found("get channel", channel_id.to_channel(&*self.http).await)
    }

    #[instrument(skip(self))]
    async fn edit_channel(&self, channel_id: ChannelId, edit: ChannelEdit) -> Result<GuildChannel> {
        debug!("Sending request");
        logged("edit channel", channel_id.edit(&*self.http, edit_channel(edit)).await)
    }

    #[instrument(skip(self))]
    async fn delete_channel(&self, channel_id: ChannelId) -> Result<()> {
        debug!("Sending request");
        logged("delete channel", channel_id.delete(&*self.http).await).map(|_| ())
    }

    async fn broadcast_typing(&self, channel_id: ChannelId) -> Result<()> {
        logged("broadcast typing", channel_id.broadcast_typing(&*self.http).await)
    }

    #[instrument(skip(self))]
    async fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<Option<Message>> {
        debug!("Sending request");
        found("get message", channel_id.message(&*self.http, message_id).await)
    }

    #[instrument(skip(self))]
    async fn messages(&self, channel_id: ChannelId, query: MessageQuery) -> Result<Vec<Message>> {
        debug!("Sending request");
        logged("get messages", channel_id.messages(&*self.http, get_messages(query)).await)
    }

    fn message_history(&self, channel_id: ChannelId) -> ItemStream<Message> {
        channel_id
            .messages_iter(Arc::clone(&self.http))
            .map_err(ServiceError::from)
            .boxed()
    }

    #[instrument(skip(self))]
    async fn pins(&self, channel_id: ChannelId) -> Result<Vec<Message>> {
        debug!("Sending request");
        logged("get pins", channel_id.pins(&*self.http).await)
    }

    #[instrument(skip(self, message))]
    async fn send_message(&self, channel_id: ChannelId, message: OutgoingMessage) -> Result<Message> {
        debug!(files = message.files.len(), "Sending request");
        logged(
            "send message",
            channel_id.send_message(&*self.http, create_message(message)).await,
        )
    }

    #[instrument(skip(self, edit))]
    async fn edit_message(&self, channel_id: ChannelId, message_id: MessageId, edit: MessageEdit) -> Result<Message> {
        debug!("Sending request");
        logged(
            "edit message",
            channel_id.edit_message(&*self.http, message_id, edit_message(edit)).await,
        )
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        debug!("Sending request");
        logged("delete message", channel_id.delete_message(&*self.http, message_id).await)
    }

    #[instrument(skip(self, message_ids), fields(count = message_ids.len()))]
    async fn delete_messages(&self, channel_id: ChannelId, message_ids: Vec<MessageId>) -> Result<()> {
        debug!("Sending request");
        logged("delete messages", channel_id.delete_messages(&*self.http, message_ids).await)
    }

    #[instrument(skip(self))]
    async fn pin(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        debug!("Sending request");
        logged("pin message", channel_id.pin(&*self.http, message_id).await)
    }

    #[instrument(skip(self))]
    async fn unpin(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        debug!("Sending request");
        logged("unpin message", channel_id.unpin(&*self.http, message_id).await)
    }

    #[instrument(skip(self))]
    async fn user(&self, user_id: UserId) -> Result<Option<User>> {
        debug!("Sending request");
        found("get user", user_id.to_user(&*self.http).await)
    }

    #[instrument(skip(self))]
    async fn member(&self, guild_id: GuildId, user_id: UserId) -> Result<Option<Member>> {
        debug!("Sending request");
        found("get member", guild_id.member(&*self.http, user_id).await)
    }

    fn members(&self, guild_id: GuildId) -> ItemStream<Member> {
        guild_id
            .members_iter(Arc::clone(&self.http))
            .map_err(ServiceError::from)
            .boxed()
    }

    #[instrument(skip(self))]
    async fn edit_member(&self, guild_id: GuildId, user_id: UserId, edit: MemberEdit) -> Result<Member> {
        debug!("Sending request");
        logged(
            "edit member",
            guild_id.edit_member(&*self.http, user_id, edit_member(edit)).await,
        )
    }

    #[instrument(skip(self))]
    async fn webhook(&self, webhook_id: WebhookId) -> Result<Option<Webhook>> {
        debug!("Sending request");
        found("get webhook", webhook_id.to_webhook(&*self.http).await)
    }

    #[instrument(skip(self))]
    async fn webhooks(&self, channel_id: ChannelId) -> Result<Vec<Webhook>> {
        debug!("Sending request");
        logged("get webhooks", channel_id.webhooks(&*self.http).await)
    }

    #[instrument(skip(self, avatar))]
    async fn create_webhook(&self, channel_id: ChannelId, name: String, avatar: Option<FileUpload>) -> Result<Webhook> {
        debug!("Sending request");
        let mut builder = CreateWebhook::new(name);
        if let Some(avatar) = &avatar {
            builder = builder.avatar(&attachment(avatar));
        }
        logged("create webhook", channel_id.create_webhook(&*self.http, builder).await)
    }

    #[instrument(skip(self))]
    async fn delete_webhook(&self, webhook_id: WebhookId) -> Result<()> {
        debug!("Sending request");
        logged("delete webhook", self.http.delete_webhook(webhook_id, None).await)
    }

    #[instrument(skip(self))]
    async fn invites(&self, channel_id: ChannelId) -> Result<Vec<RichInvite>> {
        debug!("Sending request");
        logged("get invites", channel_id.invites(&*self.http).await)
    }

    #[instrument(skip(self))]
    async fn create_invite(&self, channel_id: ChannelId, settings: InviteSettings) -> Result<RichInvite> {
        debug!("Sending request");
        let builder = CreateInvite::new()
            .max_age(settings.max_age)
            .max_uses(settings.max_uses)
            .temporary(settings.temporary)
            .unique(settings.unique);
        logged("create invite", channel_id.create_invite(&*self.http, builder).await)
    }

    #[instrument(skip(self))]
    async fn delete_invite(&self, code: String) -> Result<()> {
        debug!("Sending request");
        logged("delete invite", self.http.delete_invite(&code, None).await).map(|_| ())
    }
}
