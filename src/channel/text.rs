use super::{
    CategoryChannel, Channel, GuildChannel, MessageChannel, NestedChannel, RestCategoryChannel,
    RestCategoryChannelAbstraction, RestGuildChannel, RestMessageChannel, RestTextChannel,
    TextChannel, TypingState,
};
use crate::convert::{abstract_stream, widen_stream, IntoAbstraction};
use crate::entity::Entity;
use crate::error::AbstractionError;
use crate::invite::InviteMetadata;
use crate::message::{Message, RestMessage, RestUserMessage, RestUserMessageAbstraction, UserMessage};
use crate::user::{GuildUser, RestGuildUser};
use crate::webhook::{RestWebhook, Webhook};
use async_trait::async_trait;
use chat_service::serenity::model::channel::{GuildChannel as PlatformChannel, PermissionOverwrite};
use chat_service::serenity::model::id::{ChannelId, GuildId, MessageId, UserId, WebhookId};
use chat_service::serenity::model::mention::Mention;
use chat_service::{
    Attached, CacheMode, ChannelEdit, Direction, FileUpload, InviteSettings, ItemStream, MessageQuery,
    OutgoingMessage, Result,
};
use std::path::Path;
use tracing::{debug, instrument};

fn as_message(message: Box<dyn RestMessage>) -> Box<dyn Message> {
    message
}

fn as_guild_user(user: Box<dyn RestGuildUser>) -> Box<dyn GuildUser> {
    user
}

fn query(from_message_id: MessageId, direction: Direction, limit: u8) -> MessageQuery {
    MessageQuery::from(from_message_id, direction, limit)
}

/// Text channel backed by an `Attached<GuildChannel>`.
///
/// Every operation forwards to the wrapped channel; results are converted on
/// the way out and errors are returned as raised.
#[derive(Debug)]
pub struct RestTextChannelAbstraction {
    channel: Attached<PlatformChannel>,
}

impl RestTextChannelAbstraction {
    pub fn new(channel: Attached<PlatformChannel>) -> Self {
        Self { channel }
    }

    pub fn inner(&self) -> &Attached<PlatformChannel> {
        &self.channel
    }

    async fn sent(&self, message: OutgoingMessage) -> Result<RestUserMessageAbstraction> {
        let sent = self.channel.send_message(message).await?;
        Ok(RestUserMessageAbstraction::new(sent))
    }
}

impl TryFrom<Option<Attached<PlatformChannel>>> for RestTextChannelAbstraction {
    type Error = AbstractionError;

    fn try_from(channel: Option<Attached<PlatformChannel>>) -> std::result::Result<Self, Self::Error> {
        channel
            .map(Self::new)
            .ok_or(AbstractionError::MissingResource { kind: "text channel" })
    }
}

impl Entity for RestTextChannelAbstraction {
    type Id = ChannelId;

    fn id(&self) -> ChannelId {
        self.channel.id
    }
}

impl Channel for RestTextChannelAbstraction {
    fn name(&self) -> String {
        self.channel.name.clone()
    }
}

impl GuildChannel for RestTextChannelAbstraction {
    fn guild_id(&self) -> GuildId {
        self.channel.guild_id
    }

    fn position(&self) -> u16 {
        self.channel.position
    }

    fn permission_overwrites(&self) -> Vec<PermissionOverwrite> {
        self.channel.permission_overwrites.clone()
    }
}

#[async_trait]
impl NestedChannel for RestTextChannelAbstraction {
    fn category_id(&self) -> Option<ChannelId> {
        self.channel.parent_id
    }

    async fn get_category(&self, mode: CacheMode) -> Result<Option<Box<dyn CategoryChannel>>> {
        let category = self.channel.category(mode).await?;
        Ok(category.map(|category| -> Box<dyn CategoryChannel> {
            Box::new(RestCategoryChannelAbstraction::new(category))
        }))
    }

    #[instrument(skip(self), fields(channel_id = %self.channel.id))]
    async fn sync_permissions(&mut self) -> Result<()> {
        debug!("Forwarding permission sync");
        self.channel.sync_permissions().await
    }
}

#[async_trait]
impl MessageChannel for RestTextChannelAbstraction {
    #[instrument(skip(self))]
    async fn get_message(&self, message_id: MessageId, mode: CacheMode) -> Result<Option<Box<dyn Message>>> {
        debug!(channel_id = %self.channel.id, "Forwarding message lookup");
        let message = self.channel.message(message_id, mode).await?;
        Ok(message.into_abstraction().map(as_message))
    }

    async fn get_messages(&self, limit: u8, mode: CacheMode) -> Result<Vec<Box<dyn Message>>> {
        let messages = self.channel.messages(MessageQuery::latest(limit), mode).await?;
        Ok(messages.into_abstraction().into_iter().map(as_message).collect())
    }

    async fn get_messages_from(
        &self,
        from_message_id: MessageId,
        direction: Direction,
        limit: u8,
        mode: CacheMode,
    ) -> Result<Vec<Box<dyn Message>>> {
        let messages = self
            .channel
            .messages(query(from_message_id, direction, limit), mode)
            .await?;
        Ok(messages.into_abstraction().into_iter().map(as_message).collect())
    }

    async fn get_messages_from_message(
        &self,
        from_message: &dyn Message,
        direction: Direction,
        limit: u8,
        mode: CacheMode,
    ) -> Result<Vec<Box<dyn Message>>> {
        self.get_messages_from(from_message.id(), direction, limit, mode).await
    }

    fn get_message_history(&self, mode: CacheMode) -> ItemStream<Box<dyn Message>> {
        widen_stream(abstract_stream(self.channel.message_history(mode)), as_message)
    }

    async fn get_pinned_messages(&self) -> Result<Vec<Box<dyn Message>>> {
        let messages = self.channel.pins().await?;
        Ok(messages.into_abstraction().into_iter().map(as_message).collect())
    }

    #[instrument(skip_all)]
    async fn send_message(&self, message: OutgoingMessage) -> Result<Box<dyn UserMessage>> {
        debug!(channel_id = %self.channel.id, "Forwarding send");
        Ok(Box::new(self.sent(message).await?))
    }

    async fn send_file(&self, file: FileUpload, message: OutgoingMessage) -> Result<Box<dyn UserMessage>> {
        Ok(Box::new(self.sent(message.with_file(file)).await?))
    }

    async fn send_file_from_path(
        &self,
        path: &Path,
        is_spoiler: bool,
        message: OutgoingMessage,
    ) -> Result<Box<dyn UserMessage>> {
        let file = FileUpload::from_path(path, is_spoiler).await?;
        self.send_file(file, message).await
    }

    async fn delete_message(&self, message: &dyn Message) -> Result<()> {
        self.channel.delete_message(message.id()).await
    }

    async fn delete_message_by_id(&self, message_id: MessageId) -> Result<()> {
        self.channel.delete_message(message_id).await
    }

    async fn trigger_typing(&self) -> Result<()> {
        self.channel.broadcast_typing().await
    }

    fn enter_typing_state(&self) -> Result<TypingState> {
        Ok(TypingState::new(self.channel.start_typing()?))
    }
}

#[async_trait]
impl TextChannel for RestTextChannelAbstraction {
    fn topic(&self) -> Option<String> {
        self.channel.topic.clone()
    }

    fn is_nsfw(&self) -> bool {
        self.channel.nsfw
    }

    fn slow_mode_interval(&self) -> u16 {
        self.channel.rate_limit_per_user.unwrap_or(0)
    }

    fn mention(&self) -> String {
        Mention::from(self.channel.id).to_string()
    }

    #[instrument(skip_all)]
    async fn modify(&mut self, edit: ChannelEdit) -> Result<()> {
        debug!(channel_id = %self.channel.id, ?edit, "Forwarding modify");
        self.channel.edit(edit).await
    }

    async fn delete_messages(&self, messages: &[&dyn Message]) -> Result<()> {
        let message_ids = messages.iter().map(|message| message.id()).collect();
        self.channel.delete_messages(message_ids).await
    }

    async fn delete_messages_by_id(&self, message_ids: &[MessageId]) -> Result<()> {
        self.channel.delete_messages(message_ids.to_vec()).await
    }

    async fn get_user(&self, user_id: UserId, mode: CacheMode) -> Result<Option<Box<dyn GuildUser>>> {
        let member = self.channel.member(user_id, mode).await?;
        Ok(member.into_abstraction().map(as_guild_user))
    }

    fn get_users(&self, mode: CacheMode) -> ItemStream<Box<dyn GuildUser>> {
        widen_stream(abstract_stream(self.channel.members(mode)), as_guild_user)
    }

    async fn create_webhook(&self, name: &str, avatar: Option<FileUpload>) -> Result<Box<dyn Webhook>> {
        let webhook: Box<dyn Webhook> = self.post_webhook(name, avatar).await?;
        Ok(webhook)
    }

    async fn get_webhook(&self, webhook_id: WebhookId) -> Result<Option<Box<dyn Webhook>>> {
        let webhook = self.fetch_webhook(webhook_id).await?;
        Ok(webhook.map(|webhook| -> Box<dyn Webhook> { webhook }))
    }

    async fn get_webhooks(&self) -> Result<Vec<Box<dyn Webhook>>> {
        let webhooks = self.fetch_webhooks().await?;
        Ok(webhooks
            .into_iter()
            .map(|webhook| -> Box<dyn Webhook> { webhook })
            .collect())
    }

    async fn create_invite(&self, settings: InviteSettings) -> Result<Box<dyn InviteMetadata>> {
        Ok(self.channel.create_invite(settings).await?.into_abstraction())
    }

    async fn get_invites(&self) -> Result<Vec<Box<dyn InviteMetadata>>> {
        Ok(self.channel.invites().await?.into_abstraction())
    }
}

#[async_trait]
impl RestGuildChannel for RestTextChannelAbstraction {
    async fn update(&mut self) -> Result<()> {
        self.channel.refresh().await
    }

    async fn delete(&self) -> Result<()> {
        self.channel.delete().await
    }
}

#[async_trait]
impl RestMessageChannel for RestTextChannelAbstraction {
    #[instrument(skip(self))]
    async fn fetch_message(&self, message_id: MessageId) -> Result<Option<Box<dyn RestMessage>>> {
        debug!(channel_id = %self.channel.id, "Forwarding message fetch");
        Ok(self.channel.fetch_message(message_id).await?.into_abstraction())
    }

    async fn fetch_messages(&self, limit: u8) -> Result<Vec<Box<dyn RestMessage>>> {
        let messages = self
            .channel
            .messages(MessageQuery::latest(limit), CacheMode::AllowDownload)
            .await?;
        Ok(messages.into_abstraction())
    }

    async fn fetch_messages_from(
        &self,
        from_message_id: MessageId,
        direction: Direction,
        limit: u8,
    ) -> Result<Vec<Box<dyn RestMessage>>> {
        let messages = self
            .channel
            .messages(query(from_message_id, direction, limit), CacheMode::AllowDownload)
            .await?;
        Ok(messages.into_abstraction())
    }

    async fn fetch_messages_from_message(
        &self,
        from_message: &dyn Message,
        direction: Direction,
        limit: u8,
    ) -> Result<Vec<Box<dyn RestMessage>>> {
        self.fetch_messages_from(from_message.id(), direction, limit).await
    }

    fn fetch_message_history(&self) -> ItemStream<Box<dyn RestMessage>> {
        abstract_stream(self.channel.message_history(CacheMode::AllowDownload))
    }

    async fn fetch_pinned_messages(&self) -> Result<Vec<Box<dyn RestMessage>>> {
        Ok(self.channel.pins().await?.into_abstraction())
    }

    #[instrument(skip_all)]
    async fn post_message(&self, message: OutgoingMessage) -> Result<Box<dyn RestUserMessage>> {
        debug!(channel_id = %self.channel.id, "Forwarding post");
        Ok(Box::new(self.sent(message).await?))
    }

    async fn post_file(&self, file: FileUpload, message: OutgoingMessage) -> Result<Box<dyn RestUserMessage>> {
        Ok(Box::new(self.sent(message.with_file(file)).await?))
    }

    async fn post_file_from_path(
        &self,
        path: &Path,
        is_spoiler: bool,
        message: OutgoingMessage,
    ) -> Result<Box<dyn RestUserMessage>> {
        let file = FileUpload::from_path(path, is_spoiler).await?;
        self.post_file(file, message).await
    }
}

#[async_trait]
impl RestTextChannel for RestTextChannelAbstraction {
    async fn fetch_category(&self) -> Result<Option<Box<dyn RestCategoryChannel>>> {
        let category = self.channel.fetch_category().await?;
        Ok(category.map(|category| -> Box<dyn RestCategoryChannel> {
            Box::new(RestCategoryChannelAbstraction::new(category))
        }))
    }

    async fn fetch_user(&self, user_id: UserId) -> Result<Option<Box<dyn RestGuildUser>>> {
        Ok(self.channel.fetch_member(user_id).await?.into_abstraction())
    }

    fn fetch_users(&self) -> ItemStream<Box<dyn RestGuildUser>> {
        abstract_stream(self.channel.members(CacheMode::AllowDownload))
    }

    async fn post_webhook(&self, name: &str, avatar: Option<FileUpload>) -> Result<Box<dyn RestWebhook>> {
        Ok(self.channel.create_webhook(name, avatar).await?.into_abstraction())
    }

    async fn fetch_webhook(&self, webhook_id: WebhookId) -> Result<Option<Box<dyn RestWebhook>>> {
        Ok(self.channel.webhook(webhook_id).await?.into_abstraction())
    }

    async fn fetch_webhooks(&self) -> Result<Vec<Box<dyn RestWebhook>>> {
        Ok(self.channel.webhooks().await?.into_abstraction())
    }
}
