//! # Attached Resources
//!
//! serenity models are plain data; their operations take an HTTP handle at
//! every call. An [`Attached`] pairs a model with the [`ChatClient`] it came
//! from so follow-up operations need no extra argument. It derefs to the
//! model, so every field reads straight through.
//!
//! Operations that change the resource (`edit`, `refresh`) take `&mut self`
//! and replace the model with the platform's answer.

use crate::client::{is_category, ChatClient};
use crate::error::{Result, ServiceError};
use crate::request::{
    CacheMode, ChannelEdit, FileUpload, InviteSettings, MemberEdit, MessageEdit, MessageQuery,
    OutgoingMessage,
};
use crate::service::ItemStream;
use crate::typing::TypingGuard;
use futures::{stream, StreamExt, TryStreamExt};
use serenity::model::channel::{Channel, GuildChannel, Message, MessageType};
use serenity::model::guild::Member;
use serenity::model::id::{MessageId, UserId, WebhookId};
use serenity::model::invite::RichInvite;
use serenity::model::webhook::Webhook;
use std::ops::{Deref, DerefMut};
use tracing::{debug, instrument};

/// A platform model together with the client it was fetched through.
#[derive(Debug, Clone)]
pub struct Attached<T> {
    model: T,
    client: ChatClient,
}

impl<T> Attached<T> {
    pub fn new(model: T, client: ChatClient) -> Self {
        Self { model, client }
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    pub fn model(&self) -> &T {
        &self.model
    }

    pub fn into_model(self) -> T {
        self.model
    }
}

impl<T> Deref for Attached<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.model
    }
}

impl<T> DerefMut for Attached<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.model
    }
}

// =============================================================================
// GUILD CHANNEL
// =============================================================================

impl Attached<GuildChannel> {
    /// Re-read the channel from the platform.
    #[instrument(skip(self), fields(channel_id = %self.model.id))]
    pub async fn refresh(&mut self) -> Result<()> {
        match self.client.service().channel(self.model.id).await? {
            Some(Channel::Guild(channel)) => {
                self.model = channel;
                Ok(())
            }
            _ => Err(ServiceError::Unknown {
                kind: "channel",
                id: self.model.id.get(),
            }),
        }
    }

    #[instrument(skip(self, edit), fields(channel_id = %self.model.id))]
    pub async fn edit(&mut self, edit: ChannelEdit) -> Result<()> {
        debug!(?edit, "Editing channel");
        self.model = self.client.service().edit_channel(self.model.id, edit).await?;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        self.client.service().delete_channel(self.model.id).await
    }

    /// The parent category, if the channel sits in one.
    pub async fn category(&self, mode: CacheMode) -> Result<Option<Attached<GuildChannel>>> {
        let Some(parent_id) = self.model.parent_id else {
            return Ok(None);
        };
        if let Some(cached) = self.client.service().cached_channel(parent_id) {
            return Ok(is_category(&cached).then(|| self.client.attach(cached)));
        }
        if !mode.allows_download() {
            return Ok(None);
        }
        self.client.category(parent_id).await
    }

    /// The parent category, always read from the platform.
    pub async fn fetch_category(&self) -> Result<Option<Attached<GuildChannel>>> {
        match self.model.parent_id {
            Some(parent_id) => self.client.category(parent_id).await,
            None => Ok(None),
        }
    }

    /// Replace the channel's permission overwrites with its category's.
    #[instrument(skip(self), fields(channel_id = %self.model.id))]
    pub async fn sync_permissions(&mut self) -> Result<()> {
        let category = self
            .category(CacheMode::AllowDownload)
            .await?
            .ok_or_else(|| ServiceError::InvalidArgument("channel has no category".to_string()))?;
        let edit = ChannelEdit {
            permission_overwrites: Some(category.permission_overwrites.clone()),
            ..ChannelEdit::default()
        };
        self.edit(edit).await
    }

    pub async fn message(&self, message_id: MessageId, mode: CacheMode) -> Result<Option<Attached<Message>>> {
        if let Some(cached) = self.client.service().cached_message(self.model.id, message_id) {
            return Ok(Some(self.client.attach(cached)));
        }
        if !mode.allows_download() {
            return Ok(None);
        }
        self.fetch_message(message_id).await
    }

    /// A message, always read from the platform.
    pub async fn fetch_message(&self, message_id: MessageId) -> Result<Option<Attached<Message>>> {
        let message = self.client.service().message(self.model.id, message_id).await?;
        Ok(message.map(|message| self.client.attach(message)))
    }

    /// One page of history. `CacheOnly` yields an empty page.
    pub async fn messages(&self, query: MessageQuery, mode: CacheMode) -> Result<Vec<Attached<Message>>> {
        if !mode.allows_download() {
            return Ok(Vec::new());
        }
        let messages = self.client.service().messages(self.model.id, query).await?;
        Ok(messages.into_iter().map(|message| self.client.attach(message)).collect())
    }

    /// The whole history, newest first. `CacheOnly` yields nothing.
    pub fn message_history(&self, mode: CacheMode) -> ItemStream<Attached<Message>> {
        if !mode.allows_download() {
            return stream::empty().boxed();
        }
        let client = self.client.clone();
        self.client
            .service()
            .message_history(self.model.id)
            .map_ok(move |message| client.attach(message))
            .boxed()
    }

    pub async fn pins(&self) -> Result<Vec<Attached<Message>>> {
        let messages = self.client.service().pins(self.model.id).await?;
        Ok(messages.into_iter().map(|message| self.client.attach(message)).collect())
    }

    pub async fn send_message(&self, message: OutgoingMessage) -> Result<Attached<Message>> {
        let sent = self.client.service().send_message(self.model.id, message).await?;
        Ok(self.client.attach(sent))
    }

    pub async fn send_file(&self, file: FileUpload, message: OutgoingMessage) -> Result<Attached<Message>> {
        self.send_message(message.with_file(file)).await
    }

    pub async fn delete_message(&self, message_id: MessageId) -> Result<()> {
        self.client.service().delete_message(self.model.id, message_id).await
    }

    pub async fn delete_messages(&self, message_ids: Vec<MessageId>) -> Result<()> {
        self.client.service().delete_messages(self.model.id, message_ids).await
    }

    pub async fn broadcast_typing(&self) -> Result<()> {
        self.client.service().broadcast_typing(self.model.id).await
    }

    /// Keep the typing indicator up until the guard is dropped.
    pub fn start_typing(&self) -> Result<TypingGuard> {
        TypingGuard::start(self.client.clone(), self.model.id)
    }

    pub async fn member(&self, user_id: UserId, mode: CacheMode) -> Result<Option<Attached<Member>>> {
        if let Some(cached) = self.client.service().cached_member(self.model.guild_id, user_id) {
            return Ok(Some(self.client.attach(cached)));
        }
        if !mode.allows_download() {
            return Ok(None);
        }
        self.fetch_member(user_id).await
    }

    /// A member of the channel's guild, always read from the platform.
    pub async fn fetch_member(&self, user_id: UserId) -> Result<Option<Attached<Member>>> {
        let member = self.client.service().member(self.model.guild_id, user_id).await?;
        Ok(member.map(|member| self.client.attach(member)))
    }

    /// Every member of the channel's guild. `CacheOnly` yields nothing.
    pub fn members(&self, mode: CacheMode) -> ItemStream<Attached<Member>> {
        if !mode.allows_download() {
            return stream::empty().boxed();
        }
        let client = self.client.clone();
        self.client
            .service()
            .members(self.model.guild_id)
            .map_ok(move |member| client.attach(member))
            .boxed()
    }

    /// A webhook of this channel. Webhooks of other channels yield `None`.
    pub async fn webhook(&self, webhook_id: WebhookId) -> Result<Option<Attached<Webhook>>> {
        let webhook = self.client.service().webhook(webhook_id).await?;
        Ok(webhook
            .filter(|webhook| webhook.channel_id == Some(self.model.id))
            .map(|webhook| self.client.attach(webhook)))
    }

    pub async fn webhooks(&self) -> Result<Vec<Attached<Webhook>>> {
        let webhooks = self.client.service().webhooks(self.model.id).await?;
        Ok(webhooks.into_iter().map(|webhook| self.client.attach(webhook)).collect())
    }

    pub async fn create_webhook(&self, name: &str, avatar: Option<FileUpload>) -> Result<Attached<Webhook>> {
        let webhook = self
            .client
            .service()
            .create_webhook(self.model.id, name.to_string(), avatar)
            .await?;
        Ok(self.client.attach(webhook))
    }

    pub async fn invites(&self) -> Result<Vec<Attached<RichInvite>>> {
        let invites = self.client.service().invites(self.model.id).await?;
        Ok(invites.into_iter().map(|invite| self.client.attach(invite)).collect())
    }

    pub async fn create_invite(&self, settings: InviteSettings) -> Result<Attached<RichInvite>> {
        let invite = self.client.service().create_invite(self.model.id, settings).await?;
        Ok(self.client.attach(invite))
    }
}

// =============================================================================
// MESSAGE
// =============================================================================

impl Attached<Message> {
    /// Whether a user or bot wrote the message, as opposed to the platform.
    pub fn is_user_message(&self) -> bool {
        matches!(self.model.kind, MessageType::Regular | MessageType::InlineReply)
    }

    pub async fn edit(&mut self, edit: MessageEdit) -> Result<()> {
        self.model = self
            .client
            .service()
            .edit_message(self.model.channel_id, self.model.id, edit)
            .await?;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        self.client
            .service()
            .delete_message(self.model.channel_id, self.model.id)
            .await
    }

    pub async fn pin(&self) -> Result<()> {
        self.client.service().pin(self.model.channel_id, self.model.id).await
    }

    pub async fn unpin(&self) -> Result<()> {
        self.client.service().unpin(self.model.channel_id, self.model.id).await
    }
}

// =============================================================================
// MEMBER
// =============================================================================

impl Attached<Member> {
    /// Re-read the membership from the platform.
    pub async fn refresh(&mut self) -> Result<()> {
        let member = self
            .client
            .service()
            .member(self.model.guild_id, self.model.user.id)
            .await?;
        match member {
            Some(member) => {
                self.model = member;
                Ok(())
            }
            None => Err(ServiceError::Unknown {
                kind: "member",
                id: self.model.user.id.get(),
            }),
        }
    }

    pub async fn edit(&mut self, edit: MemberEdit) -> Result<()> {
        self.model = self
            .client
            .service()
            .edit_member(self.model.guild_id, self.model.user.id, edit)
            .await?;
        Ok(())
    }
}

// =============================================================================
// WEBHOOK & INVITE
// =============================================================================

impl Attached<Webhook> {
    pub async fn delete(&self) -> Result<()> {
        self.client.service().delete_webhook(self.model.id).await
    }
}

impl Attached<RichInvite> {
    pub async fn delete(&self) -> Result<()> {
        self.client.service().delete_invite(self.model.code.clone()).await
    }
}
