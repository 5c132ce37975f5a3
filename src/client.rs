//! # Client Entry Point
//!
//! [`RestClient`] is where callers start: it looks resources up by id and
//! hands them back already wrapped.

use crate::channel::{
    RestCategoryChannel, RestCategoryChannelAbstraction, RestGuildChannel, RestTextChannel,
    RestTextChannelAbstraction,
};
use crate::convert::IntoAbstraction;
use crate::error::AbstractionError;
use crate::user::RestUser;
use async_trait::async_trait;
use chat_service::serenity::model::channel::GuildChannel;
use chat_service::serenity::model::id::{ChannelId, UserId};
use chat_service::{is_category, is_text, Attached, ChatClient, Result};
use tracing::{debug, instrument};

#[async_trait]
pub trait RestClient: Send + Sync {
    /// A text channel or category by id. Unknown ids and channels of any
    /// other kind yield `None`.
    async fn fetch_channel(&self, channel_id: ChannelId) -> Result<Option<Box<dyn RestGuildChannel>>>;

    /// A text channel by id. Unknown ids and channels of another kind yield
    /// `None`.
    async fn fetch_text_channel(&self, channel_id: ChannelId) -> Result<Option<Box<dyn RestTextChannel>>>;

    /// A category by id. Unknown ids and channels of another kind yield
    /// `None`.
    async fn fetch_category_channel(&self, channel_id: ChannelId) -> Result<Option<Box<dyn RestCategoryChannel>>>;

    async fn fetch_user(&self, user_id: UserId) -> Result<Option<Box<dyn RestUser>>>;
}

#[derive(Debug, Clone)]
pub struct RestClientAbstraction {
    client: ChatClient,
}

impl RestClientAbstraction {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &ChatClient {
        &self.client
    }
}

impl TryFrom<Option<ChatClient>> for RestClientAbstraction {
    type Error = AbstractionError;

    fn try_from(client: Option<ChatClient>) -> std::result::Result<Self, Self::Error> {
        client
            .map(Self::new)
            .ok_or(AbstractionError::MissingResource { kind: "client" })
    }
}

impl IntoAbstraction for ChatClient {
    type Output = Box<dyn RestClient>;

    fn into_abstraction(self) -> Self::Output {
        Box::new(RestClientAbstraction::new(self))
    }
}

/// Categories become [`RestCategoryChannel`]s; every other guild channel is
/// wrapped as a text channel.
impl IntoAbstraction for Attached<GuildChannel> {
    type Output = Box<dyn RestGuildChannel>;

    fn into_abstraction(self) -> Self::Output {
        if is_category(&self) {
            Box::new(RestCategoryChannelAbstraction::new(self))
        } else {
            Box::new(RestTextChannelAbstraction::new(self))
        }
    }
}

#[async_trait]
impl RestClient for RestClientAbstraction {
    #[instrument(skip(self))]
    async fn fetch_channel(&self, channel_id: ChannelId) -> Result<Option<Box<dyn RestGuildChannel>>> {
        debug!("Forwarding channel fetch");
        let channel = self.client.channel(channel_id).await?;
        Ok(channel
            .filter(|channel| is_text(channel) || is_category(channel))
            .into_abstraction())
    }

    #[instrument(skip(self))]
    async fn fetch_text_channel(&self, channel_id: ChannelId) -> Result<Option<Box<dyn RestTextChannel>>> {
        debug!("Forwarding text channel fetch");
        let channel = self.client.text_channel(channel_id).await?;
        Ok(channel.map(|channel| -> Box<dyn RestTextChannel> { Box::new(RestTextChannelAbstraction::new(channel)) }))
    }

    async fn fetch_category_channel(&self, channel_id: ChannelId) -> Result<Option<Box<dyn RestCategoryChannel>>> {
        let category = self.client.category(channel_id).await?;
        Ok(category.map(|category| -> Box<dyn RestCategoryChannel> {
            Box::new(RestCategoryChannelAbstraction::new(category))
        }))
    }

    async fn fetch_user(&self, user_id: UserId) -> Result<Option<Box<dyn RestUser>>> {
        Ok(self.client.user(user_id).await?.into_abstraction())
    }
}
