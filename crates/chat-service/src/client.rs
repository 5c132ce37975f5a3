//! # Chat Client
//!
//! [`ChatClient`] is the handle every resource carries. It owns the service
//! and the configuration, and it is cheap to clone (one `Arc` plus a small
//! config), so each [`Attached`] resource holds its own copy.

use crate::attached::Attached;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::service::{ChatService, SerenityService};
use serenity::model::channel::{Channel, ChannelType, GuildChannel};
use serenity::model::id::{ChannelId, UserId};
use serenity::model::user::User;
use std::sync::Arc;
use tracing::instrument;

/// Entry point of the client.
#[derive(Clone)]
pub struct ChatClient {
    service: Arc<dyn ChatService>,
    config: ServiceConfig,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Whether `channel` holds text messages.
pub fn is_text(channel: &GuildChannel) -> bool {
    matches!(channel.kind, ChannelType::Text | ChannelType::News)
}

pub fn is_category(channel: &GuildChannel) -> bool {
    channel.kind == ChannelType::Category
}

impl ChatClient {
    pub fn new(service: Arc<dyn ChatService>) -> Self {
        Self::with_config(service, ServiceConfig::default())
    }

    pub fn with_config(service: Arc<dyn ChatService>, config: ServiceConfig) -> Self {
        Self { service, config }
    }

    /// Client talking to the platform through serenity, authenticated with
    /// the token named by `config`.
    pub fn connect(config: ServiceConfig) -> Result<Self> {
        let service = SerenityService::from_config(&config)?;
        Ok(Self::with_config(Arc::new(service), config))
    }

    pub fn service(&self) -> &dyn ChatService {
        self.service.as_ref()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Pair `model` with this client.
    pub fn attach<T>(&self, model: T) -> Attached<T> {
        Attached::new(model, self.clone())
    }

    /// Any guild channel by id. Unknown ids and private channels yield `None`.
    #[instrument(skip(self))]
    pub async fn channel(&self, channel_id: ChannelId) -> Result<Option<Attached<GuildChannel>>> {
        let channel = self.service.channel(channel_id).await?;
        Ok(match channel {
            Some(Channel::Guild(channel)) => Some(self.attach(channel)),
            _ => None,
        })
    }

    /// A text channel by id. Unknown ids and channels of another kind yield
    /// `None`.
    pub async fn text_channel(&self, channel_id: ChannelId) -> Result<Option<Attached<GuildChannel>>> {
        Ok(self.channel(channel_id).await?.filter(|channel| is_text(channel)))
    }

    /// A category by id. Unknown ids and channels of another kind yield `None`.
    pub async fn category(&self, channel_id: ChannelId) -> Result<Option<Attached<GuildChannel>>> {
        Ok(self.channel(channel_id).await?.filter(|channel| is_category(channel)))
    }

    #[instrument(skip(self))]
    pub async fn user(&self, user_id: UserId) -> Result<Option<Attached<User>>> {
        Ok(self.service.user(user_id).await?.map(|user| self.attach(user)))
    }
}
