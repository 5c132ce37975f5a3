//! Webhook contracts.

use crate::convert::IntoAbstraction;
use crate::entity::Entity;
use crate::error::AbstractionError;
use crate::user::{RestUser, User};
use async_trait::async_trait;
use chat_service::serenity::model::id::{ChannelId, GuildId, WebhookId};
use chat_service::serenity::model::webhook::Webhook as PlatformWebhook;
use chat_service::{Attached, Result};

#[async_trait]
pub trait Webhook: Entity<Id = WebhookId> + Send + Sync {
    fn channel_id(&self) -> Option<ChannelId>;

    fn guild_id(&self) -> Option<GuildId>;

    fn name(&self) -> Option<String>;

    fn avatar_id(&self) -> Option<String>;

    /// The user that created the webhook, when the platform reports one.
    fn creator(&self) -> Option<Box<dyn User>>;

    async fn delete(&self) -> Result<()>;
}

pub trait RestWebhook: Webhook {
    fn rest_creator(&self) -> Option<Box<dyn RestUser>>;
}

#[derive(Debug)]
pub struct RestWebhookAbstraction {
    webhook: Attached<PlatformWebhook>,
}

impl RestWebhookAbstraction {
    pub fn new(webhook: Attached<PlatformWebhook>) -> Self {
        Self { webhook }
    }

    pub fn inner(&self) -> &Attached<PlatformWebhook> {
        &self.webhook
    }
}

impl TryFrom<Option<Attached<PlatformWebhook>>> for RestWebhookAbstraction {
    type Error = AbstractionError;

    fn try_from(webhook: Option<Attached<PlatformWebhook>>) -> std::result::Result<Self, Self::Error> {
        webhook
            .map(Self::new)
            .ok_or(AbstractionError::MissingResource { kind: "webhook" })
    }
}

impl IntoAbstraction for Attached<PlatformWebhook> {
    type Output = Box<dyn RestWebhook>;

    fn into_abstraction(self) -> Self::Output {
        Box::new(RestWebhookAbstraction::new(self))
    }
}

impl Entity for RestWebhookAbstraction {
    type Id = WebhookId;

    fn id(&self) -> WebhookId {
        self.webhook.id
    }
}

#[async_trait]
impl Webhook for RestWebhookAbstraction {
    fn channel_id(&self) -> Option<ChannelId> {
        self.webhook.channel_id
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.webhook.guild_id
    }

    fn name(&self) -> Option<String> {
        self.webhook.name.clone()
    }

    fn avatar_id(&self) -> Option<String> {
        self.webhook.avatar.as_ref().map(ToString::to_string)
    }

    fn creator(&self) -> Option<Box<dyn User>> {
        self.rest_creator().map(|user| -> Box<dyn User> { user })
    }

    async fn delete(&self) -> Result<()> {
        self.webhook.delete().await
    }
}

impl RestWebhook for RestWebhookAbstraction {
    fn rest_creator(&self) -> Option<Box<dyn RestUser>> {
        let client = self.webhook.client();
        self.webhook
            .user
            .clone()
            .map(|user| client.attach(user))
            .into_abstraction()
    }
}
