use super::{CategoryChannel, Channel, GuildChannel, RestCategoryChannel, RestGuildChannel};
use crate::entity::Entity;
use crate::error::AbstractionError;
use async_trait::async_trait;
use chat_service::serenity::model::channel::{GuildChannel as PlatformChannel, PermissionOverwrite};
use chat_service::serenity::model::id::{ChannelId, GuildId};
use chat_service::{Attached, Result};

/// Category backed by an `Attached<GuildChannel>`.
#[derive(Debug)]
pub struct RestCategoryChannelAbstraction {
    category: Attached<PlatformChannel>,
}

impl RestCategoryChannelAbstraction {
    pub fn new(category: Attached<PlatformChannel>) -> Self {
        Self { category }
    }

    pub fn inner(&self) -> &Attached<PlatformChannel> {
        &self.category
    }
}

impl TryFrom<Option<Attached<PlatformChannel>>> for RestCategoryChannelAbstraction {
    type Error = AbstractionError;

    fn try_from(category: Option<Attached<PlatformChannel>>) -> std::result::Result<Self, Self::Error> {
        category
            .map(Self::new)
            .ok_or(AbstractionError::MissingResource { kind: "category channel" })
    }
}

impl Entity for RestCategoryChannelAbstraction {
    type Id = ChannelId;

    fn id(&self) -> ChannelId {
        self.category.id
    }
}

impl Channel for RestCategoryChannelAbstraction {
    fn name(&self) -> String {
        self.category.name.clone()
    }
}

impl GuildChannel for RestCategoryChannelAbstraction {
    fn guild_id(&self) -> GuildId {
        self.category.guild_id
    }

    fn position(&self) -> u16 {
        self.category.position
    }

    fn permission_overwrites(&self) -> Vec<PermissionOverwrite> {
        self.category.permission_overwrites.clone()
    }
}

impl CategoryChannel for RestCategoryChannelAbstraction {}

#[async_trait]
impl RestGuildChannel for RestCategoryChannelAbstraction {
    async fn update(&mut self) -> Result<()> {
        self.category.refresh().await
    }

    async fn delete(&self) -> Result<()> {
        self.category.delete().await
    }
}

impl RestCategoryChannel for RestCategoryChannelAbstraction {}
