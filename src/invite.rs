//! Invite contract. Invites are addressed by code rather than by id, so
//! [`InviteMetadata`] does not extend `Entity`.

use crate::convert::IntoAbstraction;
use crate::error::AbstractionError;
use crate::user::User;
use async_trait::async_trait;
use chat_service::serenity::model::id::{ChannelId, GuildId};
use chat_service::serenity::model::invite::RichInvite;
use chat_service::serenity::model::Timestamp;
use chat_service::{Attached, Result};

#[async_trait]
pub trait InviteMetadata: Send + Sync {
    fn code(&self) -> String;

    fn url(&self) -> String;

    fn channel_id(&self) -> ChannelId;

    fn guild_id(&self) -> Option<GuildId>;

    fn inviter(&self) -> Option<Box<dyn User>>;

    /// Lifetime in seconds; zero never expires.
    fn max_age(&self) -> u32;

    /// Zero allows unlimited uses.
    fn max_uses(&self) -> u8;

    fn uses(&self) -> u64;

    fn is_temporary(&self) -> bool;

    fn created_at(&self) -> Timestamp;

    async fn delete(&self) -> Result<()>;
}

#[derive(Debug)]
pub struct RestInviteMetadataAbstraction {
    invite: Attached<RichInvite>,
}

impl RestInviteMetadataAbstraction {
    pub fn new(invite: Attached<RichInvite>) -> Self {
        Self { invite }
    }

    pub fn inner(&self) -> &Attached<RichInvite> {
        &self.invite
    }
}

impl TryFrom<Option<Attached<RichInvite>>> for RestInviteMetadataAbstraction {
    type Error = AbstractionError;

    fn try_from(invite: Option<Attached<RichInvite>>) -> std::result::Result<Self, Self::Error> {
        invite
            .map(Self::new)
            .ok_or(AbstractionError::MissingResource { kind: "invite" })
    }
}

impl IntoAbstraction for Attached<RichInvite> {
    type Output = Box<dyn InviteMetadata>;

    fn into_abstraction(self) -> Self::Output {
        Box::new(RestInviteMetadataAbstraction::new(self))
    }
}

#[async_trait]
impl InviteMetadata for RestInviteMetadataAbstraction {
    fn code(&self) -> String {
        self.invite.code.clone()
    }

    fn url(&self) -> String {
        self.invite.url()
    }

    fn channel_id(&self) -> ChannelId {
        self.invite.channel.id
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.invite.guild.as_ref().map(|guild| guild.id)
    }

    fn inviter(&self) -> Option<Box<dyn User>> {
        let client = self.invite.client();
        self.invite
            .inviter
            .clone()
            .map(|user| client.attach(user))
            .into_abstraction()
            .map(|user| -> Box<dyn User> { user })
    }

    fn max_age(&self) -> u32 {
        self.invite.max_age
    }

    fn max_uses(&self) -> u8 {
        self.invite.max_uses
    }

    fn uses(&self) -> u64 {
        self.invite.uses
    }

    fn is_temporary(&self) -> bool {
        self.invite.temporary
    }

    fn created_at(&self) -> Timestamp {
        self.invite.created_at
    }

    async fn delete(&self) -> Result<()> {
        self.invite.delete().await
    }
}
