//! User contracts: users in general and users as guild members.

use crate::convert::IntoAbstraction;
use crate::entity::Entity;
use crate::error::AbstractionError;
use async_trait::async_trait;
use chat_service::serenity::model::guild::Member;
use chat_service::serenity::model::id::{GuildId, RoleId, UserId};
use chat_service::serenity::model::mention::Mention;
use chat_service::serenity::model::user::User as PlatformUser;
use chat_service::serenity::model::Timestamp;
use chat_service::{Attached, MemberEdit, Result};

pub trait User: Entity<Id = UserId> + Send + Sync {
    fn username(&self) -> String;

    /// Legacy four-digit tag; `None` for accounts on unique usernames.
    fn discriminator(&self) -> Option<u16>;

    fn is_bot(&self) -> bool;

    fn avatar_id(&self) -> Option<String>;

    fn avatar_url(&self) -> Option<String>;

    fn mention(&self) -> String;
}

/// A user seen through one guild's membership.
pub trait GuildUser: User {
    fn guild_id(&self) -> GuildId;

    fn nickname(&self) -> Option<String>;

    /// The nickname when set, else the username.
    fn display_name(&self) -> String;

    fn role_ids(&self) -> Vec<RoleId>;

    fn joined_at(&self) -> Option<Timestamp>;
}

pub trait RestUser: User {}

#[async_trait]
pub trait RestGuildUser: GuildUser + RestUser {
    /// Re-read the membership from the platform.
    async fn update(&mut self) -> Result<()>;

    async fn modify(&mut self, edit: MemberEdit) -> Result<()>;
}

fn discriminator(user: &PlatformUser) -> Option<u16> {
    user.discriminator.map(|tag| tag.get())
}

// =============================================================================
// USER
// =============================================================================

#[derive(Debug, Clone)]
pub struct RestUserAbstraction {
    user: Attached<PlatformUser>,
}

impl RestUserAbstraction {
    pub fn new(user: Attached<PlatformUser>) -> Self {
        Self { user }
    }

    pub fn inner(&self) -> &Attached<PlatformUser> {
        &self.user
    }
}

impl TryFrom<Option<Attached<PlatformUser>>> for RestUserAbstraction {
    type Error = AbstractionError;

    fn try_from(user: Option<Attached<PlatformUser>>) -> std::result::Result<Self, Self::Error> {
        user.map(Self::new)
            .ok_or(AbstractionError::MissingResource { kind: "user" })
    }
}

impl IntoAbstraction for Attached<PlatformUser> {
    type Output = Box<dyn RestUser>;

    fn into_abstraction(self) -> Self::Output {
        Box::new(RestUserAbstraction::new(self))
    }
}

impl Entity for RestUserAbstraction {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.user.id
    }
}

impl User for RestUserAbstraction {
    fn username(&self) -> String {
        self.user.name.clone()
    }

    fn discriminator(&self) -> Option<u16> {
        discriminator(&self.user)
    }

    fn is_bot(&self) -> bool {
        self.user.bot
    }

    fn avatar_id(&self) -> Option<String> {
        self.user.avatar.as_ref().map(ToString::to_string)
    }

    fn avatar_url(&self) -> Option<String> {
        self.user.avatar_url()
    }

    fn mention(&self) -> String {
        Mention::from(self.user.id).to_string()
    }
}

impl RestUser for RestUserAbstraction {}

// =============================================================================
// GUILD USER
// =============================================================================

#[derive(Debug)]
pub struct RestGuildUserAbstraction {
    member: Attached<Member>,
}

impl RestGuildUserAbstraction {
    pub fn new(member: Attached<Member>) -> Self {
        Self { member }
    }

    pub fn inner(&self) -> &Attached<Member> {
        &self.member
    }
}

impl TryFrom<Option<Attached<Member>>> for RestGuildUserAbstraction {
    type Error = AbstractionError;

    fn try_from(member: Option<Attached<Member>>) -> std::result::Result<Self, Self::Error> {
        member
            .map(Self::new)
            .ok_or(AbstractionError::MissingResource { kind: "guild user" })
    }
}

impl IntoAbstraction for Attached<Member> {
    type Output = Box<dyn RestGuildUser>;

    fn into_abstraction(self) -> Self::Output {
        Box::new(RestGuildUserAbstraction::new(self))
    }
}

impl Entity for RestGuildUserAbstraction {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.member.user.id
    }
}

impl User for RestGuildUserAbstraction {
    fn username(&self) -> String {
        self.member.user.name.clone()
    }

    fn discriminator(&self) -> Option<u16> {
        discriminator(&self.member.user)
    }

    fn is_bot(&self) -> bool {
        self.member.user.bot
    }

    fn avatar_id(&self) -> Option<String> {
        self.member.user.avatar.as_ref().map(ToString::to_string)
    }

    fn avatar_url(&self) -> Option<String> {
        self.member.user.avatar_url()
    }

    fn mention(&self) -> String {
        Mention::from(self.member.user.id).to_string()
    }
}

impl GuildUser for RestGuildUserAbstraction {
    fn guild_id(&self) -> GuildId {
        self.member.guild_id
    }

    fn nickname(&self) -> Option<String> {
        self.member.nick.clone()
    }

    fn display_name(&self) -> String {
        self.member.display_name().to_string()
    }

    fn role_ids(&self) -> Vec<RoleId> {
        self.member.roles.clone()
    }

    fn joined_at(&self) -> Option<Timestamp> {
        self.member.joined_at
    }
}

impl RestUser for RestGuildUserAbstraction {}

#[async_trait]
impl RestGuildUser for RestGuildUserAbstraction {
    async fn update(&mut self) -> Result<()> {
        self.member.refresh().await
    }

    async fn modify(&mut self, edit: MemberEdit) -> Result<()> {
        self.member.edit(edit).await
    }
}
