//! # Message Contracts
//!
//! [`Message`] covers every message; [`UserMessage`] adds what only the
//! author's own messages support. System messages (joins, pins, renames)
//! implement [`Message`] alone.
//!
//! Converting an `Attached<Message>` picks the wrapper by authorship, so a
//! user message fetched from history still answers to [`RestUserMessage`]
//! once the caller narrows it with [`RestMessage::as_rest_user_message`].

use crate::convert::IntoAbstraction;
use crate::entity::Entity;
use crate::error::AbstractionError;
use crate::user::{RestUser, User};
use async_trait::async_trait;
use chat_service::serenity::model::channel::{Attachment, Embed, Message as PlatformMessage, MessageType};
use chat_service::serenity::model::id::{ChannelId, MessageId};
use chat_service::serenity::model::Timestamp;
use chat_service::{Attached, MessageEdit, Result};

#[async_trait]
pub trait Message: Entity<Id = MessageId> + Send + Sync {
    fn channel_id(&self) -> ChannelId;

    fn author(&self) -> Box<dyn User>;

    fn content(&self) -> String;

    fn kind(&self) -> MessageType;

    fn is_tts(&self) -> bool;

    fn is_pinned(&self) -> bool;

    fn timestamp(&self) -> Timestamp;

    fn edited_timestamp(&self) -> Option<Timestamp>;

    fn embeds(&self) -> Vec<Embed>;

    fn attachments(&self) -> Vec<Attachment>;

    async fn delete(&self) -> Result<()>;

    /// This message as a [`UserMessage`]; `None` for system messages.
    fn as_user_message(&self) -> Option<&dyn UserMessage>;

    fn as_user_message_mut(&mut self) -> Option<&mut dyn UserMessage>;
}

/// A message authored by a user or bot.
#[async_trait]
pub trait UserMessage: Message {
    async fn modify(&mut self, edit: MessageEdit) -> Result<()>;

    async fn pin(&self) -> Result<()>;

    async fn unpin(&self) -> Result<()>;
}

/// A message fetched over REST.
pub trait RestMessage: Message {
    /// The author, typed as a REST user.
    fn rest_author(&self) -> Box<dyn RestUser>;

    /// This message as a [`RestUserMessage`]; `None` for system messages.
    fn as_rest_user_message(&self) -> Option<&dyn RestUserMessage>;

    fn as_rest_user_message_mut(&mut self) -> Option<&mut dyn RestUserMessage>;
}

pub trait RestUserMessage: UserMessage + RestMessage {}

/// Implements [`Entity`], [`Message`] and [`RestMessage`] for a wrapper whose
/// `message` field is an `Attached<Message>`. The narrowing methods of each
/// trait are passed in as items.
macro_rules! forward_message {
    ($wrapper:ident, message: { $($narrow:tt)* }, rest: { $($narrow_rest:tt)* }) => {
        impl Entity for $wrapper {
            type Id = MessageId;

            fn id(&self) -> MessageId {
                self.message.id
            }
        }

        #[async_trait]
        impl Message for $wrapper {
            fn channel_id(&self) -> ChannelId {
                self.message.channel_id
            }

            fn author(&self) -> Box<dyn User> {
                self.rest_author()
            }

            fn content(&self) -> String {
                self.message.content.clone()
            }

            fn kind(&self) -> MessageType {
                self.message.kind
            }

            fn is_tts(&self) -> bool {
                self.message.tts
            }

            fn is_pinned(&self) -> bool {
                self.message.pinned
            }

            fn timestamp(&self) -> Timestamp {
                self.message.timestamp
            }

            fn edited_timestamp(&self) -> Option<Timestamp> {
                self.message.edited_timestamp
            }

            fn embeds(&self) -> Vec<Embed> {
                self.message.embeds.clone()
            }

            fn attachments(&self) -> Vec<Attachment> {
                self.message.attachments.clone()
            }

            async fn delete(&self) -> Result<()> {
                self.message.delete().await
            }

            $($narrow)*
        }

        impl RestMessage for $wrapper {
            fn rest_author(&self) -> Box<dyn RestUser> {
                let author = self.message.author.clone();
                self.message.client().attach(author).into_abstraction()
            }

            $($narrow_rest)*
        }
    };
}

// =============================================================================
// USER MESSAGE
// =============================================================================

/// User message backed by an `Attached<Message>`.
#[derive(Debug)]
pub struct RestUserMessageAbstraction {
    message: Attached<PlatformMessage>,
}

impl RestUserMessageAbstraction {
    pub fn new(message: Attached<PlatformMessage>) -> Self {
        Self { message }
    }

    pub fn inner(&self) -> &Attached<PlatformMessage> {
        &self.message
    }
}

impl TryFrom<Option<Attached<PlatformMessage>>> for RestUserMessageAbstraction {
    type Error = AbstractionError;

    fn try_from(message: Option<Attached<PlatformMessage>>) -> std::result::Result<Self, Self::Error> {
        message
            .map(Self::new)
            .ok_or(AbstractionError::MissingResource { kind: "user message" })
    }
}

forward_message!(RestUserMessageAbstraction,
    message: {
        fn as_user_message(&self) -> Option<&dyn UserMessage> {
            Some(self)
        }

        fn as_user_message_mut(&mut self) -> Option<&mut dyn UserMessage> {
            Some(self)
        }
    },
    rest: {
        fn as_rest_user_message(&self) -> Option<&dyn RestUserMessage> {
            Some(self)
        }

        fn as_rest_user_message_mut(&mut self) -> Option<&mut dyn RestUserMessage> {
            Some(self)
        }
    }
);

#[async_trait]
impl UserMessage for RestUserMessageAbstraction {
    async fn modify(&mut self, edit: MessageEdit) -> Result<()> {
        self.message.edit(edit).await
    }

    async fn pin(&self) -> Result<()> {
        self.message.pin().await
    }

    async fn unpin(&self) -> Result<()> {
        self.message.unpin().await
    }
}

impl RestUserMessage for RestUserMessageAbstraction {}

// =============================================================================
// SYSTEM MESSAGE
// =============================================================================

/// Platform-generated message backed by an `Attached<Message>`.
#[derive(Debug)]
pub struct RestSystemMessageAbstraction {
    message: Attached<PlatformMessage>,
}

impl RestSystemMessageAbstraction {
    pub fn new(message: Attached<PlatformMessage>) -> Self {
        Self { message }
    }

    pub fn inner(&self) -> &Attached<PlatformMessage> {
        &self.message
    }
}

impl TryFrom<Option<Attached<PlatformMessage>>> for RestSystemMessageAbstraction {
    type Error = AbstractionError;

    fn try_from(message: Option<Attached<PlatformMessage>>) -> std::result::Result<Self, Self::Error> {
        message
            .map(Self::new)
            .ok_or(AbstractionError::MissingResource { kind: "system message" })
    }
}

forward_message!(RestSystemMessageAbstraction,
    message: {
        fn as_user_message(&self) -> Option<&dyn UserMessage> {
            None
        }

        fn as_user_message_mut(&mut self) -> Option<&mut dyn UserMessage> {
            None
        }
    },
    rest: {
        fn as_rest_user_message(&self) -> Option<&dyn RestUserMessage> {
            None
        }

        fn as_rest_user_message_mut(&mut self) -> Option<&mut dyn RestUserMessage> {
            None
        }
    }
);

// =============================================================================
// ANY MESSAGE
// =============================================================================

impl IntoAbstraction for Attached<PlatformMessage> {
    type Output = Box<dyn RestMessage>;

    fn into_abstraction(self) -> Self::Output {
        if self.is_user_message() {
            Box::new(RestUserMessageAbstraction::new(self))
        } else {
            Box::new(RestSystemMessageAbstraction::new(self))
        }
    }
}
