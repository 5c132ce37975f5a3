//! # Mock Service & Testing Guide
//!
//! [`MockService`] implements [`ChatService`] entirely in memory. Tests queue
//! the responses they expect, in order, then hand the mock to a
//! [`ChatClient`](crate::ChatClient). Every request is recorded so tests can
//! assert exactly which operations were requested, and with which arguments.
//!
//! ## Expectations
//!
//! Expectations are consumed FIFO. A request that does not match the next
//! expected operation, or arrives after the queue is empty, panics. Call
//! [`MockService::verify`] at the end of a test to ensure nothing queued was
//! left unused.
//!
//! ```rust
//! use chat_service::mock::{fixtures, MockService};
//! use chat_service::{CacheMode, ChatClient, ServiceError};
//! use serenity::model::channel::Channel;
//! use serenity::model::id::MessageId;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = Arc::new(MockService::new());
//!     service.expect_channel().return_ok(Some(Channel::Guild(fixtures::text_channel(42, 1))));
//!     service.expect_message().return_err(ServiceError::InvalidArgument("denied".into()));
//!
//!     let client = ChatClient::new(service.clone());
//!     let channel = client.text_channel(42.into()).await.unwrap().unwrap();
//!     let result = channel.message(MessageId::new(7), CacheMode::AllowDownload).await;
//!
//!     assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
//!     service.verify();
//! }
//! ```
//!
//! ## Streams
//!
//! History and member listings are scripted as batches (`Vec<Vec<T>>`), one
//! per platform page. A batch is only handed out when the stream is polled
//! past the previous one; [`MockService::batches_fetched`] counts them.
//!
//! ## Cache
//!
//! `cache_channel`, `cache_message` and `cache_member` seed the answers given
//! to `CacheMode::CacheOnly` lookups. Cache hits are not recorded as calls.

use crate::error::{Result, ServiceError};
use crate::request::{
    ChannelEdit, FileUpload, InviteSettings, MemberEdit, MessageEdit, MessageQuery, OutgoingMessage,
};
use crate::service::{ChatService, ItemStream};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use serenity::model::channel::{Channel, GuildChannel, Message};
use serenity::model::guild::Member;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId, WebhookId};
use serenity::model::invite::RichInvite;
use serenity::model::user::User;
use serenity::model::webhook::Webhook;
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// RECORDED CALLS
// =============================================================================

/// One request received by the mock, with its arguments.
#[derive(Debug, Clone)]
pub enum Call {
    Channel { channel_id: ChannelId },
    EditChannel { channel_id: ChannelId, edit: ChannelEdit },
    DeleteChannel { channel_id: ChannelId },
    BroadcastTyping { channel_id: ChannelId },
    Message { channel_id: ChannelId, message_id: MessageId },
    Messages { channel_id: ChannelId, query: MessageQuery },
    MessageHistory { channel_id: ChannelId },
    Pins { channel_id: ChannelId },
    SendMessage { channel_id: ChannelId, message: OutgoingMessage },
    EditMessage { channel_id: ChannelId, message_id: MessageId, edit: MessageEdit },
    DeleteMessage { channel_id: ChannelId, message_id: MessageId },
    DeleteMessages { channel_id: ChannelId, message_ids: Vec<MessageId> },
    Pin { channel_id: ChannelId, message_id: MessageId },
    Unpin { channel_id: ChannelId, message_id: MessageId },
    User { user_id: UserId },
    Member { guild_id: GuildId, user_id: UserId },
    Members { guild_id: GuildId },
    EditMember { guild_id: GuildId, user_id: UserId, edit: MemberEdit },
    Webhook { webhook_id: WebhookId },
    Webhooks { channel_id: ChannelId },
    CreateWebhook { channel_id: ChannelId, name: String, avatar: Option<FileUpload> },
    DeleteWebhook { webhook_id: WebhookId },
    Invites { channel_id: ChannelId },
    CreateInvite { channel_id: ChannelId, settings: InviteSettings },
    DeleteInvite { code: String },
}

/// Declares [`Operation`], maps each [`Call`] onto it, and generates one
/// `expect_<operation>` shortcut per operation on [`MockService`].
macro_rules! operations {
    ($($method:ident => $variant:ident),* $(,)?) => {
        /// Operation addressed by a request, without its arguments.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($variant),*
        }

        impl Call {
            pub fn operation(&self) -> Operation {
                match self {
                    $(Call::$variant { .. } => Operation::$variant),*
                }
            }
        }

        impl MockService {
            paste::paste! {
                $(
                    #[doc = concat!("Expects a `", stringify!($method), "` request.")]
                    pub fn [<expect_ $method>](&self) -> ExpectationBuilder<'_> {
                        self.expect(Operation::$variant)
                    }
                )*
            }
        }
    };
}

operations! {
    channel => Channel,
    edit_channel => EditChannel,
    delete_channel => DeleteChannel,
    broadcast_typing => BroadcastTyping,
    message => Message,
    messages => Messages,
    message_history => MessageHistory,
    pins => Pins,
    send_message => SendMessage,
    edit_message => EditMessage,
    delete_message => DeleteMessage,
    delete_messages => DeleteMessages,
    pin => Pin,
    unpin => Unpin,
    user => User,
    member => Member,
    members => Members,
    edit_member => EditMember,
    webhook => Webhook,
    webhooks => Webhooks,
    create_webhook => CreateWebhook,
    delete_webhook => DeleteWebhook,
    invites => Invites,
    create_invite => CreateInvite,
    delete_invite => DeleteInvite,
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

struct Expectation {
    operation: Operation,
    response: Result<Box<dyn Any + Send>>,
}

/// In-memory [`ChatService`] driven by queued expectations.
#[derive(Default)]
pub struct MockService {
    expectations: Mutex<VecDeque<Expectation>>,
    calls: Mutex<Vec<Call>>,
    batches_fetched: Arc<AtomicUsize>,
    channels: Mutex<HashMap<ChannelId, GuildChannel>>,
    messages: Mutex<HashMap<(ChannelId, MessageId), Message>>,
    members: Mutex<HashMap<(GuildId, UserId), Member>>,
}

/// Builder for one queued response.
pub struct ExpectationBuilder<'a> {
    service: &'a MockService,
    operation: Operation,
}

impl<'a> ExpectationBuilder<'a> {
    /// Respond with `value`. Its type must match the operation's success
    /// type, e.g. `Option<Message>` for `message` or `Vec<Vec<Message>>` for
    /// `message_history`.
    pub fn return_ok<T: Send + 'static>(self, value: T) {
        self.push(Ok(Box::new(value)));
    }

    /// Respond with `error`.
    pub fn return_err(self, error: ServiceError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Box<dyn Any + Send>>) {
        let mut exps = self.service.expectations.lock().unwrap();
        exps.push_back(Expectation {
            operation: self.operation,
            response,
        });
    }
}

impl MockService {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a request for `operation`.
    pub fn expect(&self, operation: Operation) -> ExpectationBuilder<'_> {
        ExpectationBuilder {
            service: self,
            operation,
        }
    }

    pub fn cache_channel(&self, channel: GuildChannel) {
        self.channels.lock().unwrap().insert(channel.id, channel);
    }

    pub fn cache_message(&self, message: Message) {
        self.messages
            .lock()
            .unwrap()
            .insert((message.channel_id, message.id), message);
    }

    pub fn cache_member(&self, member: Member) {
        self.members
            .lock()
            .unwrap()
            .insert((member.guild_id, member.user.id), member);
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests received for `operation`.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Number of scripted stream batches handed out so far.
    pub fn batches_fetched(&self) -> usize {
        self.batches_fetched.load(Ordering::SeqCst)
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            let pending: Vec<Operation> = exps.iter().map(|e| e.operation).collect();
            panic!("Not all expectations were met. {} remaining: {:?}", exps.len(), pending);
        }
    }

    fn respond<T: Send + 'static>(&self, call: Call) -> Result<T> {
        let operation = call.operation();
        self.calls.lock().unwrap().push(call);

        let expectation = self.expectations.lock().unwrap().pop_front();
        let expectation = match expectation {
            Some(expectation) if expectation.operation == operation => expectation,
            Some(other) => panic!("Unexpected request {:?}, expected {:?}", operation, other.operation),
            None => panic!("Unexpected request {:?}, no expectations left", operation),
        };

        expectation.response.map(|value| match value.downcast::<T>() {
            Ok(value) => *value,
            Err(_) => panic!(
                "Expectation for {:?} returns the wrong type, expected {}",
                operation,
                std::any::type_name::<T>()
            ),
        })
    }

    fn stream<T: Send + 'static>(&self, call: Call) -> ItemStream<T> {
        let fetched = Arc::clone(&self.batches_fetched);
        match self.respond::<Vec<Vec<T>>>(call) {
            Ok(batches) => stream::iter(batches)
                .map(move |batch| {
                    fetched.fetch_add(1, Ordering::SeqCst);
                    stream::iter(batch.into_iter().map(Ok))
                })
                .flatten()
                .boxed(),
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }
}

#[async_trait]
impl ChatService for MockService {
    async fn channel(&self, channel_id: ChannelId) -> Result<Option<Channel>> {
        self.respond(Call::Channel { channel_id })
    }

    fn cached_channel(&self, channel_id: ChannelId) -> Option<GuildChannel> {
        self.channels.lock().unwrap().get(&channel_id).cloned()
    }

    async fn edit_channel(&self, channel_id: ChannelId, edit: ChannelEdit) -> Result<GuildChannel> {
        self.respond(Call::EditChannel { channel_id, edit })
    }

    async fn delete_channel(&self, channel_id: ChannelId) -> Result<()> {
        self.respond(Call::DeleteChannel { channel_id })
    }

    async fn broadcast_typing(&self, channel_id: ChannelId) -> Result<()> {
        self.respond(Call::BroadcastTyping { channel_id })
    }

    async fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<Option<Message>> {
        self.respond(Call::Message { channel_id, message_id })
    }

    fn cached_message(&self, channel_id: ChannelId, message_id: MessageId) -> Option<Message> {
        self.messages.lock().unwrap().get(&(channel_id, message_id)).cloned()
    }

    async fn messages(&self, channel_id: ChannelId, query: MessageQuery) -> Result<Vec<Message>> {
        self.respond(Call::Messages { channel_id, query })
    }

    fn message_history(&self, channel_id: ChannelId) -> ItemStream<Message> {
        self.stream(Call::MessageHistory { channel_id })
    }

    async fn pins(&self, channel_id: ChannelId) -> Result<Vec<Message>> {
        self.respond(Call::Pins { channel_id })
    }

    async fn send_message(&self, channel_id: ChannelId, message: OutgoingMessage) -> Result<Message> {
        self.respond(Call::SendMessage { channel_id, message })
    }

    async fn edit_message(&self, channel_id: ChannelId, message_id: MessageId, edit: MessageEdit) -> Result<Message> {
        self.respond(Call::EditMessage {
            channel_id,
            message_id,
            edit,
        })
    }

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        self.respond(Call::DeleteMessage { channel_id, message_id })
    }

    async fn delete_messages(&self, channel_id: ChannelId, message_ids: Vec<MessageId>) -> Result<()> {
        self.respond(Call::DeleteMessages {
            channel_id,
            message_ids,
        })
    }

    async fn pin(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        self.respond(Call::Pin { channel_id, message_id })
    }

    async fn unpin(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        self.respond(Call::Unpin { channel_id, message_id })
    }

    async fn user(&self, user_id: UserId) -> Result<Option<User>> {
        self.respond(Call::User { user_id })
    }

    async fn member(&self, guild_id: GuildId, user_id: UserId) -> Result<Option<Member>> {
        self.respond(Call::Member { guild_id, user_id })
    }

    fn cached_member(&self, guild_id: GuildId, user_id: UserId) -> Option<Member> {
        self.members.lock().unwrap().get(&(guild_id, user_id)).cloned()
    }

    fn members(&self, guild_id: GuildId) -> ItemStream<Member> {
        self.stream(Call::Members { guild_id })
    }

    async fn edit_member(&self, guild_id: GuildId, user_id: UserId, edit: MemberEdit) -> Result<Member> {
        self.respond(Call::EditMember {
            guild_id,
            user_id,
            edit,
        })
    }

    async fn webhook(&self, webhook_id: WebhookId) -> Result<Option<Webhook>> {
        self.respond(Call::Webhook { webhook_id })
    }

    async fn webhooks(&self, channel_id: ChannelId) -> Result<Vec<Webhook>> {
        self.respond(Call::Webhooks { channel_id })
    }

    async fn create_webhook(&self, channel_id: ChannelId, name: String, avatar: Option<FileUpload>) -> Result<Webhook> {
        self.respond(Call::CreateWebhook {
            channel_id,
            name,
            avatar,
        })
    }

    async fn delete_webhook(&self, webhook_id: WebhookId) -> Result<()> {
        self.respond(Call::DeleteWebhook { webhook_id })
    }

    async fn invites(&self, channel_id: ChannelId) -> Result<Vec<RichInvite>> {
        self.respond(Call::Invites { channel_id })
    }

    async fn create_invite(&self, channel_id: ChannelId, settings: InviteSettings) -> Result<RichInvite> {
        self.respond(Call::CreateInvite { channel_id, settings })
    }

    async fn delete_invite(&self, code: String) -> Result<()> {
        self.respond(Call::DeleteInvite { code })
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

/// Ready-made serenity models for tests, built from the platform's JSON.
pub mod fixtures {
    use serde_json::{json, Value};
    use serenity::model::channel::{GuildChannel, Message};
    use serenity::model::guild::Member;
    use serenity::model::invite::RichInvite;
    use serenity::model::user::User;
    use serenity::model::webhook::Webhook;

    const TIMESTAMP: &str = "2026-01-01T00:00:00+00:00";

    fn build<T: serde::de::DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).expect("fixture JSON matches the model")
    }

    fn user_json(id: u64, username: &str) -> Value {
        json!({
            "id": id.to_string(),
            "username": username,
            "discriminator": "0001",
            "global_name": null,
            "avatar": null,
            "bot": false,
        })
    }

    pub fn user(id: u64, username: &str) -> User {
        build(user_json(id, username))
    }

    fn channel_json(id: u64, guild_id: u64, kind: u8, name: String) -> Value {
        json!({
            "id": id.to_string(),
            "guild_id": guild_id.to_string(),
            "type": kind,
            "name": name,
            "position": 0,
            "permission_overwrites": [],
            "nsfw": false,
            "parent_id": null,
            "topic": null,
            "rate_limit_per_user": 0,
            "last_message_id": null,
            "flags": 0,
            "available_tags": [],
            "applied_tags": [],
        })
    }

    pub fn text_channel(id: u64, guild_id: u64) -> GuildChannel {
        build(channel_json(id, guild_id, 0, format!("channel-{id}")))
    }

    pub fn news_channel(id: u64, guild_id: u64) -> GuildChannel {
        build(channel_json(id, guild_id, 5, format!("news-{id}")))
    }

    pub fn voice_channel(id: u64, guild_id: u64) -> GuildChannel {
        build(channel_json(id, guild_id, 2, format!("voice-{id}")))
    }

    pub fn category(id: u64, guild_id: u64) -> GuildChannel {
        build(channel_json(id, guild_id, 4, format!("category-{id}")))
    }

    /// A text channel filed under `category_id`.
    pub fn text_channel_in(id: u64, guild_id: u64, category_id: u64) -> GuildChannel {
        let mut value = channel_json(id, guild_id, 0, format!("channel-{id}"));
        value["parent_id"] = json!(category_id.to_string());
        build(value)
    }

    fn message_json(id: u64, channel_id: u64, content: &str, kind: u8) -> Value {
        json!({
            "id": id.to_string(),
            "channel_id": channel_id.to_string(),
            "author": user_json(1, "author"),
            "content": content,
            "timestamp": TIMESTAMP,
            "edited_timestamp": null,
            "tts": false,
            "mention_everyone": false,
            "mentions": [],
            "mention_roles": [],
            "mention_channels": [],
            "attachments": [],
            "embeds": [],
            "reactions": [],
            "pinned": false,
            "type": kind,
            "flags": 0,
            "components": [],
            "sticker_items": [],
        })
    }

    pub fn message(id: u64, channel_id: u64, content: &str) -> Message {
        build(message_json(id, channel_id, content, 0))
    }

    /// A message written by the platform, e.g. kind 6 for a pin notice.
    pub fn system_message(id: u64, channel_id: u64, kind: u8) -> Message {
        build(message_json(id, channel_id, "", kind))
    }

    /// `count` messages counting down from `newest`, newest first.
    pub fn history(channel_id: u64, newest: u64, count: usize) -> Vec<Message> {
        (0..count as u64)
            .map(|offset| message(newest - offset, channel_id, &format!("message {}", newest - offset)))
            .collect()
    }

    pub fn member(guild_id: u64, user_id: u64, username: &str) -> Member {
        build(json!({
            "user": user_json(user_id, username),
            "nick": null,
            "roles": [],
            "joined_at": TIMESTAMP,
            "deaf": false,
            "mute": false,
            "flags": 0,
            "pending": false,
            "guild_id": guild_id.to_string(),
            "avatar": null,
            "premium_since": null,
            "communication_disabled_until": null,
        }))
    }

    pub fn webhook(id: u64, channel_id: u64, name: &str) -> Webhook {
        build(json!({
            "id": id.to_string(),
            "type": 1,
            "guild_id": "1",
            "channel_id": channel_id.to_string(),
            "user": user_json(1, "creator"),
            "name": name,
            "avatar": null,
            "token": format!("token-{id}"),
            "application_id": null,
        }))
    }

    pub fn invite(code: &str, channel_id: u64) -> RichInvite {
        build(json!({
            "code": code,
            "channel": {
                "id": channel_id.to_string(),
                "name": format!("channel-{channel_id}"),
                "type": 0,
            },
            "created_at": TIMESTAMP,
            "guild": null,
            "inviter": user_json(1, "inviter"),
            "max_age": 86_400,
            "max_uses": 0,
            "temporary": false,
            "uses": 0,
        }))
    }
}
