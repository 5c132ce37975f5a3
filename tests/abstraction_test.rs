use chat_abstractions::telemetry::init_test_tracing;
use chat_abstractions::{Channel as _, GuildChannel as _};
use chat_abstractions::{
    AbstractionError, CacheMode, ChannelEdit, Direction, Entity, FileUpload, GuildUser, IntoAbstraction,
    InviteMetadata, InviteSettings, MemberEdit, Message, MessageChannel, MessageEdit, NestedChannel,
    OutgoingMessage, RestCategoryChannelAbstraction, RestClient, RestClientAbstraction,
    RestGuildChannel, RestGuildUser, RestGuildUserAbstraction, RestInviteMetadataAbstraction,
    RestMessage, RestMessageChannel, RestSystemMessageAbstraction, RestTextChannel,
    RestTextChannelAbstraction, RestUserAbstraction, RestUserMessageAbstraction,
    RestWebhookAbstraction, ServiceError, TextChannel, User, UserMessage, Webhook,
};
use chat_service::mock::{fixtures, Call, MockService, Operation};
use chat_service::serenity;
use chat_service::serenity::model::channel::{
    Channel, Embed, GuildChannel, Message as PlatformMessage, MessageType,
};
use chat_service::serenity::model::guild::Member;
use chat_service::serenity::model::id::{ChannelId, GuildId, MessageId, UserId, WebhookId};
use chat_service::serenity::model::invite::RichInvite;
use chat_service::serenity::model::user::User as PlatformUser;
use chat_service::serenity::model::webhook::Webhook as PlatformWebhook;
use chat_service::serenity::model::Timestamp;
use chat_service::{Attached, ChatClient, MessageQuery};
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;

// --- Helpers ---

fn client(service: &Arc<MockService>) -> Box<dyn RestClient> {
    ChatClient::new(service.clone()).into_abstraction()
}

async fn wrapped_channel(service: &Arc<MockService>) -> Box<dyn RestTextChannel> {
    init_test_tracing();
    service
        .expect_channel()
        .return_ok(Some(Channel::Guild(fixtures::text_channel(42, 1))));
    client(service)
        .fetch_text_channel(ChannelId::new(42))
        .await
        .expect("lookup failed")
        .expect("channel missing")
}

fn denied() -> ServiceError {
    ServiceError::Platform(serenity::Error::Other("Missing Permissions"))
}

fn ids(messages: &[Box<dyn Message>]) -> Vec<u64> {
    messages.iter().map(|message| message.id().get()).collect()
}

// --- Lookups ---

#[tokio::test]
async fn test_fetch_message_by_id_returns_wrapped_message() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_message()
        .return_ok(Some(fixtures::message(7, 42, "hello")));

    let message = channel.fetch_message(MessageId::new(7)).await.unwrap().unwrap();

    assert_eq!(message.id(), MessageId::new(7));
    assert_eq!(message.channel_id(), ChannelId::new(42));
    assert_eq!(message.content(), "hello");
    assert_eq!(message.author().username(), "author");
    assert!(message.as_rest_user_message().is_some());
    service.verify();
}

#[tokio::test]
async fn test_unknown_message_is_absent_not_an_error() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_message().return_ok(None::<PlatformMessage>);
    service.expect_message().return_ok(None::<PlatformMessage>);

    assert!(channel.fetch_message(MessageId::new(404)).await.unwrap().is_none());
    assert!(channel
        .get_message(MessageId::new(404), CacheMode::AllowDownload)
        .await
        .unwrap()
        .is_none());
    service.verify();
}

#[tokio::test]
async fn test_permission_failure_propagates_unchanged() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_send_message().return_err(denied());
    service.expect_send_message().return_err(denied());

    let sent = channel.send_message(OutgoingMessage::text("hi")).await;
    assert!(matches!(
        sent,
        Err(ServiceError::Platform(serenity::Error::Other(reason))) if reason == "Missing Permissions"
    ));

    let posted = channel.post_message(OutgoingMessage::text("hi")).await;
    assert!(matches!(posted, Err(ServiceError::Platform(_))));
    service.verify();
}

// --- Forwarding ---

#[tokio::test]
async fn test_send_forwards_exactly_one_call_with_same_arguments() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_send_message().return_ok(fixtures::message(8, 42, "hi"));

    let sent = channel
        .post_message(OutgoingMessage::text("hi").with_tts(true))
        .await
        .unwrap();

    assert_eq!(sent.id(), MessageId::new(8));
    assert_eq!(service.call_count(Operation::SendMessage), 1);
    match &service.calls()[1] {
        Call::SendMessage { channel_id, message } => {
            assert_eq!(*channel_id, ChannelId::new(42));
            assert_eq!(message.content, "hi");
            assert!(message.tts);
            assert!(message.files.is_empty());
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_files_are_attached_to_the_sent_message() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_send_message().return_ok(fixtures::message(8, 42, "report"));
    service.expect_send_message().return_ok(fixtures::message(9, 42, "report"));

    let file = FileUpload::new("report.txt", b"ok".to_vec());
    let sent = channel
        .send_file(file.clone(), OutgoingMessage::text("report"))
        .await
        .unwrap();
    assert_eq!(sent.id(), MessageId::new(8));
    let posted = channel
        .post_file(file.clone(), OutgoingMessage::text("report"))
        .await
        .unwrap();
    assert_eq!(posted.id(), MessageId::new(9));

    assert_eq!(service.call_count(Operation::SendMessage), 2);
    for call in &service.calls()[1..] {
        match call {
            Call::SendMessage { message, .. } => assert_eq!(message.files, vec![file.clone()]),
            other => panic!("unexpected call {other:?}"),
        }
    }
    service.verify();
}

#[tokio::test]
async fn test_files_from_path_are_read_and_sent() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_send_message().return_ok(fixtures::message(8, 42, ""));
    service.expect_send_message().return_ok(fixtures::message(9, 42, ""));
    let path = std::env::temp_dir().join("chat-abstractions-upload.txt");
    tokio::fs::write(&path, b"payload").await.unwrap();

    channel
        .send_file_from_path(&path, true, OutgoingMessage::default())
        .await
        .unwrap();
    channel
        .post_file_from_path(&path, false, OutgoingMessage::default())
        .await
        .unwrap();
    tokio::fs::remove_file(&path).await.unwrap();

    let calls = service.calls();
    let files: Vec<&FileUpload> = calls[1..]
        .iter()
        .filter_map(|call| match call {
            Call::SendMessage { message, .. } => message.files.first(),
            _ => None,
        })
        .collect();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].filename, "chat-abstractions-upload.txt");
    assert_eq!(files[0].data, b"payload");
    assert!(files[0].is_spoiler);
    assert!(!files[1].is_spoiler);
    service.verify();
}

#[tokio::test]
async fn test_missing_upload_path_sends_nothing() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    let path = std::env::temp_dir().join("chat-abstractions-missing.bin");

    let result = channel
        .post_file_from_path(&path, false, OutgoingMessage::default())
        .await;

    assert!(matches!(result, Err(ServiceError::Io(_))));
    assert_eq!(service.call_count(Operation::SendMessage), 0);
}

#[tokio::test]
async fn test_accessors_read_through_to_concrete_channel() {
    let service = Arc::new(MockService::new());
    let mut model = fixtures::text_channel_in(42, 1, 9);
    model.topic = Some("releases".into());
    model.rate_limit_per_user = Some(30);
    model.nsfw = true;
    model.position = 3;
    service.expect_channel().return_ok(Some(Channel::Guild(model)));

    let concrete = ChatClient::new(service.clone())
        .text_channel(ChannelId::new(42))
        .await
        .unwrap();
    let wrapper = RestTextChannelAbstraction::try_from(concrete).unwrap();

    assert_eq!(wrapper.id(), wrapper.inner().id);
    assert_eq!(wrapper.name(), wrapper.inner().name);
    assert_eq!(wrapper.guild_id(), GuildId::new(1));
    assert_eq!(wrapper.position(), 3);
    assert_eq!(wrapper.category_id(), Some(ChannelId::new(9)));
    assert_eq!(wrapper.topic().as_deref(), Some("releases"));
    assert_eq!(wrapper.slow_mode_interval(), 30);
    assert!(wrapper.is_nsfw());
    assert!(wrapper.permission_overwrites().is_empty());
    assert_eq!(wrapper.mention(), "<#42>");
}

#[tokio::test]
async fn test_modify_updates_state_seen_through_wrapper() {
    let service = Arc::new(MockService::new());
    let mut channel = wrapped_channel(&service).await;
    let mut renamed = fixtures::text_channel(42, 1);
    renamed.name = "renamed".into();
    service.expect_edit_channel().return_ok(renamed);

    let edit = ChannelEdit {
        name: Some("renamed".into()),
        ..Default::default()
    };
    channel.modify(edit).await.unwrap();

    assert_eq!(channel.name(), "renamed");
    assert!(matches!(
        &service.calls()[1],
        Call::EditChannel { channel_id, edit } if *channel_id == ChannelId::new(42)
            && edit.name.as_deref() == Some("renamed")
    ));
    service.verify();
}

#[tokio::test]
async fn test_text_channel_update_and_delete_forward() {
    let service = Arc::new(MockService::new());
    let mut channel = wrapped_channel(&service).await;
    let mut moved = fixtures::text_channel(42, 1);
    moved.position = 7;
    service.expect_channel().return_ok(Some(Channel::Guild(moved)));
    service.expect_delete_channel().return_ok(());

    channel.update().await.unwrap();
    assert_eq!(channel.position(), 7);
    channel.delete().await.unwrap();

    assert_eq!(service.call_count(Operation::Channel), 2);
    assert_eq!(service.call_count(Operation::DeleteChannel), 1);
    assert!(matches!(
        service.calls()[2],
        Call::DeleteChannel { channel_id } if channel_id == ChannelId::new(42)
    ));
    service.verify();
}

#[tokio::test]
async fn test_category_update_and_delete_forward() {
    let service = Arc::new(MockService::new());
    service
        .expect_channel()
        .return_ok(Some(Channel::Guild(fixtures::category(9, 1))));
    let mut renamed = fixtures::category(9, 1);
    renamed.name = "archive".into();
    service.expect_channel().return_ok(Some(Channel::Guild(renamed)));
    service.expect_delete_channel().return_ok(());

    let mut category = client(&service)
        .fetch_category_channel(ChannelId::new(9))
        .await
        .unwrap()
        .unwrap();
    category.update().await.unwrap();
    assert_eq!(category.name(), "archive");
    category.delete().await.unwrap();

    assert_eq!(service.call_count(Operation::Channel), 2);
    assert!(matches!(
        service.calls()[2],
        Call::DeleteChannel { channel_id } if channel_id == ChannelId::new(9)
    ));
    service.verify();
}

#[tokio::test]
async fn test_update_of_deleted_channel_fails() {
    let service = Arc::new(MockService::new());
    let mut channel = wrapped_channel(&service).await;
    service.expect_channel().return_ok(None::<Channel>);

    let result = channel.update().await;

    assert!(matches!(result, Err(ServiceError::Unknown { kind: "channel", id: 42 })));
}

// --- Construction ---

#[test]
fn test_wrapping_absent_resource_fails() {
    let result = RestTextChannelAbstraction::try_from(None::<Attached<GuildChannel>>);
    assert_eq!(
        result.unwrap_err(),
        AbstractionError::MissingResource { kind: "text channel" }
    );

    let result = RestClientAbstraction::try_from(None::<ChatClient>);
    assert!(matches!(result, Err(AbstractionError::MissingResource { kind: "client" })));
}

#[test]
fn test_every_wrapper_rejects_absent_resources() {
    fn kind<T>(result: Result<T, AbstractionError>) -> &'static str {
        match result {
            Err(AbstractionError::MissingResource { kind }) => kind,
            Ok(_) => panic!("wrapped an absent resource"),
        }
    }

    assert_eq!(
        kind(RestCategoryChannelAbstraction::try_from(None::<Attached<GuildChannel>>)),
        "category channel"
    );
    assert_eq!(
        kind(RestUserMessageAbstraction::try_from(None::<Attached<PlatformMessage>>)),
        "user message"
    );
    assert_eq!(
        kind(RestSystemMessageAbstraction::try_from(None::<Attached<PlatformMessage>>)),
        "system message"
    );
    assert_eq!(kind(RestUserAbstraction::try_from(None::<Attached<PlatformUser>>)), "user");
    assert_eq!(
        kind(RestGuildUserAbstraction::try_from(None::<Attached<Member>>)),
        "guild user"
    );
    assert_eq!(
        kind(RestWebhookAbstraction::try_from(None::<Attached<PlatformWebhook>>)),
        "webhook"
    );
    assert_eq!(
        kind(RestInviteMetadataAbstraction::try_from(None::<Attached<RichInvite>>)),
        "invite"
    );
}

#[test]
fn test_absent_converts_to_absent() {
    let channel: Option<Attached<PlatformMessage>> = None;
    assert!(channel.into_abstraction().is_none());
}

// --- Collections & history ---

#[tokio::test]
async fn test_collections_preserve_order() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_pins().return_ok(vec![
        fixtures::message(3, 42, "c"),
        fixtures::message(1, 42, "a"),
        fixtures::message(2, 42, "b"),
    ]);

    let pinned = channel.get_pinned_messages().await.unwrap();

    assert_eq!(ids(&pinned), vec![3, 1, 2]);
}

#[tokio::test]
async fn test_history_is_fetched_as_consumed() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_message_history().return_ok(vec![
        fixtures::history(42, 1_000, 100),
        fixtures::history(42, 900, 100),
        fixtures::history(42, 800, 100),
    ]);

    let history = channel.get_message_history(CacheMode::AllowDownload);
    assert_eq!(service.batches_fetched(), 0);

    let first: Vec<Box<dyn Message>> = history.take(100).try_collect().await.unwrap();

    assert_eq!(first.len(), 100);
    assert_eq!(first[0].id(), MessageId::new(1_000));
    assert_eq!(first[99].id(), MessageId::new(901));
    assert_eq!(service.batches_fetched(), 1);
    assert_eq!(service.call_count(Operation::MessageHistory), 1);
    service.verify();
}

#[tokio::test]
async fn test_history_failure_reaches_the_caller() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_message_history().return_err(denied());

    let result: Result<Vec<_>, _> = channel.fetch_message_history().try_collect().await;

    assert!(matches!(result, Err(ServiceError::Platform(_))));
}

#[tokio::test]
async fn test_history_anchored_on_wrapped_message() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_message()
        .return_ok(Some(fixtures::message(7, 42, "anchor")));
    service.expect_messages().return_ok(vec![fixtures::message(8, 42, "next")]);
    service
        .expect_messages()
        .return_ok(vec![fixtures::message(6, 42, "before")]);

    let anchor = channel.fetch_message(MessageId::new(7)).await.unwrap().unwrap();
    let after = channel
        .fetch_messages_from_message(&*anchor, Direction::After, 10)
        .await
        .unwrap();
    let before = channel
        .get_messages_from_message(&*anchor, Direction::Before, 5, CacheMode::AllowDownload)
        .await
        .unwrap();

    assert_eq!(after[0].id(), MessageId::new(8));
    assert_eq!(ids(&before), vec![6]);
    assert_eq!(service.call_count(Operation::Messages), 2);
    let calls = service.calls();
    assert!(matches!(
        &calls[2],
        Call::Messages { query, .. } if *query == MessageQuery::from(MessageId::new(7), Direction::After, 10)
    ));
    assert!(matches!(
        &calls[3],
        Call::Messages { query, .. } if *query == MessageQuery::from(MessageId::new(7), Direction::Before, 5)
    ));
    service.verify();
}

#[tokio::test]
async fn test_latest_messages_use_one_request() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_messages().return_ok(fixtures::history(42, 50, 3));

    let latest = channel.get_messages(3, CacheMode::AllowDownload).await.unwrap();

    assert_eq!(ids(&latest), vec![50, 49, 48]);
    assert!(matches!(
        &service.calls()[1],
        Call::Messages { query, .. } if *query == MessageQuery::latest(3)
    ));
}

// --- Dual interface ---

#[tokio::test]
async fn test_cache_only_lookups_never_reach_the_network() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;

    let message = channel
        .get_message(MessageId::new(7), CacheMode::CacheOnly)
        .await
        .unwrap();
    let category = channel.get_category(CacheMode::CacheOnly).await.unwrap();
    let latest = channel.get_messages(10, CacheMode::CacheOnly).await.unwrap();
    let history: Vec<_> = channel.get_message_history(CacheMode::CacheOnly).collect().await;
    let user = channel.get_user(UserId::new(10), CacheMode::CacheOnly).await.unwrap();
    let users: Vec<_> = channel.get_users(CacheMode::CacheOnly).collect().await;

    assert!(message.is_none());
    assert!(category.is_none());
    assert!(latest.is_empty());
    assert!(history.is_empty());
    assert!(user.is_none());
    assert!(users.is_empty());
    assert_eq!(service.calls().len(), 1);
}

#[tokio::test]
async fn test_cached_message_is_served_without_request() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.cache_message(fixtures::message(7, 42, "cached"));

    let message = channel
        .get_message(MessageId::new(7), CacheMode::CacheOnly)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(message.content(), "cached");
    assert_eq!(service.calls().len(), 1);
}

#[tokio::test]
async fn test_fetch_category_always_downloads() {
    let service = Arc::new(MockService::new());
    service
        .expect_channel()
        .return_ok(Some(Channel::Guild(fixtures::text_channel_in(42, 1, 9))));
    service
        .expect_channel()
        .return_ok(Some(Channel::Guild(fixtures::category(9, 1))));
    service.cache_channel(fixtures::category(9, 1));

    let channel = client(&service)
        .fetch_text_channel(ChannelId::new(42))
        .await
        .unwrap()
        .unwrap();
    let category = channel.fetch_category().await.unwrap().unwrap();

    assert_eq!(category.id(), ChannelId::new(9));
    assert_eq!(category.name(), "category-9");
    assert_eq!(service.call_count(Operation::Channel), 2);
    service.verify();
}

#[tokio::test]
async fn test_rest_channel_works_as_platform_channel() {
    let service = Arc::new(MockService::new());
    let channel: Box<dyn TextChannel> = wrapped_channel(&service).await;
    service.expect_broadcast_typing().return_ok(());

    channel.trigger_typing().await.unwrap();

    assert_eq!(channel.mention(), "<#42>");
    assert_eq!(service.call_count(Operation::BroadcastTyping), 1);
}

// --- Client ---

#[tokio::test]
async fn test_client_fetches_channels_of_any_kind() {
    let service = Arc::new(MockService::new());
    service
        .expect_channel()
        .return_ok(Some(Channel::Guild(fixtures::category(9, 1))));
    service
        .expect_channel()
        .return_ok(Some(Channel::Guild(fixtures::category(9, 1))));
    service.expect_channel().return_ok(None::<Channel>);
    service
        .expect_channel()
        .return_ok(Some(Channel::Guild(fixtures::voice_channel(10, 1))));

    let rest = client(&service);
    let channel = rest.fetch_channel(ChannelId::new(9)).await.unwrap().unwrap();
    assert_eq!(channel.id(), ChannelId::new(9));
    assert_eq!(channel.guild_id(), GuildId::new(1));

    assert!(rest.fetch_text_channel(ChannelId::new(9)).await.unwrap().is_none());
    assert!(rest.fetch_channel(ChannelId::new(404)).await.unwrap().is_none());
    assert!(rest.fetch_channel(ChannelId::new(10)).await.unwrap().is_none());
    service.verify();
}

#[tokio::test]
async fn test_client_forwards_transport_failures() {
    let service = Arc::new(MockService::new());
    service.expect_user().return_err(denied());
    service.expect_user().return_ok(Some(fixtures::user(5, "eve")));

    let rest = RestClientAbstraction::new(ChatClient::new(service.clone()));
    let result = rest.fetch_user(UserId::new(5)).await;
    assert!(matches!(result, Err(ServiceError::Platform(_))));

    let user = rest.fetch_user(UserId::new(5)).await.unwrap().unwrap();
    assert_eq!(user.username(), "eve");
    assert_eq!(user.mention(), "<@5>");
    assert_eq!(user.discriminator(), Some(1));
    assert!(user.avatar_id().is_none());
    assert!(user.avatar_url().is_none());
    assert!(!user.is_bot());
    assert_eq!(service.call_count(Operation::User), 2);
}

// --- Messages ---

#[tokio::test]
async fn test_user_message_operations_forward() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_send_message().return_ok(fixtures::message(8, 42, "hi"));
    service.expect_pin().return_ok(());
    service.expect_unpin().return_ok(());
    service.expect_delete_message().return_ok(());

    let message = channel.send_message(OutgoingMessage::text("hi")).await.unwrap();
    message.pin().await.unwrap();
    message.unpin().await.unwrap();
    channel.delete_message(&*message).await.unwrap();

    let calls = service.calls();
    assert!(matches!(calls[2], Call::Pin { message_id, .. } if message_id == MessageId::new(8)));
    assert!(matches!(calls[3], Call::Unpin { message_id, .. } if message_id == MessageId::new(8)));
    assert!(matches!(
        calls[4],
        Call::DeleteMessage { channel_id, message_id }
            if channel_id == ChannelId::new(42) && message_id == MessageId::new(8)
    ));
    assert_eq!(service.call_count(Operation::Unpin), 1);
    service.verify();
}

#[tokio::test]
async fn test_message_deletes_itself() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_message()
        .return_ok(Some(fixtures::message(7, 42, "bye")));
    service.expect_delete_message().return_ok(());
    service.expect_delete_message().return_ok(());

    let message = channel.fetch_message(MessageId::new(7)).await.unwrap().unwrap();
    message.delete().await.unwrap();
    channel.delete_message_by_id(MessageId::new(3)).await.unwrap();

    let calls = service.calls();
    assert!(matches!(calls[2], Call::DeleteMessage { message_id, .. } if message_id == MessageId::new(7)));
    assert!(matches!(calls[3], Call::DeleteMessage { message_id, .. } if message_id == MessageId::new(3)));
    assert_eq!(service.call_count(Operation::DeleteMessage), 2);
    service.verify();
}

#[tokio::test]
async fn test_fetched_user_message_can_be_modified_after_narrowing() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_message()
        .return_ok(Some(fixtures::message(7, 42, "draft")));
    service
        .expect_edit_message()
        .return_ok(fixtures::message(7, 42, "final"));

    let mut message = channel.fetch_message(MessageId::new(7)).await.unwrap().unwrap();
    let user_message = message.as_rest_user_message_mut().expect("written by a user");
    let edit = MessageEdit {
        content: Some("final".into()),
        ..Default::default()
    };
    user_message.modify(edit).await.unwrap();

    assert_eq!(message.content(), "final");
    assert_eq!(service.call_count(Operation::EditMessage), 1);
    assert!(matches!(
        &service.calls()[2],
        Call::EditMessage { message_id, edit, .. }
            if *message_id == MessageId::new(7) && edit.content.as_deref() == Some("final")
    ));
    service.verify();
}

#[tokio::test]
async fn test_platform_messages_narrow_to_user_messages() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_pins().return_ok(vec![
        fixtures::message(7, 42, "note"),
        fixtures::system_message(8, 42, 6),
    ]);

    let mut pinned = channel.get_pinned_messages().await.unwrap();

    assert!(pinned[0].as_user_message().is_some());
    assert!(pinned[1].as_user_message().is_none());
    assert!(pinned[1].as_user_message_mut().is_none());
    let narrowed = pinned[0].as_user_message_mut().expect("written by a user");
    assert_eq!(narrowed.id(), MessageId::new(7));
}

#[tokio::test]
async fn test_system_messages_are_wrapped_without_user_operations() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_message()
        .return_ok(Some(fixtures::system_message(9, 42, 6)));

    let mut message = channel.fetch_message(MessageId::new(9)).await.unwrap().unwrap();

    assert_eq!(message.kind(), MessageType::PinsAdd);
    assert_eq!(message.rest_author().username(), "author");
    assert!(message.as_rest_user_message().is_none());
    assert!(message.as_rest_user_message_mut().is_none());

    let concrete = ChatClient::new(service.clone()).attach(fixtures::system_message(9, 42, 6));
    let wrapper = RestSystemMessageAbstraction::try_from(Some(concrete)).unwrap();
    assert_eq!(wrapper.id(), MessageId::new(9));
    assert!(wrapper.as_user_message().is_none());
}

#[tokio::test]
async fn test_message_accessors_read_through() {
    let service = Arc::new(MockService::new());
    let mut model = fixtures::message(7, 42, "release notes");
    model.tts = true;
    model.pinned = true;
    model.edited_timestamp = Some(Timestamp::parse("2026-01-02T00:00:00Z").unwrap());
    let embed: Embed = serde_json::from_value(serde_json::json!({ "title": "v1.2" })).unwrap();
    model.embeds = vec![embed];

    let concrete = ChatClient::new(service.clone()).attach(model);
    let wrapper = RestUserMessageAbstraction::new(concrete);

    assert_eq!(wrapper.kind(), MessageType::Regular);
    assert!(wrapper.is_tts());
    assert!(wrapper.is_pinned());
    assert_eq!(wrapper.timestamp(), wrapper.inner().timestamp);
    assert_eq!(wrapper.edited_timestamp(), wrapper.inner().edited_timestamp);
    assert!(wrapper.edited_timestamp().is_some());
    assert_eq!(wrapper.embeds().len(), 1);
    assert_eq!(wrapper.embeds()[0].title.as_deref(), Some("v1.2"));
    assert!(wrapper.attachments().is_empty());
    assert_eq!(wrapper.author().id(), UserId::new(1));
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_bulk_delete_of_wrapped_messages() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_pins()
        .return_ok(vec![fixtures::message(1, 42, "a"), fixtures::message(2, 42, "b")]);
    service.expect_delete_messages().return_ok(());
    service.expect_delete_messages().return_ok(());

    let pinned = channel.get_pinned_messages().await.unwrap();
    let refs: Vec<&dyn Message> = pinned.iter().map(|m| &**m).collect();
    channel.delete_messages(&refs).await.unwrap();
    channel
        .delete_messages_by_id(&[MessageId::new(3), MessageId::new(4)])
        .await
        .unwrap();

    let calls = service.calls();
    assert!(matches!(
        &calls[2],
        Call::DeleteMessages { message_ids, .. } if *message_ids == vec![MessageId::new(1), MessageId::new(2)]
    ));
    assert!(matches!(
        &calls[3],
        Call::DeleteMessages { message_ids, .. } if *message_ids == vec![MessageId::new(3), MessageId::new(4)]
    ));
    service.verify();
}

// --- Members ---

#[tokio::test]
async fn test_members_are_wrapped_as_they_stream() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    let mut nicknamed = fixtures::member(1, 10, "ana");
    nicknamed.nick = Some("A".into());
    service.expect_members().return_ok(vec![
        vec![nicknamed, fixtures::member(1, 11, "bo")],
        vec![fixtures::member(1, 12, "cy")],
    ]);

    let members: Vec<_> = channel.fetch_users().try_collect().await.unwrap();

    assert_eq!(members.len(), 3);
    assert_eq!(members[0].display_name(), "A");
    assert_eq!(members[0].nickname().as_deref(), Some("A"));
    assert_eq!(members[0].mention(), "<@10>");
    assert_eq!(members[1].display_name(), "bo");
    assert_eq!(members[1].guild_id(), GuildId::new(1));
    assert!(members[2].role_ids().is_empty());
    assert!(members[2].joined_at().is_some());
    assert_eq!(service.batches_fetched(), 2);
}

#[tokio::test]
async fn test_platform_user_lookups_forward() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.cache_member(fixtures::member(1, 10, "ana"));
    service
        .expect_member()
        .return_ok(Some(fixtures::member(1, 11, "bo")));
    service.expect_member().return_ok(None::<Member>);
    service
        .expect_members()
        .return_ok(vec![vec![fixtures::member(1, 10, "ana")]]);

    let cached = channel.get_user(UserId::new(10), CacheMode::CacheOnly).await.unwrap();
    assert_eq!(cached.map(|user| user.username()).as_deref(), Some("ana"));
    let fetched = channel
        .get_user(UserId::new(11), CacheMode::AllowDownload)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.id(), UserId::new(11));
    assert!(channel.fetch_user(UserId::new(12)).await.unwrap().is_none());

    let users: Vec<Box<dyn GuildUser>> = channel
        .get_users(CacheMode::AllowDownload)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(service.call_count(Operation::Member), 2);
    assert!(matches!(
        service.calls()[1],
        Call::Member { guild_id, user_id } if guild_id == GuildId::new(1) && user_id == UserId::new(11)
    ));
    service.verify();
}

#[tokio::test]
async fn test_guild_user_update_and_modify_forward() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_member()
        .return_ok(Some(fixtures::member(1, 10, "ana")));
    let mut renamed = fixtures::member(1, 10, "ana");
    renamed.nick = Some("Ana B".into());
    service.expect_member().return_ok(Some(renamed.clone()));
    let mut edited = renamed;
    edited.nick = Some("Ana C".into());
    service.expect_edit_member().return_ok(edited);

    let mut member = channel.fetch_user(UserId::new(10)).await.unwrap().unwrap();
    member.update().await.unwrap();
    assert_eq!(member.display_name(), "Ana B");

    let edit = MemberEdit {
        nickname: Some("Ana C".into()),
        ..Default::default()
    };
    member.modify(edit.clone()).await.unwrap();
    assert_eq!(member.nickname().as_deref(), Some("Ana C"));

    assert_eq!(service.call_count(Operation::Member), 2);
    assert_eq!(service.call_count(Operation::EditMember), 1);
    assert!(matches!(
        &service.calls()[3],
        Call::EditMember { user_id, edit: recorded, .. } if *user_id == UserId::new(10) && *recorded == edit
    ));
    service.verify();
}

#[tokio::test]
async fn test_update_of_departed_member_fails() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_member()
        .return_ok(Some(fixtures::member(1, 10, "ana")));
    service.expect_member().return_ok(None::<Member>);

    let mut member = channel.fetch_user(UserId::new(10)).await.unwrap().unwrap();
    let result = member.update().await;

    assert!(matches!(result, Err(ServiceError::Unknown { kind: "member", id: 10 })));
}

// --- Webhooks ---

#[tokio::test]
async fn test_webhooks_are_created_and_wrapped() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_create_webhook()
        .return_ok(fixtures::webhook(5, 42, "deploys"));
    service
        .expect_create_webhook()
        .return_ok(fixtures::webhook(6, 42, "alerts"));

    let avatar = FileUpload::new("hook.png", vec![1, 2, 3]);
    let webhook = channel.create_webhook("deploys", Some(avatar.clone())).await.unwrap();
    let posted = channel.post_webhook("alerts", None).await.unwrap();

    assert_eq!(webhook.id(), WebhookId::new(5));
    assert_eq!(webhook.name().as_deref(), Some("deploys"));
    assert_eq!(webhook.channel_id(), Some(ChannelId::new(42)));
    assert_eq!(webhook.guild_id(), Some(GuildId::new(1)));
    assert!(webhook.avatar_id().is_none());
    assert_eq!(webhook.creator().map(|user| user.username()).as_deref(), Some("creator"));
    assert_eq!(posted.rest_creator().map(|user| user.id()), Some(UserId::new(1)));

    assert_eq!(service.call_count(Operation::CreateWebhook), 2);
    let calls = service.calls();
    assert!(matches!(
        &calls[1],
        Call::CreateWebhook { name, avatar: Some(sent), .. } if name == "deploys" && *sent == avatar
    ));
    assert!(matches!(&calls[2], Call::CreateWebhook { name, avatar: None, .. } if name == "alerts"));
    service.verify();
}

#[tokio::test]
async fn test_webhook_listings_forward() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_webhooks()
        .return_ok(vec![fixtures::webhook(5, 42, "a"), fixtures::webhook(6, 42, "b")]);
    service
        .expect_webhooks()
        .return_ok(vec![fixtures::webhook(7, 42, "c")]);
    service
        .expect_webhook()
        .return_ok(Some(fixtures::webhook(5, 42, "a")));
    service
        .expect_webhook()
        .return_ok(Some(fixtures::webhook(8, 99, "elsewhere")));

    let listed = channel.get_webhooks().await.unwrap();
    let fetched = channel.fetch_webhooks().await.unwrap();
    let found = channel.get_webhook(WebhookId::new(5)).await.unwrap();
    let foreign = channel.fetch_webhook(WebhookId::new(8)).await.unwrap();

    assert_eq!(
        listed.iter().map(|hook| hook.id()).collect::<Vec<_>>(),
        vec![WebhookId::new(5), WebhookId::new(6)]
    );
    assert_eq!(fetched.len(), 1);
    assert_eq!(found.map(|hook| hook.id()), Some(WebhookId::new(5)));
    assert!(foreign.is_none());
    assert_eq!(service.call_count(Operation::Webhooks), 2);
    assert_eq!(service.call_count(Operation::Webhook), 2);
    service.verify();
}

#[tokio::test]
async fn test_webhook_deletes_itself() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_webhooks()
        .return_ok(vec![fixtures::webhook(5, 42, "old")]);
    service.expect_delete_webhook().return_ok(());

    let webhooks = channel.get_webhooks().await.unwrap();
    webhooks[0].delete().await.unwrap();

    assert_eq!(service.call_count(Operation::DeleteWebhook), 1);
    assert!(matches!(
        service.calls()[2],
        Call::DeleteWebhook { webhook_id } if webhook_id == WebhookId::new(5)
    ));
    service.verify();
}

// --- Invites ---

#[tokio::test]
async fn test_invites_are_wrapped() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service
        .expect_invites()
        .return_ok(vec![fixtures::invite("abc", 42), fixtures::invite("xyz", 42)]);

    let invites = channel.get_invites().await.unwrap();

    assert_eq!(
        invites.iter().map(|i| i.url()).collect::<Vec<_>>(),
        vec!["https://discord.gg/abc", "https://discord.gg/xyz"]
    );
    let invite = &invites[0];
    assert_eq!(invite.code(), "abc");
    assert_eq!(invite.channel_id(), ChannelId::new(42));
    assert!(invite.guild_id().is_none());
    assert_eq!(invite.inviter().map(|user| user.username()).as_deref(), Some("inviter"));
    assert_eq!(invite.max_age(), 86_400);
    assert_eq!(invite.max_uses(), 0);
    assert_eq!(invite.uses(), 0);
    assert!(!invite.is_temporary());
    assert_eq!(invite.created_at(), Timestamp::parse("2026-01-01T00:00:00Z").unwrap());
    service.verify();
}

#[tokio::test]
async fn test_invite_creation_and_deletion_forward() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_create_invite().return_ok(fixtures::invite("new", 42));
    service.expect_delete_invite().return_ok(());

    let settings = InviteSettings {
        max_age: 3_600,
        max_uses: 5,
        ..Default::default()
    };
    let invite = channel.create_invite(settings).await.unwrap();
    invite.delete().await.unwrap();

    let calls = service.calls();
    assert!(matches!(
        &calls[1],
        Call::CreateInvite { channel_id, settings: sent } if *channel_id == ChannelId::new(42) && *sent == settings
    ));
    assert!(matches!(&calls[2], Call::DeleteInvite { code } if code == "new"));
    assert_eq!(service.call_count(Operation::CreateInvite), 1);
    assert_eq!(service.call_count(Operation::DeleteInvite), 1);
    service.verify();
}

// --- Permissions ---

#[tokio::test]
async fn test_sync_permissions_forwards_through_wrapper() {
    let service = Arc::new(MockService::new());
    service
        .expect_channel()
        .return_ok(Some(Channel::Guild(fixtures::text_channel_in(42, 1, 9))));
    service
        .expect_channel()
        .return_ok(Some(Channel::Guild(fixtures::category(9, 1))));
    service
        .expect_edit_channel()
        .return_ok(fixtures::text_channel_in(42, 1, 9));

    let mut channel = client(&service)
        .fetch_text_channel(ChannelId::new(42))
        .await
        .unwrap()
        .unwrap();
    channel.sync_permissions().await.unwrap();

    assert!(matches!(
        &service.calls()[2],
        Call::EditChannel { edit, .. } if edit.permission_overwrites.as_ref().is_some_and(Vec::is_empty)
    ));
    service.verify();
}

// --- Typing ---

#[tokio::test]
async fn test_typing_state_ends_when_trigger_fails() {
    let service = Arc::new(MockService::new());
    let channel = wrapped_channel(&service).await;
    service.expect_broadcast_typing().return_err(denied());

    let typing = channel.enter_typing_state().unwrap();
    assert_eq!(typing.channel_id(), ChannelId::new(42));
    tokio::time::timeout(Duration::from_secs(2), async {
        while typing.is_active() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("typing task kept running");

    assert_eq!(service.call_count(Operation::BroadcastTyping), 1);
}

#[test]
fn test_typing_state_requires_a_runtime() {
    let service = Arc::new(MockService::new());
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let channel = runtime.block_on(wrapped_channel(&service));
    drop(runtime);

    let result = channel.enter_typing_state();

    assert!(matches!(result, Err(ServiceError::NoRuntime(_))));
    assert_eq!(service.call_count(Operation::BroadcastTyping), 0);
}
