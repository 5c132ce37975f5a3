//! Request values handed to a [`ChatService`](crate::ChatService).
//!
//! These are plain data so a service can record or inspect them; the
//! serenity-backed service turns each one into the matching builder.

use serenity::builder::CreateEmbed;
use serenity::model::channel::PermissionOverwrite;
use serenity::model::id::{ChannelId, MessageId, RoleId};
use std::path::Path;

/// Number of messages requested when a caller does not pick a limit.
pub const DEFAULT_MESSAGE_LIMIT: u8 = 50;

/// Default `max_age` of a new invite, in seconds (one day).
pub const DEFAULT_INVITE_MAX_AGE: u32 = 86_400;

/// Whether a lookup may hit the network or must be answered locally.
///
/// A service without a cache answers `CacheOnly` with an absent or empty
/// result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    #[default]
    AllowDownload,
    CacheOnly,
}

impl CacheMode {
    pub fn allows_download(self) -> bool {
        matches!(self, CacheMode::AllowDownload)
    }
}

/// Side of an anchor message that a history request reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Older messages.
    #[default]
    Before,
    /// Newer messages.
    After,
    /// Messages on both sides of the anchor.
    Around,
}

/// One page of message history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuery {
    /// Anchor and direction; `None` reads the newest messages.
    pub anchor: Option<(Direction, MessageId)>,
    pub limit: u8,
}

impl MessageQuery {
    pub fn latest(limit: u8) -> Self {
        Self { anchor: None, limit }
    }

    pub fn from(anchor: MessageId, direction: Direction, limit: u8) -> Self {
        Self {
            anchor: Some((direction, anchor)),
            limit,
        }
    }
}

impl Default for MessageQuery {
    fn default() -> Self {
        Self::latest(DEFAULT_MESSAGE_LIMIT)
    }
}

/// A file attached to an outgoing message or used as an avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub data: Vec<u8>,
    pub is_spoiler: bool,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
            is_spoiler: false,
        }
    }

    /// Read `path` into an upload named after its last component.
    pub async fn from_path(path: &Path, is_spoiler: bool) -> crate::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self::new(filename, data).spoiler(is_spoiler))
    }

    pub fn spoiler(mut self, is_spoiler: bool) -> Self {
        self.is_spoiler = is_spoiler;
        self
    }

    /// Filename as sent to the platform; spoilers carry the `SPOILER_` prefix.
    pub fn wire_filename(&self) -> String {
        if self.is_spoiler && !self.filename.starts_with("SPOILER_") {
            format!("SPOILER_{}", self.filename)
        } else {
            self.filename.clone()
        }
    }
}

/// Content of an outgoing message.
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    pub content: String,
    pub tts: bool,
    pub embed: Option<CreateEmbed>,
    pub files: Vec<FileUpload>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_tts(mut self, tts: bool) -> Self {
        self.tts = tts;
        self
    }

    pub fn with_embed(mut self, embed: CreateEmbed) -> Self {
        self.embed = Some(embed);
        self
    }

    pub fn with_file(mut self, file: FileUpload) -> Self {
        self.files.push(file);
        self
    }
}

/// Edit of an existing message. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct MessageEdit {
    pub content: Option<String>,
    pub embed: Option<CreateEmbed>,
}

/// Partial update of a guild channel. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ChannelEdit {
    pub name: Option<String>,
    pub position: Option<u16>,
    pub topic: Option<String>,
    pub nsfw: Option<bool>,
    pub rate_limit_per_user: Option<u16>,
    pub category: Option<ChannelId>,
    pub permission_overwrites: Option<Vec<PermissionOverwrite>>,
}

/// Partial update of a guild member. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberEdit {
    pub nickname: Option<String>,
    pub roles: Option<Vec<RoleId>>,
}

/// Settings of a new invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InviteSettings {
    /// Lifetime in seconds; zero never expires.
    pub max_age: u32,
    /// Zero allows unlimited uses.
    pub max_uses: u8,
    pub temporary: bool,
    pub unique: bool,
}

impl Default for InviteSettings {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_INVITE_MAX_AGE,
            max_uses: 0,
            temporary: false,
            unique: false,
        }
    }
}
