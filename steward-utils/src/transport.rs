//! Transport adapter contract.
//!
//! Prompts and menus only talk to Discord through [`Transport`], which keeps
//! the flow logic independent of the gateway/HTTP stack and lets tests script
//! inbound events.

use std::time::Duration;

use async_trait::async_trait;
use twilight_model::{
    channel::{
        Message,
        message::{EmojiReactionType, embed::Embed},
    },
    gateway::GatewayReaction,
    guild::Permissions,
    id::{
        Id,
        marker::{ChannelMarker, EmojiMarker, GuildMarker, MessageMarker, RoleMarker, UserMarker},
    },
};

use crate::parse::parse_channel_mentions;

/// A message the bot can edit, delete or react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel_id: Id<ChannelMarker>,
    pub message_id: Id<MessageMarker>,
}

impl MessageRef {
    pub fn new(channel_id: Id<ChannelMarker>, message_id: Id<MessageMarker>) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

/// Outbound message body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessagePayload {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

impl MessagePayload {
    pub fn embed(embed: Embed) -> Self {
        Self {
            content: None,
            embeds: vec![embed],
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embeds: Vec::new(),
        }
    }
}

/// A message received from the gateway, reduced to what flows inspect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: Id<MessageMarker>,
    pub guild_id: Option<Id<GuildMarker>>,
    pub channel_id: Id<ChannelMarker>,
    pub author_id: Id<UserMarker>,
    pub author_bot: bool,
    pub content: String,
    pub role_mentions: Vec<Id<RoleMarker>>,
}

impl InboundMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(self.channel_id, self.id)
    }

    /// Channels mentioned with `<#id>` markup, in order of appearance.
    pub fn channel_mentions(&self) -> Vec<Id<ChannelMarker>> {
        parse_channel_mentions(&self.content)
    }
}

impl From<&Message> for InboundMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            guild_id: message.guild_id,
            channel_id: message.channel_id,
            author_id: message.author.id,
            author_bot: message.author.bot,
            content: message.content.clone(),
            role_mentions: message.mention_roles.clone(),
        }
    }
}

/// Reaction emoji as seen on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReactionEmoji {
    Custom {
        id: Id<EmojiMarker>,
        name: Option<String>,
        animated: bool,
    },
    Unicode(String),
}

impl ReactionEmoji {
    pub fn unicode(name: &str) -> Self {
        Self::Unicode(name.to_owned())
    }

    pub fn as_unicode(&self) -> Option<&str> {
        match self {
            Self::Unicode(name) => Some(name),
            Self::Custom { .. } => None,
        }
    }
}

impl From<&EmojiReactionType> for ReactionEmoji {
    fn from(emoji: &EmojiReactionType) -> Self {
        match emoji {
            EmojiReactionType::Custom { animated, id, name } => Self::Custom {
                id: *id,
                name: name.clone(),
                animated: *animated,
            },
            EmojiReactionType::Unicode { name } => Self::Unicode(name.clone()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionKind {
    Added,
    Removed,
}

/// A reaction add/remove event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionEvent {
    pub kind: ReactionKind,
    pub guild_id: Option<Id<GuildMarker>>,
    pub channel_id: Id<ChannelMarker>,
    pub message_id: Id<MessageMarker>,
    pub user_id: Id<UserMarker>,
    pub emoji: ReactionEmoji,
}

impl ReactionEvent {
    pub fn from_gateway(kind: ReactionKind, reaction: &GatewayReaction) -> Self {
        Self {
            kind,
            guild_id: reaction.guild_id,
            channel_id: reaction.channel_id,
            message_id: reaction.message_id,
            user_id: reaction.user_id,
            emoji: ReactionEmoji::from(&reaction.emoji),
        }
    }
}

/// A guild emoji the bot can use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomEmoji {
    pub id: Id<EmojiMarker>,
    pub name: String,
    pub animated: bool,
}

pub type MessagePredicate = Box<dyn Fn(&InboundMessage) -> bool + Send + Sync>;
pub type ReactionPredicate = Box<dyn Fn(&ReactionEvent) -> bool + Send + Sync>;

/// The command message that started a flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub guild_id: Option<Id<GuildMarker>>,
    pub channel_id: Id<ChannelMarker>,
    pub message_id: Id<MessageMarker>,
    pub author_id: Id<UserMarker>,
}

impl Invocation {
    pub fn from_message(message: &InboundMessage) -> Self {
        Self {
            guild_id: message.guild_id,
            channel_id: message.channel_id,
            message_id: message.id,
            author_id: message.author_id,
        }
    }

    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(self.channel_id, self.message_id)
    }

    /// Matches text replies from the invoker in the invoking channel.
    pub fn reply_filter(&self) -> MessagePredicate {
        let author_id = self.author_id;
        let channel_id = self.channel_id;
        Box::new(move |message| message.author_id == author_id && message.channel_id == channel_id)
    }

    /// Matches reactions added by the invoker on `target`.
    pub fn reaction_filter(&self, target: MessageRef) -> ReactionPredicate {
        let author_id = self.author_id;
        Box::new(move |event| {
            event.kind == ReactionKind::Added
                && event.user_id == author_id
                && event.message_id == target.message_id
        })
    }
}

/// Outbound Discord operations plus the two "await next matching event"
/// suspend points used by prompts and menus.
///
/// `await_*` return `None` when the timeout elapses first.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(
        &self,
        channel_id: Id<ChannelMarker>,
        payload: &MessagePayload,
    ) -> anyhow::Result<MessageRef>;

    async fn edit_message(&self, message: MessageRef, payload: &MessagePayload)
    -> anyhow::Result<()>;

    async fn delete_message(&self, message: MessageRef) -> anyhow::Result<()>;

    async fn add_reaction(&self, message: MessageRef, emoji: &ReactionEmoji) -> anyhow::Result<()>;

    /// Remove the bot's own reaction.
    async fn remove_own_reaction(
        &self,
        message: MessageRef,
        emoji: &ReactionEmoji,
    ) -> anyhow::Result<()>;

    /// Remove another user's reaction.
    async fn remove_reaction(
        &self,
        message: MessageRef,
        emoji: &ReactionEmoji,
        user_id: Id<UserMarker>,
    ) -> anyhow::Result<()>;

    /// Remove every reaction of one emoji.
    async fn clear_reaction(&self, message: MessageRef, emoji: &ReactionEmoji)
    -> anyhow::Result<()>;

    async fn await_message(
        &self,
        predicate: MessagePredicate,
        timeout: Duration,
    ) -> Option<InboundMessage>;

    async fn await_reaction(
        &self,
        predicate: ReactionPredicate,
        timeout: Duration,
    ) -> Option<ReactionEvent>;

    /// Resolve a custom emoji the bot can use, `None` when inaccessible.
    async fn resolve_custom_emoji(
        &self,
        guild_id: Id<GuildMarker>,
        emoji_id: Id<EmojiMarker>,
    ) -> anyhow::Result<Option<CustomEmoji>>;

    async fn add_member_role(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
        role_id: Id<RoleMarker>,
    ) -> anyhow::Result<()>;

    async fn remove_member_role(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
        role_id: Id<RoleMarker>,
    ) -> anyhow::Result<()>;

    /// Effective guild-level permissions of a member.
    async fn member_permissions(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
    ) -> anyhow::Result<Permissions>;
}
