//! Scripted, process-local [`Transport`].
//!
//! Inbound events are queued up front and consumed in order by the
//! `await_*` calls. Events that do not satisfy the waiting predicate are
//! dropped, and an exhausted queue behaves like an elapsed timeout. Every
//! outbound call is recorded for assertions.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use anyhow::bail;
use async_trait::async_trait;
use twilight_model::{
    guild::Permissions,
    id::{
        Id,
        marker::{ChannelMarker, EmojiMarker, GuildMarker, MessageMarker, RoleMarker, UserMarker},
    },
};

use crate::{
    parse::parse_role_mentions,
    transport::{
        CustomEmoji, InboundMessage, MessagePayload, MessagePredicate, MessageRef, ReactionEmoji,
        ReactionEvent, ReactionKind, ReactionPredicate, Transport,
    },
};

const FIRST_SNOWFLAKE: u64 = 1_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    Message(InboundMessage),
    Reaction(ReactionEvent),
}

/// One recorded outbound operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Send {
        message: MessageRef,
        payload: MessagePayload,
    },
    Edit {
        message: MessageRef,
        payload: MessagePayload,
    },
    Delete(MessageRef),
    AddReaction {
        message: MessageRef,
        emoji: ReactionEmoji,
    },
    RemoveOwnReaction {
        message: MessageRef,
        emoji: ReactionEmoji,
    },
    RemoveReaction {
        message: MessageRef,
        emoji: ReactionEmoji,
        user_id: Id<UserMarker>,
    },
    ClearReaction {
        message: MessageRef,
        emoji: ReactionEmoji,
    },
    AddRole {
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
        role_id: Id<RoleMarker>,
    },
    RemoveRole {
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
        role_id: Id<RoleMarker>,
    },
}

pub struct MemoryTransport {
    inbound: Mutex<VecDeque<Inbound>>,
    calls: Mutex<Vec<Call>>,
    emojis: Mutex<HashMap<Id<EmojiMarker>, CustomEmoji>>,
    permissions: Mutex<Permissions>,
    next_id: AtomicU64,
    fail_deletes: AtomicBool,
    fail_edits: AtomicBool,
    fail_reactions: AtomicBool,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self {
            inbound: Mutex::default(),
            calls: Mutex::default(),
            emojis: Mutex::default(),
            permissions: Mutex::new(Permissions::ADMINISTRATOR),
            next_id: AtomicU64::new(FIRST_SNOWFLAKE),
            fail_deletes: AtomicBool::new(false),
            fail_edits: AtomicBool::new(false),
            fail_reactions: AtomicBool::new(false),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_message_id(&self) -> Id<MessageMarker> {
        Id::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }

    /// Build a user message with a fresh id. Role mentions are read from
    /// `<@&id>` markup in `content`.
    pub fn user_message(
        &self,
        guild_id: Option<Id<GuildMarker>>,
        channel_id: Id<ChannelMarker>,
        author_id: Id<UserMarker>,
        content: &str,
    ) -> InboundMessage {
        InboundMessage {
            id: self.next_message_id(),
            guild_id,
            channel_id,
            author_id,
            author_bot: false,
            content: content.to_owned(),
            role_mentions: parse_role_mentions(content),
        }
    }

    pub fn push_message(&self, message: InboundMessage) {
        lock(&self.inbound).push_back(Inbound::Message(message));
    }

    pub fn push_reaction(&self, event: ReactionEvent) {
        lock(&self.inbound).push_back(Inbound::Reaction(event));
    }

    /// Queue a reaction added by `user_id` on `message`.
    pub fn push_reaction_add(
        &self,
        guild_id: Option<Id<GuildMarker>>,
        message: MessageRef,
        user_id: Id<UserMarker>,
        emoji: ReactionEmoji,
    ) {
        self.push_reaction(ReactionEvent {
            kind: ReactionKind::Added,
            guild_id,
            channel_id: message.channel_id,
            message_id: message.message_id,
            user_id,
            emoji,
        });
    }

    /// Id the next created message will receive.
    pub fn peek_next_message(&self, channel_id: Id<ChannelMarker>) -> MessageRef {
        MessageRef::new(channel_id, Id::new(self.next_id.load(Ordering::Relaxed)))
    }

    pub fn register_emoji(&self, emoji: CustomEmoji) {
        lock(&self.emojis).insert(emoji.id, emoji);
    }

    pub fn set_permissions(&self, permissions: Permissions) {
        *lock(&self.permissions) = permissions;
    }

    /// Make every delete fail, as if the message had already vanished.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::Relaxed);
    }

    /// Make every edit fail.
    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::Relaxed);
    }

    /// Make every bot reaction add fail, as with missing permissions.
    pub fn fail_reactions(&self, fail: bool) {
        self.fail_reactions.store(fail, Ordering::Relaxed);
    }

    pub fn pending_inbound(&self) -> usize {
        lock(&self.inbound).len()
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Messages created by the bot, in order.
    pub fn sent(&self) -> Vec<(MessageRef, MessagePayload)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send { message, payload } => Some((message, payload)),
                _ => None,
            })
            .collect()
    }

    /// Messages created in a given channel.
    pub fn sent_to(&self, channel_id: Id<ChannelMarker>) -> Vec<(MessageRef, MessagePayload)> {
        self.sent()
            .into_iter()
            .filter(|(message, _)| message.channel_id == channel_id)
            .collect()
    }

    /// Latest content of a bot message, following edits.
    pub fn latest_payload(&self, target: MessageRef) -> Option<MessagePayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send { message, payload } | Call::Edit { message, payload }
                    if message == target =>
                {
                    Some(payload)
                }
                _ => None,
            })
            .last()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn was_deleted(&self, target: MessageRef) -> bool {
        self.deleted().contains(&target)
    }

    /// Bot reactions currently on a message: adds minus own removals and
    /// clears, in insertion order.
    pub fn own_reactions(&self, target: MessageRef) -> Vec<ReactionEmoji> {
        let mut current: Vec<ReactionEmoji> = Vec::new();

        for call in self.calls() {
            match call {
                Call::AddReaction { message, emoji } if message == target => {
                    if !current.contains(&emoji) {
                        current.push(emoji);
                    }
                }
                Call::RemoveOwnReaction { message, emoji }
                | Call::ClearReaction { message, emoji }
                    if message == target =>
                {
                    current.retain(|existing| existing != &emoji);
                }
                _ => {}
            }
        }

        current
    }

    /// Every reaction-add call made on a message, including later-removed ones.
    pub fn reactions_added(&self, target: MessageRef) -> Vec<ReactionEmoji> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::AddReaction { message, emoji } if message == target => Some(emoji),
                _ => None,
            })
            .collect()
    }

    pub fn role_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::AddRole { .. } | Call::RemoveRole { .. }))
            .collect()
    }

    fn next_inbound(&self) -> Option<Inbound> {
        lock(&self.inbound).pop_front()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send_message(
        &self,
        channel_id: Id<ChannelMarker>,
        payload: &MessagePayload,
    ) -> anyhow::Result<MessageRef> {
        let message = MessageRef::new(channel_id, self.next_message_id());
        self.record(Call::Send {
            message,
            payload: payload.clone(),
        });
        Ok(message)
    }

    async fn edit_message(
        &self,
        message: MessageRef,
        payload: &MessagePayload,
    ) -> anyhow::Result<()> {
        if self.fail_edits.load(Ordering::Relaxed) {
            bail!("cannot edit message {}", message.message_id);
        }
        self.record(Call::Edit {
            message,
            payload: payload.clone(),
        });
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> anyhow::Result<()> {
        if self.fail_deletes.load(Ordering::Relaxed) {
            bail!("unknown message {}", message.message_id);
        }
        self.record(Call::Delete(message));
        Ok(())
    }

    async fn add_reaction(&self, message: MessageRef, emoji: &ReactionEmoji) -> anyhow::Result<()> {
        if self.fail_reactions.load(Ordering::Relaxed) {
            bail!("missing permission to react on {}", message.message_id);
        }
        self.record(Call::AddReaction {
            message,
            emoji: emoji.clone(),
        });
        Ok(())
    }

    async fn remove_own_reaction(
        &self,
        message: MessageRef,
        emoji: &ReactionEmoji,
    ) -> anyhow::Result<()> {
        self.record(Call::RemoveOwnReaction {
            message,
            emoji: emoji.clone(),
        });
        Ok(())
    }

    async fn remove_reaction(
        &self,
        message: MessageRef,
        emoji: &ReactionEmoji,
        user_id: Id<UserMarker>,
    ) -> anyhow::Result<()> {
        self.record(Call::RemoveReaction {
            message,
            emoji: emoji.clone(),
            user_id,
        });
        Ok(())
    }

    async fn clear_reaction(
        &self,
        message: MessageRef,
        emoji: &ReactionEmoji,
    ) -> anyhow::Result<()> {
        self.record(Call::ClearReaction {
            message,
            emoji: emoji.clone(),
        });
        Ok(())
    }

    async fn await_message(
        &self,
        predicate: MessagePredicate,
        _timeout: Duration,
    ) -> Option<InboundMessage> {
        while let Some(event) = self.next_inbound() {
            if let Inbound::Message(message) = event
                && predicate(&message)
            {
                return Some(message);
            }
        }
        None
    }

    async fn await_reaction(
        &self,
        predicate: ReactionPredicate,
        _timeout: Duration,
    ) -> Option<ReactionEvent> {
        while let Some(event) = self.next_inbound() {
            if let Inbound::Reaction(reaction) = event
                && predicate(&reaction)
            {
                return Some(reaction);
            }
        }
        None
    }

    async fn resolve_custom_emoji(
        &self,
        _guild_id: Id<GuildMarker>,
        emoji_id: Id<EmojiMarker>,
    ) -> anyhow::Result<Option<CustomEmoji>> {
        Ok(lock(&self.emojis).get(&emoji_id).cloned())
    }

    async fn add_member_role(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
        role_id: Id<RoleMarker>,
    ) -> anyhow::Result<()> {
        self.record(Call::AddRole {
            guild_id,
            user_id,
            role_id,
        });
        Ok(())
    }

    async fn remove_member_role(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
        role_id: Id<RoleMarker>,
    ) -> anyhow::Result<()> {
        self.record(Call::RemoveRole {
            guild_id,
            user_id,
            role_id,
        });
        Ok(())
    }

    async fn member_permissions(
        &self,
        _guild_id: Id<GuildMarker>,
        _user_id: Id<UserMarker>,
    ) -> anyhow::Result<Permissions> {
        Ok(*lock(&self.permissions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unmatched_events_are_dropped() {
        let transport = MemoryTransport::new();
        let channel = Id::new(1);
        let stranger = transport.user_message(None, channel, Id::new(2), "hello");
        let author = transport.user_message(None, channel, Id::new(3), "mine");
        transport.push_message(stranger);
        transport.push_message(author.clone());

        let wanted = Id::new(3);
        let reply = transport
            .await_message(
                Box::new(move |message| message.author_id == wanted),
                Duration::from_secs(1),
            )
            .await;

        assert_eq!(reply, Some(author));
        assert_eq!(transport.pending_inbound(), 0);
    }

    #[tokio::test]
    async fn empty_queue_times_out() {
        let transport = MemoryTransport::new();
        let reply = transport
            .await_reaction(Box::new(|_| true), Duration::from_secs(1))
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn own_reactions_track_removals() {
        let transport = MemoryTransport::new();
        let message = transport
            .send_message(Id::new(1), &MessagePayload::text("menu"))
            .await
            .unwrap();
        let one = ReactionEmoji::unicode("1");
        let two = ReactionEmoji::unicode("2");

        transport.add_reaction(message, &one).await.unwrap();
        transport.add_reaction(message, &two).await.unwrap();
        transport.remove_own_reaction(message, &one).await.unwrap();

        assert_eq!(transport.own_reactions(message), vec![two]);
    }

    #[test]
    fn role_mentions_are_parsed_from_content() {
        let transport = MemoryTransport::new();
        let message = transport.user_message(None, Id::new(1), Id::new(2), "<@&55>");
        assert_eq!(message.role_mentions, vec![Id::new(55)]);
    }
}
