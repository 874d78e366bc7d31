//! [`Transport`] over twilight's HTTP client and standby event waiter.
//!
//! The gateway loop must feed every event into the shared [`Standby`] and
//! run command handlers on spawned tasks; otherwise an awaiting prompt
//! blocks the loop that would deliver its reply.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::debug;
use twilight_http::{Client, request::channel::reaction::RequestReactionType};
use twilight_model::{
    gateway::event::Event,
    guild::Permissions,
    id::{
        Id,
        marker::{ChannelMarker, EmojiMarker, GuildMarker, RoleMarker, UserMarker},
    },
};
use twilight_standby::Standby;

use crate::{
    permissions::fold_role_permissions,
    transport::{
        CustomEmoji, InboundMessage, MessagePayload, MessagePredicate, MessageRef, ReactionEmoji,
        ReactionEvent, ReactionKind, ReactionPredicate, Transport,
    },
};

pub struct TwilightTransport {
    http: Arc<Client>,
    standby: Arc<Standby>,
}

impl TwilightTransport {
    pub fn new(http: Arc<Client>, standby: Arc<Standby>) -> Self {
        Self { http, standby }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }
}

fn request_emoji(emoji: &ReactionEmoji) -> RequestReactionType<'_> {
    match emoji {
        ReactionEmoji::Custom { id, name, .. } => RequestReactionType::Custom {
            id: *id,
            name: name.as_deref(),
        },
        ReactionEmoji::Unicode(name) => RequestReactionType::Unicode { name },
    }
}

fn reaction_event(event: &Event) -> Option<ReactionEvent> {
    match event {
        Event::ReactionAdd(reaction) => Some(ReactionEvent::from_gateway(
            ReactionKind::Added,
            &reaction.0,
        )),
        Event::ReactionRemove(reaction) => Some(ReactionEvent::from_gateway(
            ReactionKind::Removed,
            &reaction.0,
        )),
        _ => None,
    }
}

#[async_trait]
impl Transport for TwilightTransport {
    async fn send_message(
        &self,
        channel_id: Id<ChannelMarker>,
        payload: &MessagePayload,
    ) -> anyhow::Result<MessageRef> {
        let mut request = self.http.create_message(channel_id);
        if let Some(content) = payload.content.as_deref() {
            request = request.content(content);
        }
        if !payload.embeds.is_empty() {
            request = request.embeds(&payload.embeds);
        }

        let message = request.await?.model().await?;
        Ok(MessageRef::new(message.channel_id, message.id))
    }

    async fn edit_message(
        &self,
        message: MessageRef,
        payload: &MessagePayload,
    ) -> anyhow::Result<()> {
        self.http
            .update_message(message.channel_id, message.message_id)
            .content(payload.content.as_deref())
            .embeds(Some(&payload.embeds))
            .await?;
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> anyhow::Result<()> {
        self.http
            .delete_message(message.channel_id, message.message_id)
            .await?;
        Ok(())
    }

    async fn add_reaction(&self, message: MessageRef, emoji: &ReactionEmoji) -> anyhow::Result<()> {
        self.http
            .create_reaction(
                message.channel_id,
                message.message_id,
                &request_emoji(emoji),
            )
            .await?;
        Ok(())
    }

    async fn remove_own_reaction(
        &self,
        message: MessageRef,
        emoji: &ReactionEmoji,
    ) -> anyhow::Result<()> {
        self.http
            .delete_current_user_reaction(
                message.channel_id,
                message.message_id,
                &request_emoji(emoji),
            )
            .await?;
        Ok(())
    }

    async fn remove_reaction(
        &self,
        message: MessageRef,
        emoji: &ReactionEmoji,
        user_id: Id<UserMarker>,
    ) -> anyhow::Result<()> {
        self.http
            .delete_reaction(
                message.channel_id,
                message.message_id,
                &request_emoji(emoji),
                user_id,
            )
            .await?;
        Ok(())
    }

    async fn clear_reaction(
        &self,
        message: MessageRef,
        emoji: &ReactionEmoji,
    ) -> anyhow::Result<()> {
        self.http
            .delete_all_reaction(
                message.channel_id,
                message.message_id,
                &request_emoji(emoji),
            )
            .await?;
        Ok(())
    }

    async fn await_message(
        &self,
        predicate: MessagePredicate,
        timeout: Duration,
    ) -> Option<InboundMessage> {
        let waiter = self.standby.wait_for_event(move |event: &Event| match event {
            Event::MessageCreate(message) => predicate(&InboundMessage::from(&message.0)),
            _ => false,
        });

        match tokio::time::timeout(timeout, waiter).await {
            Ok(Ok(Event::MessageCreate(message))) => Some(InboundMessage::from(&message.0)),
            Ok(Ok(_)) => None,
            Ok(Err(source)) => {
                debug!(?source, "message waiter canceled");
                None
            }
            Err(_) => None,
        }
    }

    async fn await_reaction(
        &self,
        predicate: ReactionPredicate,
        timeout: Duration,
    ) -> Option<ReactionEvent> {
        let waiter = self.standby.wait_for_event(move |event: &Event| {
            reaction_event(event).is_some_and(|reaction| predicate(&reaction))
        });

        match tokio::time::timeout(timeout, waiter).await {
            Ok(Ok(event)) => reaction_event(&event),
            Ok(Err(source)) => {
                debug!(?source, "reaction waiter canceled");
                None
            }
            Err(_) => None,
        }
    }

    async fn resolve_custom_emoji(
        &self,
        guild_id: Id<GuildMarker>,
        emoji_id: Id<EmojiMarker>,
    ) -> anyhow::Result<Option<CustomEmoji>> {
        let response = match self.http.emoji(guild_id, emoji_id).await {
            Ok(response) => response,
            Err(source) => {
                debug!(
                    ?source,
                    guild_id = guild_id.get(),
                    emoji_id = emoji_id.get(),
                    "custom emoji is not accessible"
                );
                return Ok(None);
            }
        };

        let emoji = response.model().await?;
        Ok(Some(CustomEmoji {
            id: emoji.id,
            name: emoji.name,
            animated: emoji.animated,
        }))
    }

    async fn add_member_role(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
        role_id: Id<RoleMarker>,
    ) -> anyhow::Result<()> {
        self.http
            .add_guild_member_role(guild_id, user_id, role_id)
            .await?;
        Ok(())
    }

    async fn remove_member_role(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
        role_id: Id<RoleMarker>,
    ) -> anyhow::Result<()> {
        self.http
            .remove_guild_member_role(guild_id, user_id, role_id)
            .await?;
        Ok(())
    }

    async fn member_permissions(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
    ) -> anyhow::Result<Permissions> {
        let member = self
            .http
            .guild_member(guild_id, user_id)
            .await?
            .model()
            .await?;
        let roles = self.http.roles(guild_id).await?.model().await?;

        Ok(fold_role_permissions(guild_id, &member.roles, &roles))
    }
}
