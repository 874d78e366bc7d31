//! A context wired to the in-memory transport and state backend.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use steward_core::{Config, Context};
use steward_database::state::{DataStore, MemoryBackend};
use steward_utils::{
    memory::MemoryTransport,
    pagination::glyph::NUMBER_GLYPHS,
    transport::{InboundMessage, MessageRef, ReactionEmoji},
};
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, GuildMarker, UserMarker},
};

pub const GUILD: Id<GuildMarker> = Id::new(1);
pub const CHANNEL: Id<ChannelMarker> = Id::new(2);
pub const USER: Id<UserMarker> = Id::new(3);
pub const BOT: Id<UserMarker> = Id::new(99);
pub const MESSAGE_LOG: Id<ChannelMarker> = Id::new(78);
pub const ROLE_LOG: Id<ChannelMarker> = Id::new(77);

pub struct Harness {
    pub transport: Arc<MemoryTransport>,
    pub backend: Arc<MemoryBackend>,
    pub ctx: Context,
}

impl Harness {
    pub fn new() -> Self {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DISCORD_TOKEN", "token"),
            ("DATABASE_URL", "postgres://localhost/steward"),
            ("CUSTOM_MESSAGE_LOG_CHANNEL_ID", "78"),
            ("ROLE_REACTION_LOG_CHANNEL_ID", "77"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|value| (*value).to_owned()))
            .expect("test config is valid");

        let transport = Arc::new(MemoryTransport::new());
        let backend = Arc::new(MemoryBackend::new());
        let store = Arc::new(DataStore::new(backend.clone()));
        let ctx = Context::new(transport.clone(), store, Arc::new(config), BOT);

        Self {
            transport,
            backend,
            ctx,
        }
    }

    /// A message from the test user in the test channel, not yet queued.
    pub fn message(&self, content: &str) -> InboundMessage {
        self.transport
            .user_message(Some(GUILD), CHANNEL, USER, content)
    }

    pub fn push(&self, message: InboundMessage) {
        self.transport.push_message(message);
    }

    /// Queue several replies at once.
    pub fn say(&self, replies: &[&str]) {
        for reply in replies {
            let message = self.message(reply);
            self.push(message);
        }
    }

    /// Where the `offset`-th message sent from now will land.
    pub fn upcoming(&self, channel_id: Id<ChannelMarker>, offset: u64) -> MessageRef {
        let next = self.transport.peek_next_message(channel_id);
        MessageRef::new(channel_id, Id::new(next.message_id.get() + offset))
    }

    pub fn react(&self, target: MessageRef, glyph: &str) {
        self.transport
            .push_reaction_add(Some(GUILD), target, USER, ReactionEmoji::unicode(glyph));
    }

    /// Pick the `slot`-th (0-based) entry of a selector menu.
    pub fn pick(&self, menu: MessageRef, slot: usize) {
        self.react(menu, NUMBER_GLYPHS[slot]);
    }
}
