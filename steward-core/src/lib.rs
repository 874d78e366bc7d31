use std::sync::Arc;

use steward_database::state::DataStore;
use steward_utils::{embed::EmbedStyle, transport::Transport};
use twilight_model::id::{Id, marker::UserMarker};

/// Typed configuration read from the environment.
pub mod config;

pub use config::{Config, ConfigError};

/// Shared application context passed into command handlers.
///
/// Cheap to clone because it only stores reference-counted shared state.
#[derive(Clone)]
pub struct Context {
    pub transport: Arc<dyn Transport>,
    pub store: Arc<DataStore>,
    pub config: Arc<Config>,
    /// The bot's own user, used to ignore its reactions and messages.
    pub bot_user_id: Id<UserMarker>,
}

impl Context {
    /// Create a new application context.
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<DataStore>,
        config: Arc<Config>,
        bot_user_id: Id<UserMarker>,
    ) -> Self {
        Self {
            transport,
            store,
            config,
            bot_user_id,
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn style(&self) -> &EmbedStyle {
        &self.config.embed
    }
}
