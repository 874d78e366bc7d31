//! Environment-driven configuration.

use std::time::Duration;

use steward_utils::{
    COMMAND_PREFIX,
    embed::{DEFAULT_EMBED_COLOR, EmbedStyle},
    pagination::{DEFAULT_TIMEOUT_SECS, MAX_PAGE_SIZE, MenuOptions, effective_page_size},
    parse::{parse_channel_id, parse_duration_seconds},
};
use thiserror::Error;
use twilight_model::id::{Id, marker::ChannelMarker};

const DEFAULT_PROMPT_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable `{0}`")]
    Missing(&'static str),
    #[error("environment variable `{key}` has an invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub prefix: String,
    /// How long a prompt waits for each reply.
    pub prompt_timeout: Duration,
    /// Idle timeout of reaction menus.
    pub menu_timeout: Duration,
    pub menu_page_size: usize,
    pub embed: EmbedStyle,
    pub custom_message_log_channel: Option<Id<ChannelMarker>>,
    pub role_reaction_log_channel: Option<Id<ChannelMarker>>,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let prompt_timeout = match get("PROMPT_TIMEOUT_SECS") {
            Some(raw) => parse_seconds("PROMPT_TIMEOUT_SECS", &raw)?,
            None => Duration::from_secs(DEFAULT_PROMPT_TIMEOUT_SECS),
        };
        let menu_timeout = match get("MENU_TIMEOUT_SECS") {
            Some(raw) => parse_seconds("MENU_TIMEOUT_SECS", &raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let menu_page_size = match get("MENU_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|size| *size >= 1)
                .map(effective_page_size)
                .ok_or(ConfigError::Invalid {
                    key: "MENU_PAGE_SIZE",
                    value: raw,
                })?,
            None => MAX_PAGE_SIZE,
        };

        let color = match get("EMBED_COLOR") {
            Some(raw) => parse_color(&raw).ok_or(ConfigError::Invalid {
                key: "EMBED_COLOR",
                value: raw,
            })?,
            None => DEFAULT_EMBED_COLOR,
        };

        Ok(Self {
            discord_token: require("DISCORD_TOKEN")?,
            database_url: require("DATABASE_URL")?,
            prefix: get("COMMAND_PREFIX").unwrap_or_else(|| COMMAND_PREFIX.to_string()),
            prompt_timeout,
            menu_timeout,
            menu_page_size,
            embed: EmbedStyle {
                color,
                footer: get("EMBED_FOOTER"),
            },
            custom_message_log_channel: optional_channel(
                "CUSTOM_MESSAGE_LOG_CHANNEL_ID",
                get("CUSTOM_MESSAGE_LOG_CHANNEL_ID"),
            )?,
            role_reaction_log_channel: optional_channel(
                "ROLE_REACTION_LOG_CHANNEL_ID",
                get("ROLE_REACTION_LOG_CHANNEL_ID"),
            )?,
        })
    }

    pub fn menu_options(&self) -> MenuOptions {
        MenuOptions {
            timeout: self.menu_timeout,
        }
    }
}

fn parse_seconds(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    parse_duration_seconds(raw)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            key,
            value: raw.to_owned(),
        })
}

fn optional_channel(
    key: &'static str,
    raw: Option<String>,
) -> Result<Option<Id<ChannelMarker>>, ConfigError> {
    raw.map(|value| {
        parse_channel_id(&value).ok_or(ConfigError::Invalid { key, value })
    })
    .transpose()
}

/// `#905430`, `0x905430` or plain hex.
fn parse_color(raw: &str) -> Option<u32> {
    let hex = raw
        .strip_prefix('#')
        .or_else(|| raw.strip_prefix("0x"))
        .unwrap_or(raw);

    u32::from_str_radix(hex, 16)
        .ok()
        .filter(|color| *color <= 0xFF_FF_FF)
}
