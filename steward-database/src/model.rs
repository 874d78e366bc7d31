//! Records produced by the guided flows and stored as JSON documents.
//!
//! Optional values are kept as `Option` without `skip_serializing_if`, so a
//! skipped step is written as an explicit `null` rather than a missing key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A custom embedded announcement built through `message create`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMessage {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub author: Option<MessageAuthor>,
    pub fields: Vec<MessageField>,
    /// Channels the message is posted to when sent.
    pub channels: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A self-assignable role menu: members react with an emoji to receive the
/// paired role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleReaction {
    pub title: String,
    pub description: Option<String>,
    pub roles: Vec<RoleBinding>,
    pub guild_id: u64,
    pub channel_id: u64,
    /// Live message carrying the reactions; `None` while inactive.
    pub message_id: Option<u64>,
}

impl RoleReaction {
    pub fn is_active(&self) -> bool {
        self.message_id.is_some()
    }

    /// Find the binding registered for an emoji.
    pub fn binding_for(&self, emoji: &StoredEmoji) -> Option<&RoleBinding> {
        self.roles.iter().find(|binding| binding.emoji.same_emoji(emoji))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    pub emoji: StoredEmoji,
    pub role_id: u64,
}

/// Emoji identity as persisted: custom guild emoji by id, unicode by glyph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredEmoji {
    Custom {
        id: u64,
        name: Option<String>,
        animated: bool,
    },
    Unicode {
        name: String,
    },
}

impl StoredEmoji {
    /// Compare identity only; a renamed custom emoji is still the same emoji.
    pub fn same_emoji(&self, other: &StoredEmoji) -> bool {
        match (self, other) {
            (Self::Custom { id: left, .. }, Self::Custom { id: right, .. }) => left == right,
            (Self::Unicode { name: left }, Self::Unicode { name: right }) => left == right,
            _ => false,
        }
    }
}

impl fmt::Display for StoredEmoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { id, name, animated } => {
                let prefix = if *animated { "a" } else { "" };
                let name = name.as_deref().unwrap_or("emoji");
                write!(f, "<{prefix}:{name}:{id}>")
            }
            Self::Unicode { name } => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_optionals_serialize_as_null() {
        let message = CustomMessage {
            title: "Rules".to_owned(),
            description: None,
            url: None,
            thumbnail: None,
            image: None,
            author: Some(MessageAuthor {
                name: "Staff".to_owned(),
                icon_url: None,
            }),
            fields: vec![],
            channels: vec![42],
        };

        let value = serde_json::to_value(&message).unwrap();
        let object = value.as_object().unwrap();

        for key in ["description", "url", "thumbnail", "image"] {
            assert!(object.contains_key(key), "missing key {key}");
            assert!(object[key].is_null());
        }
        assert!(object["author"]["icon_url"].is_null());
    }

    #[test]
    fn custom_emoji_identity_ignores_name() {
        let first = StoredEmoji::Custom {
            id: 7,
            name: Some("party".to_owned()),
            animated: false,
        };
        let renamed = StoredEmoji::Custom {
            id: 7,
            name: Some("celebrate".to_owned()),
            animated: false,
        };

        assert!(first.same_emoji(&renamed));
        assert!(!first.same_emoji(&StoredEmoji::Unicode {
            name: "🎉".to_owned()
        }));
    }

    #[test]
    fn emoji_display_matches_discord_markup() {
        let animated = StoredEmoji::Custom {
            id: 99,
            name: Some("wave".to_owned()),
            animated: true,
        };

        assert_eq!(animated.to_string(), "<a:wave:99>");
        assert_eq!(
            StoredEmoji::Unicode {
                name: "✅".to_owned()
            }
            .to_string(),
            "✅"
        );
    }
}
