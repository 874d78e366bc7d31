//! Conversions between stored, resolved and wire emoji.

use twilight_model::id::Id;

use steward_database::model::StoredEmoji;
use steward_utils::{prompt::TaggedEmoji, transport::ReactionEmoji};

pub fn stored_from_tagged(emoji: &TaggedEmoji) -> StoredEmoji {
    match emoji {
        TaggedEmoji::Custom(custom) => StoredEmoji::Custom {
            id: custom.id.get(),
            name: Some(custom.name.clone()),
            animated: custom.animated,
        },
        TaggedEmoji::Unicode(name) => StoredEmoji::Unicode { name: name.clone() },
    }
}

pub fn stored_from_reaction(emoji: &ReactionEmoji) -> StoredEmoji {
    match emoji {
        ReactionEmoji::Custom { id, name, animated } => StoredEmoji::Custom {
            id: id.get(),
            name: name.clone(),
            animated: *animated,
        },
        ReactionEmoji::Unicode(name) => StoredEmoji::Unicode { name: name.clone() },
    }
}

/// `None` only for a corrupt custom emoji id of zero.
pub fn reaction_from_stored(emoji: &StoredEmoji) -> Option<ReactionEmoji> {
    match emoji {
        StoredEmoji::Custom { id, name, animated } => Some(ReactionEmoji::Custom {
            id: Id::new_checked(*id)?,
            name: name.clone(),
            animated: *animated,
        }),
        StoredEmoji::Unicode { name } => Some(ReactionEmoji::Unicode(name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use steward_utils::transport::CustomEmoji;

    use super::*;

    #[test]
    fn custom_emoji_survive_the_round_trip() {
        let tagged = TaggedEmoji::Custom(CustomEmoji {
            id: Id::new(55),
            name: "party".to_owned(),
            animated: true,
        });

        let stored = stored_from_tagged(&tagged);
        let wire = reaction_from_stored(&stored).unwrap();

        assert!(stored_from_reaction(&wire).same_emoji(&stored));
        assert_eq!(
            wire,
            ReactionEmoji::Custom {
                id: Id::new(55),
                name: Some("party".to_owned()),
                animated: true,
            }
        );
    }

    #[test]
    fn zero_id_is_not_sent_to_discord() {
        let corrupt = StoredEmoji::Custom {
            id: 0,
            name: None,
            animated: false,
        };
        assert!(reaction_from_stored(&corrupt).is_none());
    }
}
