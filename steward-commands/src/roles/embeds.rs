use twilight_model::channel::message::embed::{Embed, EmbedField};

use steward_database::model::{RoleBinding, RoleReaction};
use steward_utils::{
    embed::{EmbedStyle, field},
    time::now_timestamp,
};

/// `emoji - @role` lines, one per binding.
pub fn binding_lines(roles: &[RoleBinding]) -> String {
    if roles.is_empty() {
        return "None".to_owned();
    }

    roles
        .iter()
        .map(|binding| format!("{} - <@&{}>", binding.emoji, binding.role_id))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The message members react to.
pub fn live_embed(style: &EmbedStyle, record: &RoleReaction) -> anyhow::Result<Embed> {
    let lines = binding_lines(&record.roles);
    let description = match record.description.as_deref() {
        Some(description) => format!("{description}\n\n{lines}"),
        None => lines,
    };

    Ok(style
        .builder()
        .title(&record.title)
        .description(description)
        .validate()?
        .build())
}

pub fn jump_url(record: &RoleReaction) -> Option<String> {
    record.message_id.map(|message_id| {
        format!(
            "https://discord.com/channels/{}/{}/{message_id}",
            record.guild_id, record.channel_id
        )
    })
}

/// Menu line: active entries link to their live message.
pub fn entry_line(record: &RoleReaction) -> String {
    match jump_url(record) {
        Some(url) => format!("[{}]({url}) | Active: `True`", record.title),
        None => format!("{} | Active: `False`", record.title),
    }
}

pub fn record_fields(record: &RoleReaction) -> Vec<EmbedField> {
    vec![
        field(
            "Description",
            clip(record.description.as_deref().unwrap_or("None")),
            false,
        ),
        field("Role Reactions", clip(&binding_lines(&record.roles)), false),
        field("Channel", format!("<#{}>", record.channel_id), false),
    ]
}

/// Shorten text to fit an embed field value.
pub fn clip(text: &str) -> String {
    const FIELD_VALUE_LIMIT: usize = 1024;

    if text.chars().count() <= FIELD_VALUE_LIMIT {
        return text.to_owned();
    }
    let mut clipped: String = text.chars().take(FIELD_VALUE_LIMIT - 3).collect();
    clipped.push_str("...");
    clipped
}

/// Timestamped log entry for the role reaction log channel.
pub fn audit_entry(
    style: &EmbedStyle,
    title: &str,
    description: String,
    fields: Vec<EmbedField>,
) -> anyhow::Result<Embed> {
    let mut builder = style
        .builder()
        .title(title)
        .description(description)
        .timestamp(now_timestamp()?);
    for entry in fields {
        builder = builder.field(entry);
    }
    Ok(builder.validate()?.build())
}

#[cfg(test)]
mod tests {
    use steward_database::model::StoredEmoji;

    use super::*;

    fn record(message_id: Option<u64>) -> RoleReaction {
        RoleReaction {
            title: "Pronouns".to_owned(),
            description: Some("Pick yours".to_owned()),
            roles: vec![RoleBinding {
                emoji: StoredEmoji::Unicode {
                    name: "🟣".to_owned(),
                },
                role_id: 9,
            }],
            guild_id: 1,
            channel_id: 2,
            message_id,
        }
    }

    #[test]
    fn entry_lines_show_activity() {
        assert_eq!(
            entry_line(&record(Some(3))),
            "[Pronouns](https://discord.com/channels/1/2/3) | Active: `True`"
        );
        assert_eq!(entry_line(&record(None)), "Pronouns | Active: `False`");
    }

    #[test]
    fn clip_keeps_field_values_in_bounds() {
        assert_eq!(clip("short"), "short");
        let clipped = clip(&"x".repeat(2000));
        assert_eq!(clipped.chars().count(), 1024);
        assert!(clipped.ends_with("..."));
    }

    #[test]
    fn live_embed_lists_roles_under_description() {
        let embed = live_embed(&EmbedStyle::default(), &record(None)).unwrap();
        assert_eq!(embed.description.as_deref(), Some("Pick yours\n\n🟣 - <@&9>"));
    }
}
