use twilight_model::channel::message::embed::{Embed, EmbedField};

use crate::{COMMANDS, CommandMeta, reply};
use steward_core::Context;
use steward_utils::{
    embed::{EmbedStyle, field},
    pagination::{FieldPageSource, ReactionMenu, parse_one_based_page},
    transport::Invocation,
};

pub const META: CommandMeta = CommandMeta {
    name: "help",
    aliases: &[],
    desc: "Lists out all available commands.",
    category: "general",
    usage: "!help [page|category|command]",
};

const CATEGORIES_PER_PAGE: usize = 3;

/// Browse the command catalog, one field per category, or show one command.
pub async fn run(
    ctx: Context,
    invocation: Invocation,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    let prefix = ctx.config.prefix.as_str();
    let categories = categories();

    let (shown, start_page) = match arg1 {
        None => (categories, 0),
        Some(raw) if raw.chars().all(|c| c.is_ascii_digit()) => {
            (categories, parse_one_based_page(Some(raw)).unwrap_or(0))
        }
        Some(raw) => {
            let wanted = raw.to_ascii_lowercase();

            if let Some(category) = categories.iter().copied().find(|c| *c == wanted) {
                (vec![category], 0)
            } else if let Some(command) = find_command(&wanted, arg_tail) {
                reply(&ctx, &invocation, command_detail(ctx.style(), prefix, command)?).await?;
                return Ok(());
            } else {
                let known = categories
                    .iter()
                    .map(|category| format!("`{category}`"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let embed = ctx.style().simple(
                    "Unknown Help Topic",
                    Some(&format!(
                        "There is no category or command named `{raw}`.\nCategories: {known}"
                    )),
                )?;
                reply(&ctx, &invocation, embed).await?;
                return Ok(());
            }
        }
    };

    let fields: Vec<EmbedField> = shown
        .iter()
        .map(|category| category_field(prefix, category))
        .collect();

    let source = FieldPageSource::new(
        ctx.style().clone(),
        "Available Commands",
        format!("Use `{prefix}help <command>` for details on a single command."),
        fields,
        CATEGORIES_PER_PAGE,
    );

    ReactionMenu::new(ctx.transport(), source, invocation, ctx.config.menu_options())
        .start_at(start_page)
        .run()
        .await?;

    Ok(())
}

/// Categories in catalog order, without duplicates.
fn categories() -> Vec<&'static str> {
    let mut categories: Vec<&'static str> = Vec::new();
    for command in COMMANDS {
        if !categories.contains(&command.category) {
            categories.push(command.category);
        }
    }
    categories
}

fn category_field(prefix: &str, category: &str) -> EmbedField {
    let lines = COMMANDS
        .iter()
        .filter(|command| command.category == category)
        .map(|command| format!("`{}` - {}", with_prefix(command.usage, prefix), command.desc))
        .collect::<Vec<_>>()
        .join("\n");

    field(title_case(category), lines, false)
}

/// Match `name` or `name tail` (for sub-commands) against names and aliases.
fn find_command(name: &str, tail: Option<&str>) -> Option<&'static CommandMeta> {
    let matches = |wanted: &str| {
        COMMANDS.iter().find(|command| {
            command.name.eq_ignore_ascii_case(wanted)
                || command
                    .aliases
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(wanted))
        })
    };

    tail.and_then(|tail| matches(&format!("{name} {}", tail.trim())))
        .or_else(|| matches(name))
}

fn command_detail(
    style: &EmbedStyle,
    prefix: &str,
    command: &CommandMeta,
) -> anyhow::Result<Embed> {
    let mut builder = style
        .builder()
        .title(format!("{prefix}{}", command.name))
        .description(command.desc)
        .field(field("Usage", format!("`{}`", with_prefix(command.usage, prefix)), false))
        .field(field("Category", title_case(command.category), true));

    if !command.aliases.is_empty() {
        let aliases = command
            .aliases
            .iter()
            .map(|alias| format!("`{prefix}{alias}`"))
            .collect::<Vec<_>>()
            .join(", ");
        builder = builder.field(field("Aliases", aliases, true));
    }

    Ok(builder.validate()?.build())
}

/// Usage strings are written with `!`; show them with the configured prefix.
fn with_prefix(usage: &str, prefix: &str) -> String {
    match usage.strip_prefix('!') {
        Some(rest) => format!("{prefix}{rest}"),
        None => usage.to_owned(),
    }
}

fn title_case(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_catalog_order() {
        assert_eq!(categories(), vec!["general", "messages", "roles"]);
    }

    #[test]
    fn sub_commands_resolve_before_parents() {
        assert_eq!(find_command("rr", Some("create")).map(|c| c.name), Some("rr create"));
        assert_eq!(find_command("rr", None).map(|c| c.name), Some("rr"));
        assert_eq!(find_command("msg", Some("nonsense")).map(|c| c.name), Some("message"));
    }

    #[test]
    fn usage_uses_configured_prefix() {
        assert_eq!(with_prefix("!help [page]", "?"), "?help [page]");
        assert_eq!(title_case("roles"), "Roles");
    }
}
