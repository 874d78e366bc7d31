//! Role reactions: a message whose reactions hand out roles.

pub mod bindings;
pub mod create;
pub mod delete;
pub mod edit;
pub mod embeds;
pub mod emoji;
pub mod lifecycle;
pub mod listener;

use embeds::entry_line;

use crate::{CommandMeta, reply, require_manager};
use steward_core::Context;
use steward_database::model::RoleReaction;
use steward_utils::{
    pagination::{ListPageSource, ReactionMenu},
    transport::Invocation,
};

pub const META: CommandMeta = CommandMeta {
    name: "rr",
    aliases: &["rrs", "rolereaction", "rolereactions"],
    desc: "Lists every role reaction of this server and whether it is active.",
    category: "roles",
    usage: "!rr [create|delete|edit|start|stop]",
};

pub async fn run(ctx: Context, invocation: Invocation, arg1: Option<&str>) -> anyhow::Result<()> {
    match arg1.map(str::to_ascii_lowercase).as_deref() {
        Some("create" | "add" | "new") => create::run(ctx, invocation).await,
        Some("delete" | "del" | "remove" | "rem") => delete::run(ctx, invocation).await,
        Some("edit" | "change") => edit::run(ctx, invocation).await,
        Some("start" | "activate") => lifecycle::start(ctx, invocation).await,
        Some("stop" | "deactivate") => lifecycle::stop(ctx, invocation).await,
        _ => browse(ctx, invocation).await,
    }
}

async fn browse(ctx: Context, invocation: Invocation) -> anyhow::Result<()> {
    if !require_manager(&ctx, &invocation).await? {
        return Ok(());
    }

    let records = guild_records(&ctx, &invocation, Filter::Any).await?;
    if records.is_empty() {
        return reply_empty(&ctx, &invocation, Filter::Any).await;
    }

    let source = ListPageSource::new(
        ctx.style().clone(),
        "Role Reactions",
        records.iter().map(entry_line).collect(),
    )
    .per_page(ctx.config.menu_page_size);

    ReactionMenu::new(ctx.transport(), source, invocation, ctx.config.menu_options())
        .run()
        .await?;

    Ok(())
}

/// Which records a picker offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Filter {
    Any,
    Active,
    Inactive,
}

impl Filter {
    fn admits(self, record: &RoleReaction) -> bool {
        match self {
            Self::Any => true,
            Self::Active => record.is_active(),
            Self::Inactive => !record.is_active(),
        }
    }
}

/// Records of the invoking guild that pass `filter`, in stored order.
pub(crate) async fn guild_records(
    ctx: &Context,
    invocation: &Invocation,
    filter: Filter,
) -> anyhow::Result<Vec<RoleReaction>> {
    let Some(guild_id) = invocation.guild_id else {
        return Ok(Vec::new());
    };

    Ok(ctx
        .store
        .role_reactions
        .load()
        .await?
        .into_iter()
        .filter(|record| record.guild_id == guild_id.get() && filter.admits(record))
        .collect())
}

async fn reply_empty(ctx: &Context, invocation: &Invocation, filter: Filter) -> anyhow::Result<()> {
    let prefix = ctx.config.prefix.as_str();
    let (title, description) = match filter {
        Filter::Any => (
            "No Role Reactions Registered",
            format!("There are no role reactions yet. Use `{prefix}rr create` to make one."),
        ),
        Filter::Inactive => (
            "Cannot Start Role Reactions",
            "Every role reaction is already active.".to_owned(),
        ),
        Filter::Active => (
            "Cannot Stop Role Reactions",
            format!("No role reaction is active. Use `{prefix}rr start` to start one."),
        ),
    };

    reply(ctx, invocation, ctx.style().simple(title, Some(&description))?).await
}

/// Let the invoker pick one record through a selector menu.
///
/// Replies with an explanation and returns `None` when there is nothing to
/// pick; also `None` when the menu is stopped or times out.
pub(crate) async fn pick_record(
    ctx: &Context,
    invocation: Invocation,
    title: &str,
    filter: Filter,
) -> anyhow::Result<Option<RoleReaction>> {
    let records = guild_records(ctx, &invocation, filter).await?;
    if records.is_empty() {
        reply_empty(ctx, &invocation, filter).await?;
        return Ok(None);
    }

    let source = ListPageSource::new(
        ctx.style().clone(),
        title,
        records.iter().map(entry_line).collect(),
    )
    .description("React with the number of the role reaction you want.")
    .per_page(ctx.config.menu_page_size)
    .selector(true);

    let options = ctx.config.menu_options();
    let selection = ReactionMenu::new(ctx.transport(), source, invocation, options)
        .run()
        .await?
        .into_selection();

    Ok(selection.and_then(|selection| records.get(selection.index).cloned()))
}

/// Swap `current` for `updated` in the store. `false` when `current` is gone.
pub(crate) async fn replace_record(
    ctx: &Context,
    current: &RoleReaction,
    updated: RoleReaction,
) -> anyhow::Result<bool> {
    ctx.store
        .role_reactions
        .update(|records| match records.iter_mut().find(|record| **record == *current) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        })
        .await
}

pub(crate) async fn remove_record(ctx: &Context, current: &RoleReaction) -> anyhow::Result<bool> {
    ctx.store
        .role_reactions
        .update(|records| match records.iter().position(|record| record == current) {
            Some(position) => {
                records.remove(position);
                true
            }
            None => false,
        })
        .await
}

pub(crate) async fn reply_changed(ctx: &Context, invocation: &Invocation) -> anyhow::Result<()> {
    reply(
        ctx,
        invocation,
        ctx.style().simple(
            "Role Reaction Changed",
            Some("That role reaction was changed while you were working on it. Please try again."),
        )?,
    )
    .await
}
