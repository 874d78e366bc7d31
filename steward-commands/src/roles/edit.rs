//! `rr edit`: pick a role reaction, then pick what to change about it.

use tracing::{info, warn};
use twilight_model::channel::message::embed::{Embed, EmbedField};

use super::{
    Filter,
    bindings::{BindingLayout, collect_bindings},
    embeds::{audit_entry, binding_lines, clip, record_fields},
    emoji::reaction_from_stored,
    lifecycle::{activate, deactivate, live_message, rebuild, refresh_live},
    pick_record, replace_record, reply_changed,
};
use crate::{CommandMeta, post_audit, reply, require_manager};
use steward_core::Context;
use steward_database::model::RoleReaction;
use steward_utils::{
    embed::field,
    pagination::{ListPageSource, ReactionMenu},
    prompt::{
        Answer, DONE_TOKENS, FlowError, NONE_TOKENS, Prompt, Rejection, RepeatingSection, TextStep,
    },
    time::format_timeout,
    transport::Invocation,
};

pub const META: CommandMeta = CommandMeta {
    name: "rr edit",
    aliases: &["rr change"],
    desc: "Change the title, description, roles or channel of a role reaction.",
    category: "roles",
    usage: "!rr edit",
};

const CATEGORIES: [&str; 5] = [
    "Edit Title",
    "Edit Description",
    "Remove Role Reactions",
    "Add Role Reactions",
    "Edit Channel",
];

const TITLE_LIMIT: usize = 256;

pub async fn run(ctx: Context, invocation: Invocation) -> anyhow::Result<()> {
    if !require_manager(&ctx, &invocation).await? {
        return Ok(());
    }

    let Some(record) = pick_record(&ctx, invocation, "Edit Role Reactions", Filter::Any).await?
    else {
        return Ok(());
    };

    let source = ListPageSource::new(
        ctx.style().clone(),
        format!("Edit \"{}\"", record.title),
        CATEGORIES.iter().map(|category| (*category).to_owned()).collect(),
    )
    .description("React with the number of what you want to change.")
    .fields(record_fields(&record))
    .selector(true);

    let options = ctx.config.menu_options();
    let Some(selection) = ReactionMenu::new(ctx.transport(), source, invocation, options)
        .with_context(record)
        .run()
        .await?
        .into_selection()
    else {
        return Ok(());
    };

    let record = selection.context;
    match selection.index {
        0 => edit_title(&ctx, invocation, record).await,
        1 => edit_description(&ctx, invocation, record).await,
        2 => remove_roles(&ctx, invocation, record).await,
        3 => add_roles(&ctx, invocation, record).await,
        4 => edit_channel(&ctx, invocation, record).await,
        _ => Ok(()),
    }
}

/// A timeout has already cleaned up after itself; only transport errors escape.
fn settle<V>(result: Result<V, FlowError>) -> anyhow::Result<Option<V>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(FlowError::TimedOut) => Ok(None),
        Err(FlowError::Transport(source)) => Err(source),
    }
}

fn question(ctx: &Context, header: &str, text: &str, note: Option<&str>) -> anyhow::Result<Embed> {
    let wait = format_timeout(ctx.config.prompt_timeout.as_secs());
    let footer = match note {
        Some(note) => format!("{note} | You have {wait} to respond"),
        None => format!("You have {wait} to respond"),
    };
    ctx.style().with_note(header, text, &footer)
}

fn change_summary(
    ctx: &Context,
    title: &str,
    description: String,
    fields: Vec<EmbedField>,
) -> anyhow::Result<Embed> {
    let mut builder = ctx.style().builder().title(title).description(description);
    for entry in fields {
        builder = builder.field(entry);
    }
    Ok(builder.validate()?.build())
}

async fn audit(ctx: &Context, title: &str, description: String, fields: Vec<EmbedField>) {
    post_audit(
        ctx,
        ctx.config.role_reaction_log_channel,
        audit_entry(ctx.style(), title, description, fields),
    )
    .await;
}

async fn edit_title(
    ctx: &Context,
    invocation: Invocation,
    record: RoleReaction,
) -> anyhow::Result<()> {
    let opening = question(
        ctx,
        "Edit Title",
        &format!("Please __**send the new title**__ for **{}**:", record.title),
        None,
    )?;
    let mut prompt = Prompt::open(ctx.transport(), invocation, opening.clone()).await?;

    let answer = prompt
        .ask_text(opening, TextStep::required(ctx.config.prompt_timeout), |reply| {
            if reply.content.chars().count() > TITLE_LIMIT {
                Err(Rejection::invalid(format!(
                    "The title can be at most {TITLE_LIMIT} characters long. Please __**send a \
                     shorter title**__:"
                )))
            } else {
                Ok(reply.content.clone())
            }
        })
        .await;
    let Some(Answer::Value(title)) = settle(answer)? else {
        return Ok(());
    };

    let mut updated = record.clone();
    updated.title = title.clone();
    if !replace_record(ctx, &record, updated.clone()).await? {
        prompt.abandon().await;
        return reply_changed(ctx, &invocation).await;
    }
    refresh_live(ctx, &updated).await;

    let fields = vec![
        field("Before", clip(&record.title), false),
        field("After", clip(&title), false),
    ];
    prompt
        .finish(change_summary(
            ctx,
            "Role Reaction Updated",
            "The title was changed.".to_owned(),
            fields.clone(),
        )?)
        .await?;

    info!(from = %record.title, to = %title, "role reaction title edited");
    audit(
        ctx,
        "Role Reaction Edited",
        format!("<@{}> changed the title of a role reaction.", invocation.author_id),
        fields,
    )
    .await;
    Ok(())
}

async fn edit_description(
    ctx: &Context,
    invocation: Invocation,
    record: RoleReaction,
) -> anyhow::Result<()> {
    let opening = question(
        ctx,
        "Edit Description",
        &format!("Please __**send the new description**__ for **{}**:", record.title),
        Some("Enter \"none\" to remove the description"),
    )?;
    let mut prompt = Prompt::open(ctx.transport(), invocation, opening.clone()).await?;

    let answer = prompt
        .ask_text(
            opening,
            TextStep::skippable(ctx.config.prompt_timeout, NONE_TOKENS),
            |reply| Ok(reply.content.clone()),
        )
        .await;
    let Some(description) = settle(answer)?.map(Answer::into_option) else {
        return Ok(());
    };

    let mut updated = record.clone();
    updated.description = description;
    if !replace_record(ctx, &record, updated.clone()).await? {
        prompt.abandon().await;
        return reply_changed(ctx, &invocation).await;
    }
    refresh_live(ctx, &updated).await;

    let fields = vec![
        field("Before", clip(record.description.as_deref().unwrap_or("None")), false),
        field("After", clip(updated.description.as_deref().unwrap_or("None")), false),
    ];
    prompt
        .finish(change_summary(
            ctx,
            "Role Reaction Updated",
            format!("The description of **{}** was changed.", updated.title),
            fields.clone(),
        )?)
        .await?;

    info!(title = %updated.title, "role reaction description edited");
    audit(
        ctx,
        "Role Reaction Edited",
        format!(
            "<@{}> changed the description of **{}**.",
            invocation.author_id, updated.title
        ),
        fields,
    )
    .await;
    Ok(())
}

/// Remove bindings one at a time; at least one binding always remains.
async fn remove_roles(
    ctx: &Context,
    invocation: Invocation,
    mut record: RoleReaction,
) -> anyhow::Result<()> {
    let mut removed = Vec::new();

    while record.roles.len() > 1 {
        let entries = record
            .roles
            .iter()
            .map(|binding| format!("{} - <@&{}>", binding.emoji, binding.role_id))
            .collect();
        let source = ListPageSource::new(
            ctx.style().clone(),
            format!("Remove Role Reactions from \"{}\"", record.title),
            entries,
        )
        .description(
            "React with the number of the role reaction to remove. Stop the menu when you are \
             done.",
        )
        .per_page(ctx.config.menu_page_size)
        .selector(true);

        let Some(selection) =
            ReactionMenu::new(ctx.transport(), source, invocation, ctx.config.menu_options())
                .run()
                .await?
                .into_selection()
        else {
            break;
        };

        if selection.index >= record.roles.len() {
            break;
        }

        let mut updated = record.clone();
        let binding = updated.roles.remove(selection.index);
        if !replace_record(ctx, &record, updated.clone()).await? {
            return reply_changed(ctx, &invocation).await;
        }

        if let Some(live) = live_message(&updated) {
            if let Some(emoji) = reaction_from_stored(&binding.emoji)
                && let Err(source) = ctx.transport().clear_reaction(live, &emoji).await
            {
                warn!(?source, role_id = binding.role_id, "could not clear removed reaction");
            }
            refresh_live(ctx, &updated).await;
        }

        info!(title = %updated.title, role_id = binding.role_id, "role reaction binding removed");
        audit(
            ctx,
            "Role Reaction Edited",
            format!(
                "<@{}> removed {} - <@&{}> from **{}**.",
                invocation.author_id, binding.emoji, binding.role_id, updated.title
            ),
            Vec::new(),
        )
        .await;

        removed.push(binding);
        record = updated;
    }

    if record.roles.len() <= 1 {
        let embed = ctx.style().simple(
            "Process Complete",
            Some(&format!(
                "You must keep at least 1 role reaction tied to your message. Use `{}rr delete` \
                 to remove **{}** entirely.",
                ctx.config.prefix, record.title
            )),
        )?;
        reply(ctx, &invocation, embed).await?;
    }

    if !removed.is_empty() {
        let embed = ctx.style().simple(
            "Role Reactions Removed",
            Some(&format!(
                "Removed from **{}**:\n{}",
                record.title,
                binding_lines(&removed)
            )),
        )?;
        reply(ctx, &invocation, embed).await?;
    }

    Ok(())
}

async fn add_roles(
    ctx: &Context,
    invocation: Invocation,
    record: RoleReaction,
) -> anyhow::Result<()> {
    const HEADER: &str = "Add Role Reactions";

    let opening = ctx.style().simple(
        HEADER,
        Some(&format!("Adding role reactions to **{}**.", record.title)),
    )?;
    let mut prompt = Prompt::open(ctx.transport(), invocation, opening).await?;

    let layout = BindingLayout {
        style: ctx.style(),
        header: HEADER,
        timeout: ctx.config.prompt_timeout,
        step: None,
        context: vec![field("Title", &record.title, false)],
    };
    let collected = collect_bindings(
        &mut prompt,
        &layout,
        RepeatingSection::new(0, DONE_TOKENS),
        &record.roles,
    )
    .await;
    let Some(added) = settle(collected)? else {
        return Ok(());
    };

    if added.is_empty() {
        prompt
            .finish(ctx.style().simple("No Changes", Some("No role reactions were added."))?)
            .await?;
        return Ok(());
    }

    let mut updated = record.clone();
    updated.roles.extend(added.iter().cloned());
    if !replace_record(ctx, &record, updated.clone()).await? {
        prompt.abandon().await;
        return reply_changed(ctx, &invocation).await;
    }

    if updated.is_active() {
        match rebuild(ctx, &updated).await {
            Ok(Some(rebuilt)) => updated = rebuilt,
            Ok(None) => {}
            Err(source) => {
                warn!(?source, title = %updated.title, "could not rebuild role reaction")
            }
        }
    }

    let mut fields = vec![field("Added", clip(&binding_lines(&added)), false)];
    fields.extend(record_fields(&updated));
    prompt
        .finish(change_summary(
            ctx,
            "Role Reactions Added",
            format!("**{}** now has {} role reactions.", updated.title, updated.roles.len()),
            fields,
        )?)
        .await?;

    info!(title = %updated.title, added = added.len(), "role reaction bindings added");
    audit(
        ctx,
        "Role Reaction Edited",
        format!(
            "<@{}> added role reactions to **{}**.",
            invocation.author_id, updated.title
        ),
        vec![field("Added", clip(&binding_lines(&added)), false)],
    )
    .await;
    Ok(())
}

/// Move the record to another channel; an active one is posted there again.
async fn edit_channel(
    ctx: &Context,
    invocation: Invocation,
    record: RoleReaction,
) -> anyhow::Result<()> {
    let opening = question(
        ctx,
        "Edit Channel",
        &format!(
            "**{}** lives in <#{}>. Please __**mention the new channel**__:",
            record.title, record.channel_id
        ),
        None,
    )?;
    let mut prompt = Prompt::open(ctx.transport(), invocation, opening.clone()).await?;

    let answer = prompt
        .ask_text(opening, TextStep::required(ctx.config.prompt_timeout), |reply| {
            reply.channel_mentions().first().map(|channel| channel.get()).ok_or_else(|| {
                Rejection::invalid(
                    "Your response must __**mention a channel**__. Please __**mention the new \
                     channel**__:",
                )
            })
        })
        .await;
    let Some(Answer::Value(channel_id)) = settle(answer)? else {
        return Ok(());
    };

    if channel_id == record.channel_id {
        prompt
            .finish(ctx.style().simple(
                "No Changes",
                Some(&format!("**{}** already lives in <#{channel_id}>.", record.title)),
            )?)
            .await?;
        return Ok(());
    }

    let was_active = record.is_active();
    let base = if was_active {
        match deactivate(ctx, &record).await? {
            Some(stopped) => stopped,
            None => {
                prompt.abandon().await;
                return reply_changed(ctx, &invocation).await;
            }
        }
    } else {
        record.clone()
    };

    let mut moved = base.clone();
    moved.channel_id = channel_id;
    if !replace_record(ctx, &base, moved.clone()).await? {
        prompt.abandon().await;
        return reply_changed(ctx, &invocation).await;
    }

    let mut description = format!(
        "**{}** moved from <#{}> to <#{channel_id}>.",
        moved.title, record.channel_id
    );
    if was_active {
        match activate(ctx, &moved).await {
            Ok(Some(_)) => description.push_str(" It was posted there again."),
            Ok(None) => {}
            Err(source) => {
                warn!(?source, channel_id, "role reaction could not be posted in new channel");
                description.push_str(&format!(
                    " I could not post it there; use `{}rr start` once I can.",
                    ctx.config.prefix
                ));
            }
        }
    }

    prompt
        .finish(ctx.style().simple("Role Reaction Updated", Some(&description))?)
        .await?;

    info!(title = %moved.title, channel_id, "role reaction channel edited");
    audit(
        ctx,
        "Role Reaction Edited",
        format!(
            "<@{}> moved **{}** from <#{}> to <#{channel_id}>.",
            invocation.author_id, moved.title, record.channel_id
        ),
        Vec::new(),
    )
    .await;
    Ok(())
}
