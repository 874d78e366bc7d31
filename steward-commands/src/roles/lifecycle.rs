//! Starting and stopping the live message of a role reaction.

use anyhow::Context as _;
use tracing::{info, warn};
use twilight_model::id::Id;

use super::{
    Filter,
    embeds::{audit_entry, jump_url, live_embed},
    emoji::reaction_from_stored,
    pick_record, replace_record, reply_changed,
};
use crate::{CommandMeta, post_audit, reply, require_manager};
use steward_core::Context;
use steward_database::model::RoleReaction;
use steward_utils::{
    cleanup::discard_message,
    embed::field,
    transport::{Invocation, MessagePayload, MessageRef},
};

pub const START_META: CommandMeta = CommandMeta {
    name: "rr start",
    aliases: &["rr activate"],
    desc: "Post an inactive role reaction so members can use it.",
    category: "roles",
    usage: "!rr start",
};

pub const STOP_META: CommandMeta = CommandMeta {
    name: "rr stop",
    aliases: &["rr deactivate"],
    desc: "Take an active role reaction down.",
    category: "roles",
    usage: "!rr stop",
};

pub async fn start(ctx: Context, invocation: Invocation) -> anyhow::Result<()> {
    if !require_manager(&ctx, &invocation).await? {
        return Ok(());
    }

    let Some(record) =
        pick_record(&ctx, invocation, "Start Role Reactions", Filter::Inactive).await?
    else {
        return Ok(());
    };

    let started = match activate(&ctx, &record).await {
        Ok(Some(started)) => started,
        Ok(None) => return reply_changed(&ctx, &invocation).await,
        Err(source) => {
            warn!(
                ?source,
                channel_id = record.channel_id,
                "role reaction could not be posted"
            );
            let embed = ctx.style().simple(
                "Cannot Start Role Reaction",
                Some(&format!(
                    "I could not post in <#{}>. Make sure I can send messages and add \
                     reactions there.",
                    record.channel_id
                )),
            )?;
            return reply(&ctx, &invocation, embed).await;
        }
    };

    let jump = jump_url(&started).unwrap_or_default();
    let embed = ctx.style().simple(
        "Role Reaction Started",
        Some(&format!(
            "**{}** is now live in <#{}>. [Jump to message]({jump})",
            started.title, started.channel_id
        )),
    )?;
    reply(&ctx, &invocation, embed).await?;

    post_audit(
        &ctx,
        ctx.config.role_reaction_log_channel,
        audit_entry(
            ctx.style(),
            "Role Reaction Started",
            format!(
                "<@{}> has started a role reaction in <#{}>.",
                invocation.author_id, started.channel_id
            ),
            vec![field("Title", &started.title, false)],
        ),
    )
    .await;

    Ok(())
}

pub async fn stop(ctx: Context, invocation: Invocation) -> anyhow::Result<()> {
    if !require_manager(&ctx, &invocation).await? {
        return Ok(());
    }

    let Some(record) =
        pick_record(&ctx, invocation, "Stop Role Reactions", Filter::Active).await?
    else {
        return Ok(());
    };

    let Some(stopped) = deactivate(&ctx, &record).await? else {
        return reply_changed(&ctx, &invocation).await;
    };

    let embed = ctx.style().simple(
        "Role Reaction Stopped",
        Some(&format!(
            "**{}** was taken down. Use `{}rr start` to post it again.",
            stopped.title, ctx.config.prefix
        )),
    )?;
    reply(&ctx, &invocation, embed).await?;

    post_audit(
        &ctx,
        ctx.config.role_reaction_log_channel,
        audit_entry(
            ctx.style(),
            "Role Reaction Stopped",
            format!(
                "<@{}> has stopped a role reaction in <#{}>.",
                invocation.author_id, stopped.channel_id
            ),
            vec![field("Title", &stopped.title, false)],
        ),
    )
    .await;

    Ok(())
}

/// Where the live message of an active record is.
pub(crate) fn live_message(record: &RoleReaction) -> Option<MessageRef> {
    Some(MessageRef::new(
        Id::new_checked(record.channel_id)?,
        Id::new_checked(record.message_id?)?,
    ))
}

/// Post the live message with one reaction per binding and store its id.
///
/// Returns the stored record, or `None` when `record` was changed meanwhile;
/// the posted message is removed again in that case.
pub(crate) async fn activate(
    ctx: &Context,
    record: &RoleReaction,
) -> anyhow::Result<Option<RoleReaction>> {
    let channel_id =
        Id::new_checked(record.channel_id).context("role reaction has no channel")?;

    let live = ctx
        .transport()
        .send_message(channel_id, &MessagePayload::embed(live_embed(ctx.style(), record)?))
        .await?;

    for binding in &record.roles {
        let Some(emoji) = reaction_from_stored(&binding.emoji) else {
            warn!(role_id = binding.role_id, "stored emoji is unusable");
            continue;
        };
        if let Err(source) = ctx.transport().add_reaction(live, &emoji).await {
            warn!(
                ?source,
                role_id = binding.role_id,
                emoji = %binding.emoji,
                "could not add role reaction emoji"
            );
        }
    }

    let mut started = record.clone();
    started.message_id = Some(live.message_id.get());

    match replace_record(ctx, record, started.clone()).await {
        Ok(true) => {}
        Ok(false) => {
            discard_message(ctx.transport(), live).await;
            return Ok(None);
        }
        Err(source) => {
            discard_message(ctx.transport(), live).await;
            return Err(source);
        }
    }

    info!(
        title = %started.title,
        channel_id = started.channel_id,
        message_id = live.message_id.get(),
        "role reaction started"
    );
    Ok(Some(started))
}

/// Clear the stored id, then remove the live message.
///
/// The live message is left alone when `record` was changed meanwhile.
pub(crate) async fn deactivate(
    ctx: &Context,
    record: &RoleReaction,
) -> anyhow::Result<Option<RoleReaction>> {
    let mut stopped = record.clone();
    stopped.message_id = None;

    if !replace_record(ctx, record, stopped.clone()).await? {
        return Ok(None);
    }

    if let Some(live) = live_message(record) {
        discard_message(ctx.transport(), live).await;
    }

    info!(title = %stopped.title, "role reaction stopped");
    Ok(Some(stopped))
}

/// Stop and start again so the live message matches the record.
pub(crate) async fn rebuild(
    ctx: &Context,
    record: &RoleReaction,
) -> anyhow::Result<Option<RoleReaction>> {
    match deactivate(ctx, record).await? {
        Some(stopped) => activate(ctx, &stopped).await,
        None => Ok(None),
    }
}

/// Edit the live message in place after a change to its text or roles.
pub(crate) async fn refresh_live(ctx: &Context, record: &RoleReaction) {
    let Some(live) = live_message(record) else {
        return;
    };

    let result = match live_embed(ctx.style(), record) {
        Ok(embed) => {
            ctx.transport()
                .edit_message(live, &MessagePayload::embed(embed))
                .await
        }
        Err(source) => Err(source),
    };

    if let Err(source) = result {
        warn!(
            ?source,
            message_id = live.message_id.get(),
            "could not refresh live role reaction"
        );
    }
}
