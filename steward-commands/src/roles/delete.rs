use tracing::info;

use super::{
    Filter,
    embeds::{audit_entry, binding_lines, record_fields},
    lifecycle::live_message,
    pick_record, remove_record, reply_changed,
};
use crate::{CommandMeta, post_audit, reply, require_manager};
use steward_core::Context;
use steward_utils::{
    cleanup::discard_message,
    embed::field,
    prompt::{CONFIRM_TIMEOUT, confirm},
    transport::Invocation,
};

pub const META: CommandMeta = CommandMeta {
    name: "rr delete",
    aliases: &["rr remove"],
    desc: "Pick a role reaction and remove it for good.",
    category: "roles",
    usage: "!rr delete",
};

pub async fn run(ctx: Context, invocation: Invocation) -> anyhow::Result<()> {
    if !require_manager(&ctx, &invocation).await? {
        return Ok(());
    }

    let Some(record) = pick_record(&ctx, invocation, "Remove Role Reactions", Filter::Any).await?
    else {
        return Ok(());
    };

    let question = ctx
        .style()
        .builder()
        .title("Are You Sure?")
        .description(format!(
            "**{}** and these role reactions will be removed:\n\n{}",
            record.title,
            binding_lines(&record.roles)
        ))
        .validate()?
        .build();

    match confirm(ctx.transport(), &invocation, question, CONFIRM_TIMEOUT).await? {
        Some(true) => {}
        Some(false) | None => {
            let embed = ctx
                .style()
                .simple("Deletion Cancelled", Some(&format!("**{}** was kept.", record.title)))?;
            return reply(&ctx, &invocation, embed).await;
        }
    }

    if !remove_record(&ctx, &record).await? {
        return reply_changed(&ctx, &invocation).await;
    }

    if let Some(live) = live_message(&record) {
        discard_message(ctx.transport(), live).await;
    }

    info!(title = %record.title, "role reaction deleted");

    let embed = ctx.style().simple(
        "Role Reaction Deleted",
        Some(&format!("**{}** was removed.", record.title)),
    )?;
    reply(&ctx, &invocation, embed).await?;

    let mut fields = vec![field("Title", &record.title, false)];
    fields.extend(record_fields(&record));
    post_audit(
        &ctx,
        ctx.config.role_reaction_log_channel,
        audit_entry(
            ctx.style(),
            "Role Reaction Deleted",
            format!("<@{}> deleted a role reaction.", invocation.author_id),
            fields,
        ),
    )
    .await;

    Ok(())
}
