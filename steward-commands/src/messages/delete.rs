use tracing::info;

use super::embeds::{deleted_audit_entry, entry_line};
use crate::{CommandMeta, post_audit, reply, require_manager};
use steward_core::Context;
use steward_utils::{
    pagination::{ListPageSource, ReactionMenu},
    transport::Invocation,
};

pub const META: CommandMeta = CommandMeta {
    name: "message delete",
    aliases: &["message remove", "msg delete"],
    desc: "Pick a stored custom message and remove it.",
    category: "messages",
    usage: "!message delete",
};

pub async fn run(ctx: Context, invocation: Invocation) -> anyhow::Result<()> {
    if !require_manager(&ctx, &invocation).await? {
        return Ok(());
    }

    let messages = ctx.store.custom_messages.load().await?;
    if messages.is_empty() {
        let embed = ctx.style().simple(
            "No Custom Messages",
            Some(&format!(
                "There are no custom messages registered. Use `{}message create` to add one.",
                ctx.config.prefix
            )),
        )?;
        return reply(&ctx, &invocation, embed).await;
    }

    let source = ListPageSource::new(
        ctx.style().clone(),
        "Remove Custom Messages",
        messages.iter().map(entry_line).collect(),
    )
    .description("React with the number of the message you want to remove.")
    .per_page(ctx.config.menu_page_size)
    .selector(true);

    let options = ctx.config.menu_options();
    let Some(selection) = ReactionMenu::new(ctx.transport(), source, invocation, options)
        .run()
        .await?
        .into_selection()
    else {
        return Ok(());
    };

    let Some(chosen) = messages.get(selection.index).cloned() else {
        return Ok(());
    };

    let removed = ctx
        .store
        .custom_messages
        .update(|records| match records.iter().position(|record| *record == chosen) {
            Some(position) => {
                records.remove(position);
                true
            }
            None => false,
        })
        .await?;

    if !removed {
        let embed = ctx.style().simple(
            "Custom Message Changed",
            Some("That message was changed or removed while you were choosing. Please try again."),
        )?;
        return reply(&ctx, &invocation, embed).await;
    }

    info!(title = %chosen.title, "custom message deleted");

    let embed = ctx.style().simple(
        "Custom Message Deleted",
        Some(&format!("**{}** was removed.", chosen.title)),
    )?;
    reply(&ctx, &invocation, embed).await?;

    post_audit(
        &ctx,
        ctx.config.custom_message_log_channel,
        deleted_audit_entry(ctx.style(), &chosen, invocation.author_id.get()),
    )
    .await;

    Ok(())
}
