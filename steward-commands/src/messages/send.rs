use tracing::{info, warn};
use twilight_model::id::Id;

use super::embeds::{channel_list, entry_line, render_custom_message, sent_audit_entry};
use crate::{CommandMeta, post_audit, reply, require_manager};
use steward_core::Context;
use steward_utils::{
    pagination::{ListPageSource, ReactionMenu},
    transport::{Invocation, MessagePayload},
};

pub const META: CommandMeta = CommandMeta {
    name: "message send",
    aliases: &["message post", "msg send"],
    desc: "Pick a stored custom message and post it to its channels.",
    category: "messages",
    usage: "!message send",
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
        "Send Custom Messages",
        messages.iter().map(entry_line).collect(),
    )
    .description("React with the number of the message you want to send.")
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

    let Some(message) = messages.get(selection.index) else {
        return Ok(());
    };
    let embed = render_custom_message(ctx.style(), message)?;

    let mut delivered = Vec::new();
    for &channel in &message.channels {
        let Some(channel_id) = Id::new_checked(channel) else {
            continue;
        };

        match ctx
            .transport()
            .send_message(channel_id, &MessagePayload::embed(embed.clone()))
            .await
        {
            Ok(_) => delivered.push(channel),
            Err(source) => warn!(?source, channel_id = channel, "custom message not delivered"),
        }
    }

    info!(
        title = %message.title,
        delivered = delivered.len(),
        requested = message.channels.len(),
        "custom message sent"
    );

    let summary = if delivered.len() == message.channels.len() {
        format!("**{}** was posted in {}.", message.title, channel_list(&delivered))
    } else {
        format!(
            "**{}** was posted in {}. I could not post in the other channels; check my \
             permissions there.",
            message.title,
            channel_list(&delivered)
        )
    };
    reply(
        &ctx,
        &invocation,
        ctx.style().simple("Custom Message Sent", Some(&summary))?,
    )
    .await?;

    post_audit(
        &ctx,
        ctx.config.custom_message_log_channel,
        sent_audit_entry(ctx.style(), message, invocation.author_id.get(), &delivered),
    )
    .await;

    Ok(())
}
