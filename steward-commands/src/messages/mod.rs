//! Custom embedded messages: built once through a guided flow, then posted
//! to their channels on demand.

pub mod create;
pub mod delete;
pub mod embeds;
pub mod send;

use crate::{CommandMeta, reply};
use steward_core::Context;
use steward_utils::{embed::field, transport::Invocation};

pub const META: CommandMeta = CommandMeta {
    name: "message",
    aliases: &["msg", "messages"],
    desc: "Shows the custom message commands and how many messages are stored.",
    category: "messages",
    usage: "!message [create|send|delete]",
};

pub async fn run(ctx: Context, invocation: Invocation, arg1: Option<&str>) -> anyhow::Result<()> {
    match arg1.map(str::to_ascii_lowercase).as_deref() {
        Some("create" | "add" | "new") => create::run(ctx, invocation).await,
        Some("send" | "post" | "start") => send::run(ctx, invocation).await,
        Some("delete" | "del" | "remove" | "rem") => delete::run(ctx, invocation).await,
        _ => overview(ctx, invocation).await,
    }
}

async fn overview(ctx: Context, invocation: Invocation) -> anyhow::Result<()> {
    let prefix = ctx.config.prefix.as_str();
    let stored = ctx.store.custom_messages.load().await?.len();

    let embed = ctx
        .style()
        .builder()
        .title("Custom Messages")
        .description(format!(
            "There {} **{stored}** custom message{} registered.",
            if stored == 1 { "is" } else { "are" },
            if stored == 1 { "" } else { "s" },
        ))
        .field(field(
            format!("{prefix}message create"),
            create::META.desc,
            false,
        ))
        .field(field(format!("{prefix}message send"), send::META.desc, false))
        .field(field(format!("{prefix}message delete"), delete::META.desc, false))
        .validate()?
        .build();

    reply(&ctx, &invocation, embed).await
}
