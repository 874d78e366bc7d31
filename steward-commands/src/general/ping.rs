use std::time::Instant;

use crate::CommandMeta;
use steward_core::Context;
use steward_utils::transport::{Invocation, MessagePayload};

pub const META: CommandMeta = CommandMeta {
    name: "ping",
    aliases: &[],
    desc: "Replies with Pong! and the round-trip time.",
    category: "general",
    usage: "!ping",
};

/// Send a simple connectivity response, then edit in the measured latency.
pub async fn run(ctx: Context, invocation: Invocation) -> anyhow::Result<()> {
    let started = Instant::now();
    let reply = ctx
        .transport()
        .send_message(invocation.channel_id, &MessagePayload::text("Pong!"))
        .await?;

    let elapsed = started.elapsed().as_millis();
    ctx.transport()
        .edit_message(reply, &MessagePayload::text(format!("Pong! `{elapsed} ms`")))
        .await?;

    Ok(())
}
