pub mod general;
pub mod messages;
pub mod roles;

use async_trait::async_trait;
use tracing::info;
use twilight_model::{
    channel::message::embed::Embed,
    guild::Permissions,
    id::{Id, marker::ChannelMarker},
};

use steward_core::Context;
use steward_database::state::Collection;
use steward_utils::{
    audit::post_audit_entry,
    permissions::{invoker_has_permission, permission_names},
    prompt::RecordSink,
    transport::{InboundMessage, Invocation, MessagePayload, ReactionEvent},
};

// Global command meta data
pub struct CommandMeta {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    general::help::META,
    general::ping::META,
    messages::META,
    messages::create::META,
    messages::send::META,
    messages::delete::META,
    roles::META,
    roles::create::META,
    roles::delete::META,
    roles::edit::META,
    roles::lifecycle::START_META,
    roles::lifecycle::STOP_META,
    // Add new commands here
];

/// Split a message into `(command, first argument, remaining text)` when it
/// starts with `prefix`.
pub fn parse_command<'a>(
    content: &'a str,
    prefix: &str,
) -> Option<(String, Option<&'a str>, Option<&'a str>)> {
    let content = content.trim().strip_prefix(prefix)?.trim();

    let mut command_and_rest = content.splitn(2, char::is_whitespace);
    let cmd = command_and_rest.next().unwrap_or("").to_ascii_lowercase();
    if cmd.is_empty() {
        return None;
    }

    let rest = command_and_rest
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let (arg1, arg_tail) = match rest {
        Some(value) => {
            let mut args = value.splitn(2, char::is_whitespace);
            let first = args.next().filter(|arg| !arg.is_empty());
            let tail = args
                .next()
                .map(str::trim)
                .filter(|remaining| !remaining.is_empty());

            (first, tail)
        }
        None => (None, None),
    };

    Some((cmd, arg1, arg_tail))
}

pub async fn handle_message(ctx: Context, msg: InboundMessage) -> anyhow::Result<()> {
    if msg.author_bot || msg.author_id == ctx.bot_user_id {
        return Ok(());
    }

    let Some((cmd, arg1, arg_tail)) = parse_command(&msg.content, &ctx.config.prefix) else {
        return Ok(());
    };

    let invocation = Invocation::from_message(&msg);

    match cmd.as_str() {
        "help" => general::help::run(ctx.clone(), invocation, arg1, arg_tail).await?,
        "ping" => general::ping::run(ctx.clone(), invocation).await?,

        "message" | "msg" | "messages" => messages::run(ctx.clone(), invocation, arg1).await?,
        "rr" | "rrs" | "rolereaction" | "rolereactions" => {
            roles::run(ctx.clone(), invocation, arg1).await?
        }
        // Add new commands here
        _ => {}
    }

    Ok(())
}

/// Reaction add/remove events from the gateway.
pub async fn handle_reaction(ctx: Context, event: ReactionEvent) -> anyhow::Result<()> {
    if event.user_id == ctx.bot_user_id {
        return Ok(());
    }

    roles::listener::handle(ctx, event).await
}

/// Gate for management commands: guild only, Manage Server or Administrator.
///
/// Replies with the reason and returns `false` when the invoker may not proceed.
pub(crate) async fn require_manager(
    ctx: &Context,
    invocation: &Invocation,
) -> anyhow::Result<bool> {
    if invocation.guild_id.is_none() {
        reply(
            ctx,
            invocation,
            ctx.style()
                .simple("Server Only", Some("This command can only be used in a server."))?,
        )
        .await?;
        return Ok(false);
    }

    if invoker_has_permission(ctx.transport(), invocation, Permissions::MANAGE_GUILD).await? {
        return Ok(true);
    }

    let needed = permission_names(Permissions::MANAGE_GUILD).join(", ");
    reply(
        ctx,
        invocation,
        ctx.style().simple(
            "Missing Permissions",
            Some(&format!("You need the `{needed}` permission to use this command.")),
        )?,
    )
    .await?;

    info!(
        user_id = invocation.author_id.get(),
        channel_id = invocation.channel_id.get(),
        "management command denied"
    );
    Ok(false)
}

/// Send an embed to the invoking channel.
pub(crate) async fn reply(
    ctx: &Context,
    invocation: &Invocation,
    embed: Embed,
) -> anyhow::Result<()> {
    ctx.transport()
        .send_message(invocation.channel_id, &MessagePayload::embed(embed))
        .await?;
    Ok(())
}

/// Mirror an audit entry to a log channel, if one is configured.
pub(crate) async fn post_audit(
    ctx: &Context,
    channel_id: Option<Id<ChannelMarker>>,
    entry: anyhow::Result<Embed>,
) {
    post_audit_entry(ctx.transport(), channel_id, entry).await;
}

/// Wizard sink appending to a stored collection.
pub(crate) struct CollectionSink<'a, T>(pub &'a Collection<T>);

#[async_trait]
impl<T> RecordSink<T> for CollectionSink<'_, T>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync,
{
    async fn save(&self, record: &T) -> anyhow::Result<()> {
        let count = self.0.push(record.clone()).await?;
        info!(collection = self.0.name(), count, "record saved");
        Ok(())
    }
}
