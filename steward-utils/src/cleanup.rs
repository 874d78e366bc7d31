//! Best-effort cleanup of prompt messages, replies and reactions.
//!
//! Failures here are never surfaced to the flow; a message that is already
//! gone is the expected outcome of a cleanup call.

use tracing::debug;
use twilight_model::id::{Id, marker::UserMarker};

use crate::transport::{Invocation, MessageRef, ReactionEmoji, Transport};

pub const SUCCESS_GLYPH: &str = "✅";
pub const FAILURE_GLYPH: &str = "❌";

/// Delete a message, ignoring failures.
pub async fn discard_message(transport: &dyn Transport, message: MessageRef) {
    if let Err(source) = transport.delete_message(message).await {
        debug!(
            ?source,
            channel_id = message.channel_id.get(),
            message_id = message.message_id.get(),
            "best-effort message delete failed"
        );
    }
}

/// Remove a user's reaction, ignoring failures.
pub async fn discard_reaction(
    transport: &dyn Transport,
    message: MessageRef,
    emoji: &ReactionEmoji,
    user_id: Id<UserMarker>,
) {
    if let Err(source) = transport.remove_reaction(message, emoji, user_id).await {
        debug!(
            ?source,
            message_id = message.message_id.get(),
            user_id = user_id.get(),
            "best-effort reaction removal failed"
        );
    }
}

/// React to the invoking command message with the failure glyph.
pub async fn mark_failed(transport: &dyn Transport, invocation: &Invocation) {
    mark(transport, invocation, FAILURE_GLYPH).await;
}

/// React to the invoking command message with the success glyph.
pub async fn mark_succeeded(transport: &dyn Transport, invocation: &Invocation) {
    mark(transport, invocation, SUCCESS_GLYPH).await;
}

async fn mark(transport: &dyn Transport, invocation: &Invocation, glyph: &str) {
    let target = invocation.message_ref();
    if let Err(source) = transport
        .add_reaction(target, &ReactionEmoji::unicode(glyph))
        .await
    {
        debug!(
            ?source,
            message_id = target.message_id.get(),
            glyph,
            "could not mark invoking message"
        );
    }
}
