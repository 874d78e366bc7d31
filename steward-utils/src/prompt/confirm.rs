//! Two-glyph yes/no confirmation.

use std::time::Duration;

use twilight_model::channel::message::embed::Embed;

use crate::{
    cleanup::{FAILURE_GLYPH, SUCCESS_GLYPH, discard_message},
    transport::{Invocation, MessagePayload, ReactionEmoji, Transport},
};

pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

/// Post `question` with ✅/❌ and wait for the invoker to pick one.
///
/// Returns `None` on timeout. The confirmation message is removed either way.
pub async fn confirm(
    transport: &dyn Transport,
    invocation: &Invocation,
    question: Embed,
    timeout: Duration,
) -> anyhow::Result<Option<bool>> {
    let message = transport
        .send_message(invocation.channel_id, &MessagePayload::embed(question))
        .await?;

    for glyph in [SUCCESS_GLYPH, FAILURE_GLYPH] {
        if let Err(source) = transport
            .add_reaction(message, &ReactionEmoji::unicode(glyph))
            .await
        {
            discard_message(transport, message).await;
            return Err(source);
        }
    }

    let predicate = invocation.reaction_filter(message);
    let answer = transport
        .await_reaction(
            Box::new(move |event| {
                predicate(event)
                    && matches!(event.emoji.as_unicode(), Some(SUCCESS_GLYPH | FAILURE_GLYPH))
            }),
            timeout,
        )
        .await
        .map(|event| event.emoji.as_unicode() == Some(SUCCESS_GLYPH));

    discard_message(transport, message).await;
    Ok(answer)
}
