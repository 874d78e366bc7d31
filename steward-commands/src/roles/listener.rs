//! Grants and revokes roles when members react to a live role reaction.

use tracing::{debug, info};
use twilight_model::id::Id;

use super::emoji::stored_from_reaction;
use steward_core::Context;
use steward_utils::transport::{ReactionEvent, ReactionKind};

pub async fn handle(ctx: Context, event: ReactionEvent) -> anyhow::Result<()> {
    let Some(guild_id) = event.guild_id else {
        return Ok(());
    };

    let message_id = event.message_id.get();
    let Some(record) = ctx
        .store
        .role_reactions
        .find(|record| record.message_id == Some(message_id) && record.guild_id == guild_id.get())
        .await?
    else {
        return Ok(());
    };

    let emoji = stored_from_reaction(&event.emoji);
    let Some(binding) = record.binding_for(&emoji) else {
        debug!(
            message_id,
            %emoji,
            "reaction has no role paired"
        );
        return Ok(());
    };
    let Some(role_id) = Id::new_checked(binding.role_id) else {
        return Ok(());
    };

    match event.kind {
        ReactionKind::Added => {
            ctx.transport()
                .add_member_role(guild_id, event.user_id, role_id)
                .await?;
        }
        ReactionKind::Removed => {
            ctx.transport()
                .remove_member_role(guild_id, event.user_id, role_id)
                .await?;
        }
    }

    info!(
        user_id = event.user_id.get(),
        role_id = binding.role_id,
        kind = ?event.kind,
        title = %record.title,
        "role reaction applied"
    );
    Ok(())
}
