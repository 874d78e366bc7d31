//! The repeating "mention a role, then react with its emoji" section shared by
//! `rr create` and `rr edit`.

use std::time::Duration;

use twilight_model::channel::message::embed::{Embed, EmbedField};

use super::{embeds::binding_lines, emoji::stored_from_tagged};
use steward_database::model::RoleBinding;
use steward_utils::{
    embed::{EmbedStyle, field},
    prompt::{Answer, FlowError, Prompt, Rejection, RepeatingSection, TextStep},
    time::format_timeout,
};

/// How the section's questions are presented.
pub struct BindingLayout<'a> {
    pub style: &'a EmbedStyle,
    pub header: &'a str,
    pub timeout: Duration,
    /// Progress marker such as `Step [3/4]`.
    pub step: Option<&'a str>,
    /// Fields shown above the role list.
    pub context: Vec<EmbedField>,
}

impl BindingLayout<'_> {
    fn embed(
        &self,
        question: &str,
        may_finish: bool,
        shown: &[RoleBinding],
    ) -> Result<Embed, FlowError> {
        let mut note = format!("You have {} to respond", format_timeout(self.timeout.as_secs()));
        if may_finish {
            note = format!("Enter \"done\" to finish | {note}");
        }
        if let Some(step) = self.step {
            note = format!("{note} | {step}");
        }

        let mut embed = self.style.with_note(self.header, question, &note)?;
        embed.fields = self.context.clone();
        embed
            .fields
            .push(field("Role Reactions", binding_lines(shown), false));
        Ok(embed)
    }
}

const ROLE_MISSING: &str = "Your response must __**mention a role**__. Please __**mention a role \
                            that you want to be self-assignable**__:";
const ROLE_TAKEN: &str = "That role already has an emoji paired with it. Please __**mention a \
                          different role**__:";
const EMOJI_TAKEN: &str = "You cannot register an emoji that is already in use!\nPlease __**react \
                           to this message with a different emoji**__ to pair with the role:";

/// Collect new role/emoji pairs until a done token, once `section` allows it.
///
/// Roles and emoji already in `existing` or collected earlier in the same run
/// are rejected. Only the new bindings are returned.
pub async fn collect_bindings(
    prompt: &mut Prompt<'_>,
    layout: &BindingLayout<'_>,
    section: RepeatingSection<'_>,
    existing: &[RoleBinding],
) -> Result<Vec<RoleBinding>, FlowError> {
    let mut added: Vec<RoleBinding> = Vec::new();

    loop {
        let shown: Vec<RoleBinding> = existing.iter().chain(&added).cloned().collect();
        let may_finish = section.may_finish(added.len());

        let question = if added.is_empty() {
            "Please __**mention a role**__ that members should be able to assign themselves:"
        } else {
            "Reaction added! Please __**mention the next role**__ to make self-assignable:"
        };

        let role = prompt
            .ask_text(
                layout.embed(question, may_finish, &shown)?,
                TextStep::skippable(layout.timeout, section.termination_tokens(added.len())),
                |reply| {
                    let Some(role) = reply.role_mentions.first() else {
                        return Err(Rejection::invalid(ROLE_MISSING));
                    };
                    if shown.iter().any(|binding| binding.role_id == role.get()) {
                        return Err(Rejection::duplicate(ROLE_TAKEN));
                    }
                    Ok(role.get())
                },
            )
            .await?;

        let role_id = match role {
            Answer::Value(role_id) => role_id,
            Answer::Skipped => break,
        };

        let emoji = prompt
            .ask_reaction(
                layout.embed(
                    &format!(
                        "Please __**react to this message**__ with the emoji that should grant \
                         <@&{role_id}>:"
                    ),
                    false,
                    &shown,
                )?,
                layout.timeout,
                |tagged| {
                    let stored = stored_from_tagged(tagged);
                    if shown.iter().any(|binding| binding.emoji.same_emoji(&stored)) {
                        return Err(Rejection::duplicate(EMOJI_TAKEN));
                    }
                    Ok(stored)
                },
            )
            .await?;

        added.push(RoleBinding { emoji, role_id });
    }

    Ok(added)
}
