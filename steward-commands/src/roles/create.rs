use std::time::Duration;

use async_trait::async_trait;
use tracing::info;
use twilight_model::channel::message::embed::Embed;

use super::{
    bindings::{BindingLayout, collect_bindings},
    embeds::{audit_entry, record_fields},
};
use crate::{CollectionSink, CommandMeta, require_manager};
use steward_core::Context;
use steward_database::model::RoleReaction;
use steward_utils::{
    cleanup::mark_succeeded,
    embed::{EmbedStyle, field},
    prompt::{
        Answer, DONE_TOKENS, FlowError, NONE_TOKENS, Prompt, Rejection, RepeatingSection, TextStep,
        WizardFlow, WizardOutcome, run_wizard,
    },
    time::format_timeout,
    transport::{Invocation, Transport},
};

pub const META: CommandMeta = CommandMeta {
    name: "rr create",
    aliases: &["rr add", "rr new"],
    desc: "Set up a new role reaction step by step.",
    category: "roles",
    usage: "!rr create",
};

const HEADER: &str = "Create a Role Reaction";
const TITLE_LIMIT: usize = 256;

pub async fn run(ctx: Context, invocation: Invocation) -> anyhow::Result<()> {
    if !require_manager(&ctx, &invocation).await? {
        return Ok(());
    }

    let flow = RoleReactionFlow {
        style: ctx.style().clone(),
        timeout: ctx.config.prompt_timeout,
        prefix: ctx.config.prefix.clone(),
    };
    let sink = CollectionSink(&ctx.store.role_reactions);

    let outcome = run_wizard(
        ctx.transport(),
        invocation,
        &flow,
        &sink,
        ctx.config.role_reaction_log_channel,
    )
    .await?;

    if let WizardOutcome::Completed(record) = outcome {
        info!(
            title = %record.title,
            roles = record.roles.len(),
            "role reaction created"
        );
    }

    Ok(())
}

pub struct RoleReactionFlow {
    pub style: EmbedStyle,
    pub timeout: Duration,
    pub prefix: String,
}

impl RoleReactionFlow {
    fn ask(&self, question: &str, note: Option<&str>, step: usize) -> Result<Embed, FlowError> {
        let wait = format_timeout(self.timeout.as_secs());
        let footer = match note {
            Some(note) => format!("{note} | You have {wait} to respond | Step [{step}/4]"),
            None => format!("You have {wait} to respond | Step [{step}/4]"),
        };
        Ok(self.style.with_note(HEADER, question, &footer)?)
    }
}

#[async_trait]
impl WizardFlow for RoleReactionFlow {
    type Record = RoleReaction;

    fn opening(&self) -> anyhow::Result<Embed> {
        Ok(self.ask(
            "Please __**send the title**__ of your role reaction message:",
            None,
            1,
        )?)
    }

    async fn collect(&self, prompt: &mut Prompt<'_>) -> Result<RoleReaction, FlowError> {
        let guild_id = prompt.invocation().guild_id.map(|id| id.get()).unwrap_or_default();

        let title_question = prompt.question().clone();
        let title = match prompt
            .ask_text(title_question, TextStep::required(self.timeout), |reply| {
                if reply.content.chars().count() > TITLE_LIMIT {
                    Err(Rejection::invalid(format!(
                        "The title can be at most {TITLE_LIMIT} characters long. Please __**send a \
                         shorter title**__:"
                    )))
                } else {
                    Ok(reply.content.clone())
                }
            })
            .await?
        {
            Answer::Value(title) => title,
            Answer::Skipped => String::new(),
        };

        let description = prompt
            .ask_text(
                self.ask(
                    &format!(
                        "Please __**send the description**__ shown above the roles of **{title}**:"
                    ),
                    Some("Enter \"none\" for no description"),
                    2,
                )?,
                TextStep::skippable(self.timeout, NONE_TOKENS),
                |reply| Ok(reply.content.clone()),
            )
            .await?
            .into_option();

        let layout = BindingLayout {
            style: &self.style,
            header: HEADER,
            timeout: self.timeout,
            step: Some("Step [3/4]"),
            context: vec![
                field("Title", &title, false),
                field("Description", description.as_deref().unwrap_or("None"), false),
            ],
        };
        let roles = collect_bindings(prompt, &layout, RepeatingSection::new(1, DONE_TOKENS), &[])
            .await?;

        let channel_question = self.ask(
            "Please __**mention the channel**__ this role reaction should be posted in:",
            None,
            4,
        )?;
        let channel_id = match prompt
            .ask_text(channel_question, TextStep::required(self.timeout), |reply| {
                reply.channel_mentions().first().map(|channel| channel.get()).ok_or_else(|| {
                    Rejection::invalid(
                        "Your response must __**mention a channel**__. Please __**mention the \
                         channel**__ this role reaction should be posted in:",
                    )
                })
            })
            .await?
        {
            Answer::Value(channel_id) => channel_id,
            Answer::Skipped => 0,
        };

        Ok(RoleReaction {
            title,
            description,
            roles,
            guild_id,
            channel_id,
            message_id: None,
        })
    }

    fn summary(&self, record: &RoleReaction) -> anyhow::Result<Embed> {
        let mut builder = self
            .style
            .builder()
            .title(format!("\"{}\" Role Reaction Created!", record.title))
            .description(format!(
                "Use `{}rr start` to post it in its channel.",
                self.prefix
            ));
        for entry in record_fields(record) {
            builder = builder.field(entry);
        }
        Ok(builder.validate()?.build())
    }

    fn audit_entry(&self, record: &RoleReaction, invocation: &Invocation) -> anyhow::Result<Embed> {
        let mut fields = vec![field("Title", &record.title, false)];
        fields.extend(record_fields(record));

        audit_entry(
            &self.style,
            "Role Reaction Created",
            format!("<@{}> created a role reaction.", invocation.author_id),
            fields,
        )
    }

    async fn after_save(
        &self,
        transport: &dyn Transport,
        invocation: &Invocation,
        _record: &RoleReaction,
    ) -> anyhow::Result<()> {
        mark_succeeded(transport, invocation).await;
        Ok(())
    }
}
