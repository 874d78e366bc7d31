use std::time::Duration;

use async_trait::async_trait;
use tracing::info;
use twilight_model::channel::message::embed::{Embed, EmbedField};

use super::embeds::{
    DESCRIPTION_LIMIT, FIELD_NAME_LIMIT, FIELD_VALUE_LIMIT, MAX_FIELDS, TITLE_LIMIT,
    channel_list, created_audit_entry, render_custom_message, validate_image, validate_length,
    validate_link,
};
use crate::{CollectionSink, CommandMeta, require_manager};
use steward_core::Context;
use steward_database::model::{CustomMessage, MessageAuthor, MessageField};
use steward_utils::{
    embed::{EmbedStyle, field},
    parse::is_affirmative,
    prompt::{
        Answer, FlowError, Prompt, Rejection, RepeatingSection, SKIP_TOKENS, TextStep, WizardFlow,
        WizardOutcome, run_wizard,
    },
    time::format_timeout,
    transport::{Invocation, MessagePayload, Transport},
};

pub const META: CommandMeta = CommandMeta {
    name: "message create",
    aliases: &["message add", "msg create"],
    desc: "Build a new custom embedded message step by step.",
    category: "messages",
    usage: "!message create",
};

const HEADER: &str = "Create a Custom Message";
/// Either word ends the field section.
const FIELD_DONE_TOKENS: &[&str] = &["done", "skip"];

pub async fn run(ctx: Context, invocation: Invocation) -> anyhow::Result<()> {
    if !require_manager(&ctx, &invocation).await? {
        return Ok(());
    }

    let flow = CustomMessageFlow {
        style: ctx.style().clone(),
        timeout: ctx.config.prompt_timeout,
        prefix: ctx.config.prefix.clone(),
    };
    let sink = CollectionSink(&ctx.store.custom_messages);

    let outcome = run_wizard(
        ctx.transport(),
        invocation,
        &flow,
        &sink,
        ctx.config.custom_message_log_channel,
    )
    .await?;

    if let WizardOutcome::Completed(message) = outcome {
        info!(
            title = %message.title,
            channels = message.channels.len(),
            "custom message created"
        );
    }

    Ok(())
}

pub struct CustomMessageFlow {
    pub style: EmbedStyle,
    pub timeout: Duration,
    pub prefix: String,
}

/// Values collected so far, shown back to the user as the flow advances.
#[derive(Default)]
struct Draft {
    title: String,
    description: Option<String>,
    url: Option<String>,
    author: Option<String>,
    fields: Vec<MessageField>,
}

impl Draft {
    fn preview_fields(&self) -> Vec<EmbedField> {
        let mut preview = Vec::new();
        if !self.title.is_empty() {
            preview.push(field("Title", &self.title, false));
        }
        if let Some(url) = &self.url {
            preview.push(field("Url", url, false));
        }
        if let Some(author) = &self.author {
            preview.push(field("Author", author, true));
        }
        for message_field in &self.fields {
            preview.push(field(&message_field.name, &message_field.value, message_field.inline));
        }
        preview
    }
}

impl CustomMessageFlow {
    fn ask(&self, draft: &Draft, question: &str, skippable: bool) -> Result<Embed, FlowError> {
        let wait = format_timeout(self.timeout.as_secs());
        let note = if skippable {
            format!("Enter \"skip\" to skip | You have {wait} to respond")
        } else {
            format!("You have {wait} to respond")
        };

        let mut embed = self.style.with_note(HEADER, question, &note)?;
        embed.fields = draft.preview_fields();
        Ok(embed)
    }

    fn required(&self) -> TextStep<'static> {
        TextStep::required(self.timeout)
    }

    fn skippable(&self) -> TextStep<'static> {
        TextStep::skippable(self.timeout, SKIP_TOKENS)
    }

    async fn collect_fields(
        &self,
        prompt: &mut Prompt<'_>,
        draft: &mut Draft,
    ) -> Result<(), FlowError> {
        let section = RepeatingSection::new(0, FIELD_DONE_TOKENS);

        while draft.fields.len() < MAX_FIELDS {
            let name_question = if draft.fields.is_empty() {
                "Please __**send the name of a field**__ to add to the message, or enter \"done\" \
                 to continue without fields:"
            } else {
                "Field added! Please __**send the name of the next field**__, or enter \"done\" \
                 when you have added every field:"
            };

            let name = match prompt
                .ask_text(
                    self.ask(draft, name_question, false)?,
                    TextStep::skippable(
                        self.timeout,
                        section.termination_tokens(draft.fields.len()),
                    ),
                    |reply| validate_length(&reply.content, FIELD_NAME_LIMIT, "field name"),
                )
                .await?
            {
                Answer::Value(name) => name,
                Answer::Skipped => break,
            };

            let value = prompt
                .ask_text(
                    self.ask(
                        draft,
                        &format!("Please __**send the text of the field**__ `{name}`:"),
                        false,
                    )?,
                    self.required(),
                    |reply| validate_length(&reply.content, FIELD_VALUE_LIMIT, "field text"),
                )
                .await?;

            let inline = prompt
                .ask_text(
                    self.ask(
                        draft,
                        "Should this field be shown inline, next to its neighbours? \
                         Please __**answer yes or no**__:",
                        false,
                    )?,
                    self.required(),
                    |reply| Ok(is_affirmative(&reply.content)),
                )
                .await?;

            if let (Answer::Value(value), Answer::Value(inline)) = (value, inline) {
                draft.fields.push(MessageField { name, value, inline });
            }
        }

        Ok(())
    }
}

#[async_trait]
impl WizardFlow for CustomMessageFlow {
    type Record = CustomMessage;

    fn opening(&self) -> anyhow::Result<Embed> {
        Ok(self.ask(
            &Draft::default(),
            "Please __**send the title**__ of your new message:",
            false,
        )?)
    }

    async fn collect(&self, prompt: &mut Prompt<'_>) -> Result<CustomMessage, FlowError> {
        let mut draft = Draft::default();

        let title_question = prompt.question().clone();
        if let Answer::Value(title) = prompt
            .ask_text(title_question, self.required(), |reply| {
                validate_length(&reply.content, TITLE_LIMIT, "title")
            })
            .await?
        {
            draft.title = title;
        }

        draft.description = prompt
            .ask_text(
                self.ask(&draft, "Please __**send the description**__ of the message:", true)?,
                self.skippable(),
                |reply| validate_length(&reply.content, DESCRIPTION_LIMIT, "description"),
            )
            .await?
            .into_option();

        draft.url = prompt
            .ask_text(
                self.ask(&draft, "Please __**send a link**__ the title should open:", true)?,
                self.skippable(),
                |reply| validate_link(&reply.content),
            )
            .await?
            .into_option();

        let thumbnail = prompt
            .ask_text(
                self.ask(&draft, "Please __**send a thumbnail image link**__:", true)?,
                self.skippable(),
                |reply| validate_image(&reply.content),
            )
            .await?
            .into_option();

        let image = prompt
            .ask_text(
                self.ask(&draft, "Please __**send a large image link**__:", true)?,
                self.skippable(),
                |reply| validate_image(&reply.content),
            )
            .await?
            .into_option();

        draft.author = prompt
            .ask_text(
                self.ask(
                    &draft,
                    "Please __**send the author name**__ shown above the title:",
                    true,
                )?,
                self.skippable(),
                |reply| validate_length(&reply.content, TITLE_LIMIT, "author name"),
            )
            .await?
            .into_option();

        let author = match draft.author.clone() {
            Some(name) => {
                let icon_url = prompt
                    .ask_text(
                        self.ask(
                            &draft,
                            "Please __**send an icon image link**__ for the author:",
                            true,
                        )?,
                        self.skippable(),
                        |reply| validate_image(&reply.content),
                    )
                    .await?
                    .into_option();
                Some(MessageAuthor { name, icon_url })
            }
            None => None,
        };

        self.collect_fields(prompt, &mut draft).await?;

        let channels = match prompt
            .ask_text(
                self.ask(
                    &draft,
                    "Please __**mention every channel**__ this message should be sent to:",
                    false,
                )?,
                self.required(),
                |reply| {
                    let channels = reply.channel_mentions();
                    if channels.is_empty() {
                        Err(Rejection::invalid(
                            "You must include at least one channel mention. Please __**mention \
                             the channels**__ this message should be sent to:",
                        ))
                    } else {
                        Ok(channels.iter().map(|channel| channel.get()).collect::<Vec<_>>())
                    }
                },
            )
            .await?
        {
            Answer::Value(channels) => channels,
            Answer::Skipped => Vec::new(),
        };

        Ok(CustomMessage {
            title: draft.title,
            description: draft.description,
            url: draft.url,
            thumbnail,
            image,
            author,
            fields: draft.fields,
            channels,
        })
    }

    fn summary(&self, record: &CustomMessage) -> anyhow::Result<Embed> {
        Ok(self
            .style
            .builder()
            .title("Custom Embed Created")
            .description(format!(
                "**{}** was saved. A preview is shown below; use `{}message send` to post it.",
                record.title, self.prefix
            ))
            .field(field("Channels", channel_list(&record.channels), false))
            .validate()?
            .build())
    }

    fn audit_entry(
        &self,
        record: &CustomMessage,
        invocation: &Invocation,
    ) -> anyhow::Result<Embed> {
        created_audit_entry(&self.style, record, invocation.author_id.get())
    }

    async fn after_save(
        &self,
        transport: &dyn Transport,
        invocation: &Invocation,
        record: &CustomMessage,
    ) -> anyhow::Result<()> {
        let preview = render_custom_message(&self.style, record)?;
        transport
            .send_message(invocation.channel_id, &MessagePayload::embed(preview))
            .await?;
        Ok(())
    }
}
