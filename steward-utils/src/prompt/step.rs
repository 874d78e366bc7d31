//! A prompt message that is edited in place for every question of a flow.

use std::time::Duration;

use tracing::debug;
use twilight_model::channel::message::embed::Embed;

use super::error::{FlowError, Rejection};
use crate::{
    cleanup::{discard_message, discard_reaction, mark_failed},
    parse::matches_token,
    transport::{
        CustomEmoji, InboundMessage, Invocation, MessagePayload, MessageRef, ReactionEmoji,
        Transport,
    },
};

pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(180);

/// How long to wait for a text reply and which replies skip the step.
#[derive(Clone, Copy, Debug)]
pub struct TextStep<'a> {
    pub timeout: Duration,
    pub skip_tokens: &'a [&'a str],
}

impl<'a> TextStep<'a> {
    pub fn required(timeout: Duration) -> Self {
        Self {
            timeout,
            skip_tokens: &[],
        }
    }

    pub fn skippable(timeout: Duration, skip_tokens: &'a [&'a str]) -> Self {
        Self {
            timeout,
            skip_tokens,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer<V> {
    Value(V),
    Skipped,
}

impl<V> Answer<V> {
    pub fn into_option(self) -> Option<V> {
        match self {
            Self::Value(value) => Some(value),
            Self::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// A reaction emoji after resolution: custom emoji are known to be usable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaggedEmoji {
    Custom(CustomEmoji),
    Unicode(String),
}

const UNAVAILABLE_EMOJI: &str = "I'm sorry, I cannot access that emoji. Please react with an \
     emoji from this server or a default emoji.";

pub struct Prompt<'t> {
    transport: &'t dyn Transport,
    invocation: Invocation,
    message: MessageRef,
    question: Embed,
}

impl<'t> Prompt<'t> {
    /// Post the prompt message in the invoking channel.
    pub async fn open(
        transport: &'t dyn Transport,
        invocation: Invocation,
        question: Embed,
    ) -> Result<Prompt<'t>, FlowError> {
        let message = transport
            .send_message(invocation.channel_id, &MessagePayload::embed(question.clone()))
            .await?;

        Ok(Self {
            transport,
            invocation,
            message,
            question,
        })
    }

    pub fn message(&self) -> MessageRef {
        self.message
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn transport(&self) -> &'t dyn Transport {
        self.transport
    }

    pub fn question(&self) -> &Embed {
        &self.question
    }

    /// Replace the prompt's embed with a new question.
    pub async fn show(&mut self, question: Embed) -> Result<(), FlowError> {
        self.question = question;
        self.transport
            .edit_message(self.message, &MessagePayload::embed(self.question.clone()))
            .await?;
        Ok(())
    }

    /// Ask for a text reply from the invoker in the invoking channel.
    ///
    /// Skip tokens short-circuit to [`Answer::Skipped`] without reaching the
    /// validator. A rejected reply rewrites the question and waits again
    /// with a fresh timeout.
    pub async fn ask_text<V, F>(
        &mut self,
        question: Embed,
        step: TextStep<'_>,
        mut validate: F,
    ) -> Result<Answer<V>, FlowError>
    where
        F: FnMut(&InboundMessage) -> Result<V, Rejection> + Send,
    {
        self.show(question).await?;

        loop {
            let Some(reply) = self
                .transport
                .await_message(self.invocation.reply_filter(), step.timeout)
                .await
            else {
                self.abandon().await;
                return Err(FlowError::TimedOut);
            };

            discard_message(self.transport, reply.message_ref()).await;

            if matches_token(&reply.content, step.skip_tokens) {
                return Ok(Answer::Skipped);
            }

            match validate(&reply) {
                Ok(value) => return Ok(Answer::Value(value)),
                Err(rejection) => self.reject(&rejection).await?,
            }
        }
    }

    /// Ask the invoker to react on the prompt message.
    pub async fn ask_reaction<V, F>(
        &mut self,
        question: Embed,
        timeout: Duration,
        mut validate: F,
    ) -> Result<V, FlowError>
    where
        F: FnMut(&TaggedEmoji) -> Result<V, Rejection> + Send,
    {
        self.show(question).await?;

        loop {
            let Some(event) = self
                .transport
                .await_reaction(self.invocation.reaction_filter(self.message), timeout)
                .await
            else {
                self.abandon().await;
                return Err(FlowError::TimedOut);
            };

            discard_reaction(self.transport, self.message, &event.emoji, event.user_id).await;

            let outcome = match self.resolve(&event.emoji).await {
                Ok(tagged) => validate(&tagged),
                Err(rejection) => Err(rejection),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(rejection) => self.reject(&rejection).await?,
            }
        }
    }

    async fn resolve(&self, emoji: &ReactionEmoji) -> Result<TaggedEmoji, Rejection> {
        let (id, guild_id) = match emoji {
            ReactionEmoji::Unicode(name) => return Ok(TaggedEmoji::Unicode(name.clone())),
            ReactionEmoji::Custom { id, .. } => (*id, self.invocation.guild_id),
        };

        let Some(guild_id) = guild_id else {
            return Err(Rejection::unavailable(UNAVAILABLE_EMOJI));
        };

        match self.transport.resolve_custom_emoji(guild_id, id).await {
            Ok(Some(resolved)) => Ok(TaggedEmoji::Custom(resolved)),
            Ok(None) => Err(Rejection::unavailable(UNAVAILABLE_EMOJI)),
            Err(source) => {
                debug!(?source, emoji_id = id.get(), "emoji lookup failed");
                Err(Rejection::unavailable(UNAVAILABLE_EMOJI))
            }
        }
    }

    async fn reject(&mut self, rejection: &Rejection) -> Result<(), FlowError> {
        debug!(
            message_id = self.message.message_id.get(),
            ?rejection,
            "prompt reply rejected"
        );
        let mut question = self.question.clone();
        question.description = Some(rejection.message().to_owned());
        self.show(question).await
    }

    /// Remove the prompt and mark the invoking message as failed.
    pub async fn abandon(&self) {
        discard_message(self.transport, self.message).await;
        mark_failed(self.transport, &self.invocation).await;
    }

    /// Replace the prompt with the completion summary.
    pub async fn finish(mut self, summary: Embed) -> Result<MessageRef, FlowError> {
        self.show(summary).await?;
        Ok(self.message)
    }
}

#[cfg(test)]
mod tests {
    use twilight_model::id::Id;

    use super::*;
    use crate::{cleanup::FAILURE_GLYPH, embed::EmbedStyle, memory::MemoryTransport};

    fn invocation(transport: &MemoryTransport) -> Invocation {
        let message = transport.user_message(Some(Id::new(1)), Id::new(2), Id::new(3), "!cmd");
        Invocation::from_message(&message)
    }

    fn question(text: &str) -> Embed {
        EmbedStyle::default().simple("Question", Some(text)).unwrap()
    }

    #[tokio::test]
    async fn skip_token_never_reaches_validator() {
        let transport = MemoryTransport::new();
        let invocation = invocation(&transport);
        let mut prompt = Prompt::open(&transport, invocation, question("start"))
            .await
            .unwrap();

        transport.push_message(transport.user_message(
            invocation.guild_id,
            invocation.channel_id,
            invocation.author_id,
            "SKIP",
        ));

        let answer = prompt
            .ask_text(
                question("desc?"),
                TextStep::skippable(DEFAULT_REPLY_TIMEOUT, &["skip"]),
                |_| -> Result<String, Rejection> { panic!("validator saw skip token") },
            )
            .await
            .unwrap();

        assert!(answer.is_skipped());
    }

    #[tokio::test]
    async fn rejection_rewrites_question_and_retries() {
        let transport = MemoryTransport::new();
        let invocation = invocation(&transport);
        let mut prompt = Prompt::open(&transport, invocation, question("start"))
            .await
            .unwrap();

        for content in ["abc", "42"] {
            transport.push_message(transport.user_message(
                invocation.guild_id,
                invocation.channel_id,
                invocation.author_id,
                content,
            ));
        }

        let answer = prompt
            .ask_text(
                question("number?"),
                TextStep::required(DEFAULT_REPLY_TIMEOUT),
                |reply| {
                    reply
                        .content
                        .parse::<u32>()
                        .map_err(|_| Rejection::invalid("That is not a number, try again."))
                },
            )
            .await
            .unwrap();

        assert_eq!(answer, Answer::Value(42));

        let rewritten = transport
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                crate::memory::Call::Edit { payload, .. } => payload.embeds[0].description.clone(),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert!(rewritten.contains(&"That is not a number, try again.".to_owned()));
    }

    #[tokio::test]
    async fn timeout_removes_prompt_and_marks_invocation() {
        let transport = MemoryTransport::new();
        let invocation = invocation(&transport);
        let mut prompt = Prompt::open(&transport, invocation, question("start"))
            .await
            .unwrap();
        let prompt_message = prompt.message();

        let result = prompt
            .ask_text(
                question("title?"),
                TextStep::required(DEFAULT_REPLY_TIMEOUT),
                |reply| Ok(reply.content.clone()),
            )
            .await;

        assert!(matches!(result, Err(FlowError::TimedOut)));
        assert!(transport.was_deleted(prompt_message));
        assert_eq!(
            transport.own_reactions(invocation.message_ref()),
            vec![ReactionEmoji::unicode(FAILURE_GLYPH)]
        );
    }

    #[tokio::test]
    async fn timeout_cleanup_tolerates_missing_messages() {
        let transport = MemoryTransport::new();
        transport.fail_deletes(true);
        let invocation = invocation(&transport);
        let mut prompt = Prompt::open(&transport, invocation, question("start"))
            .await
            .unwrap();

        let result = prompt
            .ask_text(
                question("title?"),
                TextStep::required(DEFAULT_REPLY_TIMEOUT),
                |reply| Ok(reply.content.clone()),
            )
            .await;

        assert!(matches!(result, Err(FlowError::TimedOut)));
    }

    #[tokio::test]
    async fn inaccessible_custom_emoji_reprompts() {
        let transport = MemoryTransport::new();
        let invocation = invocation(&transport);
        let mut prompt = Prompt::open(&transport, invocation, question("start"))
            .await
            .unwrap();
        let target = prompt.message();

        transport.push_reaction_add(
            invocation.guild_id,
            target,
            invocation.author_id,
            ReactionEmoji::Custom {
                id: Id::new(404),
                name: Some("gone".to_owned()),
                animated: false,
            },
        );
        transport.push_reaction_add(
            invocation.guild_id,
            target,
            invocation.author_id,
            ReactionEmoji::unicode("🎉"),
        );

        let tagged = prompt
            .ask_reaction(question("react"), DEFAULT_REPLY_TIMEOUT, |emoji| {
                Ok(emoji.clone())
            })
            .await
            .unwrap();

        assert_eq!(tagged, TaggedEmoji::Unicode("🎉".to_owned()));
        let description = transport
            .latest_payload(target)
            .and_then(|payload| payload.embeds[0].description.clone());
        assert_eq!(description.as_deref(), Some(UNAVAILABLE_EMOJI));
    }
}
