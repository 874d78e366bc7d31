//! Wizard runner semantics with a small three-step flow.

use std::sync::Mutex;

use async_trait::async_trait;
use steward_utils::{
    embed::EmbedStyle,
    memory::MemoryTransport,
    prompt::{
        Answer, DEFAULT_REPLY_TIMEOUT, DONE_TOKENS, FlowError, Prompt, RecordSink,
        RepeatingSection, Rejection, SKIP_TOKENS, TaggedEmoji, TextStep, WizardFlow, WizardOutcome,
        run_wizard,
    },
    transport::{CustomEmoji, Invocation, ReactionEmoji},
};
use twilight_model::{
    channel::message::embed::Embed,
    id::{Id, marker::ChannelMarker},
};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Poll {
    question: String,
    note: Option<String>,
    options: Vec<String>,
}

struct PollFlow {
    style: EmbedStyle,
}

impl PollFlow {
    fn ask(&self, text: &str) -> Embed {
        self.style.simple("New poll", Some(text)).unwrap()
    }
}

#[async_trait]
impl WizardFlow for PollFlow {
    type Record = Poll;

    fn opening(&self) -> anyhow::Result<Embed> {
        self.style.simple("New poll", Some("Starting..."))
    }

    async fn collect(&self, prompt: &mut Prompt<'_>) -> Result<Poll, FlowError> {
        let step = TextStep::required(DEFAULT_REPLY_TIMEOUT);

        let question = match prompt
            .ask_text(self.ask("Question?"), step, |reply| Ok(reply.content.clone()))
            .await?
        {
            Answer::Value(question) => question,
            Answer::Skipped => String::new(),
        };

        let note = prompt
            .ask_text(
                self.ask("Note? (skip)"),
                TextStep::skippable(DEFAULT_REPLY_TIMEOUT, SKIP_TOKENS),
                |reply| Ok(reply.content.clone()),
            )
            .await?
            .into_option();

        let section = RepeatingSection::new(1, DONE_TOKENS);
        let mut options: Vec<String> = Vec::new();
        loop {
            let answer = prompt
                .ask_text(
                    self.ask("Option? (done)"),
                    TextStep::skippable(
                        DEFAULT_REPLY_TIMEOUT,
                        section.termination_tokens(options.len()),
                    ),
                    |reply| {
                        if options.contains(&reply.content) {
                            Err(Rejection::duplicate("Already an option."))
                        } else {
                            Ok(reply.content.clone())
                        }
                    },
                )
                .await?;

            match answer {
                Answer::Value(option) => options.push(option),
                Answer::Skipped => break,
            }
        }

        Ok(Poll {
            question,
            note,
            options,
        })
    }

    fn summary(&self, record: &Poll) -> anyhow::Result<Embed> {
        self.style.simple("Poll saved", Some(&record.question))
    }

    fn audit_entry(&self, record: &Poll, _invocation: &Invocation) -> anyhow::Result<Embed> {
        self.style.simple("Poll created", Some(&record.question))
    }
}

#[derive(Default)]
struct CountingSink {
    saved: Mutex<Vec<Poll>>,
}

#[async_trait]
impl RecordSink<Poll> for CountingSink {
    async fn save(&self, record: &Poll) -> anyhow::Result<()> {
        self.saved.lock().unwrap().push(record.clone());
        Ok(())
    }
}

fn setup() -> (MemoryTransport, Invocation) {
    let transport = MemoryTransport::new();
    let invoking = transport.user_message(Some(Id::new(1)), Id::new(2), Id::new(3), "!poll");
    let invocation = Invocation::from_message(&invoking);
    (transport, invocation)
}

fn reply(transport: &MemoryTransport, invocation: &Invocation, content: &str) {
    transport.push_message(transport.user_message(
        invocation.guild_id,
        invocation.channel_id,
        invocation.author_id,
        content,
    ));
}

const AUDIT: Option<Id<ChannelMarker>> = Some(Id::new(77));

#[tokio::test]
async fn completion_saves_exactly_once() {
    let (transport, invocation) = setup();
    let flow = PollFlow {
        style: EmbedStyle::default(),
    };
    let sink = CountingSink::default();

    for content in ["Lunch?", "skip", "pizza", "pizza", "tacos", "done"] {
        reply(&transport, &invocation, content);
    }

    let outcome = run_wizard(&transport, invocation, &flow, &sink, AUDIT)
        .await
        .unwrap();

    let expected = Poll {
        question: "Lunch?".to_owned(),
        note: None,
        options: vec!["pizza".to_owned(), "tacos".to_owned()],
    };
    assert_eq!(outcome, WizardOutcome::Completed(expected.clone()));
    assert_eq!(*sink.saved.lock().unwrap(), vec![expected]);
    assert_eq!(transport.sent_to(Id::new(77)).len(), 1);
}

#[tokio::test]
async fn done_is_an_answer_until_minimum_reached() {
    let (transport, invocation) = setup();
    let flow = PollFlow {
        style: EmbedStyle::default(),
    };
    let sink = CountingSink::default();

    for content in ["Q", "a note", "done", "done"] {
        reply(&transport, &invocation, content);
    }

    let outcome = run_wizard(&transport, invocation, &flow, &sink, None)
        .await
        .unwrap();

    let WizardOutcome::Completed(poll) = outcome else {
        panic!("wizard did not complete");
    };
    assert_eq!(poll.note.as_deref(), Some("a note"));
    assert_eq!(poll.options, vec!["done".to_owned()]);
}

#[tokio::test]
async fn timeout_at_any_step_never_saves() {
    let scripts: [&[&str]; 4] = [
        &[],
        &["Q"],
        &["Q", "skip"],
        &["Q", "skip", "first"],
    ];

    for script in scripts {
        let (transport, invocation) = setup();
        let flow = PollFlow {
            style: EmbedStyle::default(),
        };
        let sink = CountingSink::default();

        for content in script {
            reply(&transport, &invocation, content);
        }

        let outcome = run_wizard(&transport, invocation, &flow, &sink, AUDIT)
            .await
            .unwrap();

        assert_eq!(outcome, WizardOutcome::Aborted);
        assert!(sink.saved.lock().unwrap().is_empty());
        assert!(transport.sent_to(Id::new(77)).is_empty());
    }
}

#[tokio::test]
async fn replies_from_others_are_not_answers() {
    let (transport, invocation) = setup();
    let flow = PollFlow {
        style: EmbedStyle::default(),
    };
    let sink = CountingSink::default();

    transport.push_message(transport.user_message(
        invocation.guild_id,
        invocation.channel_id,
        Id::new(500),
        "hijack",
    ));
    transport.push_message(transport.user_message(
        invocation.guild_id,
        Id::new(600),
        invocation.author_id,
        "wrong channel",
    ));
    for content in ["Real", "skip", "x", "done"] {
        reply(&transport, &invocation, content);
    }

    let outcome = run_wizard(&transport, invocation, &flow, &sink, None)
        .await
        .unwrap();

    let WizardOutcome::Completed(poll) = outcome else {
        panic!("wizard did not complete");
    };
    assert_eq!(poll.question, "Real");
}

#[tokio::test]
async fn unknown_custom_emoji_is_asked_again() {
    let (transport, invocation) = setup();
    transport.register_emoji(CustomEmoji {
        id: Id::new(41),
        name: "party".to_owned(),
        animated: false,
    });

    let question = EmbedStyle::default().simple("Pick", Some("React")).unwrap();
    let mut prompt = Prompt::open(&transport, invocation, question).await.unwrap();
    let target = prompt.message();

    for id in [40, 41] {
        transport.push_reaction_add(
            invocation.guild_id,
            target,
            invocation.author_id,
            ReactionEmoji::Custom {
                id: Id::new(id),
                name: Some("party".to_owned()),
                animated: false,
            },
        );
    }

    let again = prompt.question().clone();
    let tagged = prompt
        .ask_reaction(again, DEFAULT_REPLY_TIMEOUT, |emoji| Ok(emoji.clone()))
        .await
        .unwrap();

    assert_eq!(
        tagged,
        TaggedEmoji::Custom(CustomEmoji {
            id: Id::new(41),
            name: "party".to_owned(),
            animated: false,
        })
    );
    let shown = transport.latest_payload(target).unwrap();
    assert!(
        shown.embeds[0]
            .description
            .as_deref()
            .unwrap_or_default()
            .contains("cannot access that emoji")
    );
}
