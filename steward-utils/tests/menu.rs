//! Reaction menu behavior driven through the scripted transport.

use steward_utils::{
    embed::EmbedStyle,
    memory::MemoryTransport,
    pagination::{
        ListPageSource, MenuOptions, MenuOutcome, ReactionMenu, Selection,
        glyph::{FIRST_GLYPH, LAST_GLYPH, NEXT_GLYPH, NUMBER_GLYPHS, PREVIOUS_GLYPH, STOP_GLYPH},
    },
    transport::{Invocation, MessageRef, ReactionEmoji, ReactionEvent, ReactionKind},
};
use twilight_model::id::Id;

struct Harness {
    transport: MemoryTransport,
    invocation: Invocation,
    menu_message: MessageRef,
}

impl Harness {
    fn new() -> Self {
        let transport = MemoryTransport::new();
        let invoking =
            transport.user_message(Some(Id::new(10)), Id::new(20), Id::new(30), "!list");
        let invocation = Invocation::from_message(&invoking);
        let menu_message = transport.peek_next_message(invocation.channel_id);

        Self {
            transport,
            invocation,
            menu_message,
        }
    }

    fn press(&self, glyph: &str) {
        self.press_as(self.invocation.author_id.get(), glyph);
    }

    fn press_as(&self, user: u64, glyph: &str) {
        self.transport.push_reaction_add(
            self.invocation.guild_id,
            self.menu_message,
            Id::new(user),
            ReactionEmoji::unicode(glyph),
        );
    }

    fn release(&self, glyph: &str) {
        self.transport.push_reaction(ReactionEvent {
            kind: ReactionKind::Removed,
            guild_id: self.invocation.guild_id,
            channel_id: self.menu_message.channel_id,
            message_id: self.menu_message.message_id,
            user_id: self.invocation.author_id,
            emoji: ReactionEmoji::unicode(glyph),
        });
    }

    fn selector(&self, count: usize) -> ListPageSource {
        ListPageSource::new(EmbedStyle::default(), "Pick one", entries(count))
            .per_page(8)
            .selector(true)
    }
}

fn entries(count: usize) -> Vec<String> {
    (0..count).map(|index| format!("entry {index}")).collect()
}

fn glyphs(names: &[&str]) -> Vec<ReactionEmoji> {
    names.iter().map(|name| ReactionEmoji::unicode(name)).collect()
}

#[tokio::test]
async fn selection_maps_slot_to_absolute_index() {
    let harness = Harness::new();
    harness.press(NEXT_GLYPH);
    harness.press(NUMBER_GLYPHS[3]);

    let outcome = ReactionMenu::new(
        &harness.transport,
        harness.selector(20),
        harness.invocation,
        MenuOptions::default(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(
        outcome,
        MenuOutcome::Selected(Selection {
            index: 11,
            context: ()
        })
    );
    assert!(harness.transport.was_deleted(harness.menu_message));
    assert!(
        harness
            .transport
            .was_deleted(harness.invocation.message_ref())
    );
}

#[tokio::test]
async fn attaches_navigation_then_visible_numbers() {
    let harness = Harness::new();
    harness.press(STOP_GLYPH);

    ReactionMenu::new(
        &harness.transport,
        harness.selector(20),
        harness.invocation,
        MenuOptions::default(),
    )
    .run()
    .await
    .unwrap();

    let mut expected = glyphs(&[FIRST_GLYPH, PREVIOUS_GLYPH, NEXT_GLYPH, LAST_GLYPH, STOP_GLYPH]);
    expected.extend(glyphs(&NUMBER_GLYPHS));
    assert_eq!(harness.transport.reactions_added(harness.menu_message), expected);
}

#[tokio::test]
async fn short_last_page_hides_and_ignores_extra_slots() {
    let harness = Harness::new();
    harness.press(NEXT_GLYPH);
    harness.press(NUMBER_GLYPHS[4]);
    harness.press(NUMBER_GLYPHS[1]);

    let outcome = ReactionMenu::new(
        &harness.transport,
        harness.selector(10),
        harness.invocation,
        MenuOptions::default(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(outcome.into_selection().map(|selection| selection.index), Some(9));

    let remaining = harness.transport.own_reactions(harness.menu_message);
    let mut expected = glyphs(&[PREVIOUS_GLYPH, NEXT_GLYPH, STOP_GLYPH]);
    expected.extend(glyphs(&NUMBER_GLYPHS[..2]));
    assert_eq!(remaining, expected);
}

#[tokio::test]
async fn two_pages_have_no_jump_buttons() {
    let harness = Harness::new();
    harness.press(FIRST_GLYPH);
    harness.press(STOP_GLYPH);

    let outcome = ReactionMenu::new(
        &harness.transport,
        harness.selector(12),
        harness.invocation,
        MenuOptions::default(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(outcome, MenuOutcome::Stopped);
    let added = harness.transport.reactions_added(harness.menu_message);
    assert!(!added.contains(&ReactionEmoji::unicode(FIRST_GLYPH)));
    assert!(!added.contains(&ReactionEmoji::unicode(LAST_GLYPH)));
}

#[tokio::test]
async fn other_users_cannot_drive_the_menu() {
    let harness = Harness::new();
    harness.press_as(999, NUMBER_GLYPHS[0]);
    harness.press_as(999, STOP_GLYPH);
    harness.press(NUMBER_GLYPHS[2]);

    let outcome = ReactionMenu::new(
        &harness.transport,
        harness.selector(5),
        harness.invocation,
        MenuOptions::default(),
    )
    .with_context("delete")
    .run()
    .await
    .unwrap();

    assert_eq!(
        outcome,
        MenuOutcome::Selected(Selection {
            index: 2,
            context: "delete"
        })
    );
}

#[tokio::test]
async fn removing_a_reaction_also_navigates() {
    let harness = Harness::new();
    harness.press(NEXT_GLYPH);
    harness.release(NEXT_GLYPH);
    harness.press(NUMBER_GLYPHS[0]);

    let outcome = ReactionMenu::new(
        &harness.transport,
        harness.selector(30),
        harness.invocation,
        MenuOptions::default(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(outcome.into_selection().map(|selection| selection.index), Some(16));
}

#[tokio::test]
async fn idle_timeout_only_removes_menu_message() {
    let harness = Harness::new();

    let outcome = ReactionMenu::new(
        &harness.transport,
        harness.selector(3),
        harness.invocation,
        MenuOptions::from_secs(5),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(outcome, MenuOutcome::TimedOut);
    assert!(harness.transport.was_deleted(harness.menu_message));
    assert!(
        !harness
            .transport
            .was_deleted(harness.invocation.message_ref())
    );
}

#[tokio::test]
async fn browse_menu_ignores_number_glyphs() {
    let harness = Harness::new();
    harness.press(NUMBER_GLYPHS[0]);
    harness.press(LAST_GLYPH);
    harness.press(STOP_GLYPH);

    let source = ListPageSource::new(EmbedStyle::default(), "Browse", entries(30)).per_page(5);
    let outcome = ReactionMenu::new(
        &harness.transport,
        source,
        harness.invocation,
        MenuOptions::default(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(outcome, MenuOutcome::Stopped);

    let last_page = harness
        .transport
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            steward_utils::memory::Call::Edit { payload, .. } => Some(payload),
            _ => None,
        })
        .last()
        .and_then(|payload| payload.embeds[0].footer.clone())
        .map(|footer| footer.text);
    assert_eq!(last_page.as_deref(), Some("Page 6/6"));
}

#[tokio::test]
async fn start_at_is_clamped_to_last_page() {
    let harness = Harness::new();
    harness.press(NUMBER_GLYPHS[0]);

    let outcome = ReactionMenu::new(
        &harness.transport,
        harness.selector(9),
        harness.invocation,
        MenuOptions::default(),
    )
    .start_at(7)
    .run()
    .await
    .unwrap();

    assert_eq!(outcome.into_selection().map(|selection| selection.index), Some(8));
}

#[tokio::test]
async fn failed_page_turn_removes_menu() {
    let harness = Harness::new();
    harness.press(NEXT_GLYPH);
    harness.transport.fail_edits(true);

    let result = ReactionMenu::new(
        &harness.transport,
        harness.selector(20),
        harness.invocation,
        MenuOptions::default(),
    )
    .run()
    .await;

    assert!(result.is_err());
    assert!(harness.transport.was_deleted(harness.menu_message));
    assert!(
        !harness
            .transport
            .was_deleted(harness.invocation.message_ref())
    );
}

#[tokio::test]
async fn failed_glyph_while_binding_removes_menu() {
    let harness = Harness::new();
    harness.transport.fail_reactions(true);

    let result = ReactionMenu::new(
        &harness.transport,
        harness.selector(3),
        harness.invocation,
        MenuOptions::default(),
    )
    .run()
    .await;

    assert!(result.is_err());
    assert!(harness.transport.was_deleted(harness.menu_message));
}
