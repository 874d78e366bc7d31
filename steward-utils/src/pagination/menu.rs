//! Reaction-driven menu bound to one message.
//!
//! The session lives only in the task running [`ReactionMenu::run`]; nothing
//! is shared, so one menu maps to exactly one live message.

use std::{collections::HashMap, time::Duration};

use tokio::time::Instant;
use tracing::debug;

use super::{
    DEFAULT_TIMEOUT_SECS,
    glyph::{
        MenuButton, NUMBER_GLYPHS, button_table, glyph_delta, is_slot_visible, navigation_buttons,
        normalize_glyph,
    },
    page::{MAX_PAGE_SIZE, absolute_index, clamp_page},
    source::PageSource,
};
use crate::{
    cleanup::discard_message,
    transport::{
        Invocation, MessagePayload, MessageRef, ReactionEmoji, ReactionPredicate, Transport,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuOptions {
    /// Idle time after which the menu tears itself down. Reset by every
    /// honored reaction.
    pub timeout: Duration,
}

impl MenuOptions {
    pub fn from_secs(seconds: u64) -> Self {
        Self {
            timeout: Duration::from_secs(seconds),
        }
    }
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self::from_secs(DEFAULT_TIMEOUT_SECS)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuState {
    Idle,
    Bound,
    Navigating,
    AwaitingSelection,
    TornDown,
}

/// A picked entry: its index in the full list plus the caller's context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection<C> {
    pub index: usize,
    pub context: C,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuOutcome<C> {
    Selected(Selection<C>),
    Stopped,
    TimedOut,
}

impl<C> MenuOutcome<C> {
    pub fn into_selection(self) -> Option<Selection<C>> {
        match self {
            Self::Selected(selection) => Some(selection),
            Self::Stopped | Self::TimedOut => None,
        }
    }
}

/// How a session ended, before the caller's context is attached.
enum Ended {
    Selected(usize),
    Stopped,
    TimedOut,
}

pub struct ReactionMenu<'t, S, C = ()> {
    transport: &'t dyn Transport,
    source: S,
    invocation: Invocation,
    options: MenuOptions,
    context: C,
    selector: bool,
    buttons: HashMap<String, MenuButton>,
    state: MenuState,
    current_page: usize,
    shown_slots: usize,
    message: Option<MessageRef>,
}

impl<'t, S: PageSource> ReactionMenu<'t, S, ()> {
    pub fn new(
        transport: &'t dyn Transport,
        source: S,
        invocation: Invocation,
        options: MenuOptions,
    ) -> Self {
        let selector = source.is_selector();

        Self {
            transport,
            source,
            invocation,
            options,
            context: (),
            selector,
            buttons: button_table(selector),
            state: MenuState::Idle,
            current_page: 0,
            shown_slots: 0,
            message: None,
        }
    }
}

impl<'t, S: PageSource, C: Send> ReactionMenu<'t, S, C> {
    /// Attach a value handed back with the selection.
    pub fn with_context<D: Send>(self, context: D) -> ReactionMenu<'t, S, D> {
        ReactionMenu {
            transport: self.transport,
            source: self.source,
            invocation: self.invocation,
            options: self.options,
            context,
            selector: self.selector,
            buttons: self.buttons,
            state: self.state,
            current_page: self.current_page,
            shown_slots: self.shown_slots,
            message: self.message,
        }
    }

    pub fn start_at(mut self, page: usize) -> Self {
        self.current_page = page;
        self
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Post the first page, attach glyphs and react to the invoker until a
    /// selection, a stop or the idle timeout.
    ///
    /// A failed transport call removes the menu message before the error is
    /// returned.
    pub async fn run(mut self) -> anyhow::Result<MenuOutcome<C>> {
        match self.drive().await {
            Ok(Ended::Selected(index)) => Ok(MenuOutcome::Selected(Selection {
                index,
                context: self.context,
            })),
            Ok(Ended::Stopped) => Ok(MenuOutcome::Stopped),
            Ok(Ended::TimedOut) => Ok(MenuOutcome::TimedOut),
            Err(source) => {
                debug!(?source, "menu aborted");
                self.tear_down(false).await;
                Err(source)
            }
        }
    }

    async fn drive(&mut self) -> anyhow::Result<Ended> {
        let message = self.bind().await?;
        let mut deadline = Instant::now() + self.options.timeout;

        loop {
            self.state = self.waiting_state();

            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(event) = self
                .transport
                .await_reaction(self.reaction_filter(message), remaining)
                .await
            else {
                debug!(
                    message_id = message.message_id.get(),
                    page = self.current_page,
                    "menu timed out"
                );
                self.tear_down(false).await;
                return Ok(Ended::TimedOut);
            };

            let Some(button) = event
                .emoji
                .as_unicode()
                .and_then(|glyph| self.buttons.get(&normalize_glyph(glyph)).copied())
            else {
                continue;
            };

            deadline = Instant::now() + self.options.timeout;

            match button {
                MenuButton::Stop => {
                    self.stop().await;
                    return Ok(Ended::Stopped);
                }
                MenuButton::Select(slot) => {
                    let Some(index) = self.resolve_slot(slot) else {
                        continue;
                    };
                    debug!(
                        message_id = message.message_id.get(),
                        index, "menu selection"
                    );
                    self.tear_down(true).await;
                    return Ok(Ended::Selected(index));
                }
                navigation => {
                    let target = self.target_page(navigation);
                    self.show_page(message, target).await?;
                }
            }
        }
    }

    /// Delete the menu and the invoking message.
    pub async fn stop(&mut self) {
        self.tear_down(true).await;
    }

    async fn bind(&mut self) -> anyhow::Result<MessageRef> {
        let page_count = self.source.page_count();
        self.current_page = clamp_page(self.current_page, page_count);

        let embed = self.source.render(self.current_page)?;
        let message = self
            .transport
            .send_message(self.invocation.channel_id, &MessagePayload::embed(embed))
            .await?;
        self.message = Some(message);
        self.state = MenuState::Bound;

        for button in navigation_buttons(page_count) {
            self.transport
                .add_reaction(message, &ReactionEmoji::unicode(button.glyph()))
                .await?;
        }

        if self.selector {
            let entries = self.source.entries_on(self.current_page);
            for slot in (0..MAX_PAGE_SIZE).filter(|slot| is_slot_visible(*slot, entries)) {
                self.transport
                    .add_reaction(message, &ReactionEmoji::unicode(NUMBER_GLYPHS[slot]))
                    .await?;
            }
            self.shown_slots = entries.min(MAX_PAGE_SIZE);
        }

        debug!(
            channel_id = message.channel_id.get(),
            message_id = message.message_id.get(),
            page_count,
            selector = self.selector,
            "menu bound"
        );

        Ok(message)
    }

    fn waiting_state(&self) -> MenuState {
        if self.selector {
            MenuState::AwaitingSelection
        } else {
            MenuState::Bound
        }
    }

    /// Both adds and removes count, so toggling a glyph works either way.
    fn reaction_filter(&self, message: MessageRef) -> ReactionPredicate {
        let author_id = self.invocation.author_id;
        Box::new(move |event| event.message_id == message.message_id && event.user_id == author_id)
    }

    fn target_page(&self, button: MenuButton) -> usize {
        match button {
            MenuButton::First => 0,
            MenuButton::Previous => self.current_page.saturating_sub(1),
            MenuButton::Next => self.current_page + 1,
            MenuButton::Last => self.source.page_count().saturating_sub(1),
            MenuButton::Stop | MenuButton::Select(_) => self.current_page,
        }
    }

    fn resolve_slot(&self, slot: usize) -> Option<usize> {
        if !is_slot_visible(slot, self.source.entries_on(self.current_page)) {
            return None;
        }

        let index = absolute_index(self.current_page, self.source.per_page(), slot);
        (index < self.source.entry_count()).then_some(index)
    }

    async fn show_page(&mut self, message: MessageRef, target: usize) -> anyhow::Result<()> {
        if target >= self.source.page_count() || target == self.current_page {
            return Ok(());
        }

        self.state = MenuState::Navigating;

        let embed = self.source.render(target)?;
        self.transport
            .edit_message(message, &MessagePayload::embed(embed))
            .await?;

        if self.selector {
            let entries = self.source.entries_on(target);
            let delta = glyph_delta(self.shown_slots, entries);

            for slot in delta.remove {
                let glyph = ReactionEmoji::unicode(NUMBER_GLYPHS[slot]);
                if let Err(source) = self.transport.remove_own_reaction(message, &glyph).await {
                    debug!(?source, slot, "could not remove number glyph");
                }
            }
            for slot in delta.add {
                self.transport
                    .add_reaction(message, &ReactionEmoji::unicode(NUMBER_GLYPHS[slot]))
                    .await?;
            }

            self.shown_slots = entries.min(MAX_PAGE_SIZE);
        }

        self.current_page = target;
        Ok(())
    }

    async fn tear_down(&mut self, delete_invocation: bool) {
        if self.state == MenuState::TornDown {
            return;
        }
        self.state = MenuState::TornDown;

        if let Some(message) = self.message.take() {
            discard_message(self.transport, message).await;
        }
        if delete_invocation {
            discard_message(self.transport, self.invocation.message_ref()).await;
        }
    }
}
