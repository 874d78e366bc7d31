//! Reaction glyphs used as menu buttons.

use std::{collections::HashMap, ops::Range};

use super::page::MAX_PAGE_SIZE;

pub const FIRST_GLYPH: &str = "\u{23ee}\u{fe0f}";
pub const PREVIOUS_GLYPH: &str = "\u{25c0}\u{fe0f}";
pub const NEXT_GLYPH: &str = "\u{25b6}\u{fe0f}";
pub const LAST_GLYPH: &str = "\u{23ed}\u{fe0f}";
pub const STOP_GLYPH: &str = "\u{23f9}\u{fe0f}";

/// Keycap digits one through eight, one per selectable slot.
pub const NUMBER_GLYPHS: [&str; MAX_PAGE_SIZE] = [
    "1\u{fe0f}\u{20e3}",
    "2\u{fe0f}\u{20e3}",
    "3\u{fe0f}\u{20e3}",
    "4\u{fe0f}\u{20e3}",
    "5\u{fe0f}\u{20e3}",
    "6\u{fe0f}\u{20e3}",
    "7\u{fe0f}\u{20e3}",
    "8\u{fe0f}\u{20e3}",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuButton {
    First,
    Previous,
    Next,
    Last,
    Stop,
    /// Zero-based slot on the current page.
    Select(usize),
}

impl MenuButton {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::First => FIRST_GLYPH,
            Self::Previous => PREVIOUS_GLYPH,
            Self::Next => NEXT_GLYPH,
            Self::Last => LAST_GLYPH,
            Self::Stop => STOP_GLYPH,
            Self::Select(slot) => NUMBER_GLYPHS[slot.min(MAX_PAGE_SIZE - 1)],
        }
    }
}

/// Clients are inconsistent about the variation selector; compare without it.
pub fn normalize_glyph(glyph: &str) -> String {
    glyph.chars().filter(|ch| *ch != '\u{fe0f}').collect()
}

/// Navigation buttons for a menu, in display order. Jump buttons only make
/// sense once there are more than two pages.
pub fn navigation_buttons(page_count: usize) -> Vec<MenuButton> {
    let mut buttons = Vec::new();

    if page_count > 1 {
        if page_count > 2 {
            buttons.push(MenuButton::First);
        }
        buttons.push(MenuButton::Previous);
        buttons.push(MenuButton::Next);
        if page_count > 2 {
            buttons.push(MenuButton::Last);
        }
    }

    buttons.push(MenuButton::Stop);
    buttons
}

/// A number glyph is shown iff its slot holds an entry on the current page.
pub fn is_slot_visible(slot: usize, entry_count: usize) -> bool {
    slot < entry_count.min(MAX_PAGE_SIZE)
}

/// Lookup from normalized glyph to button.
pub fn button_table(selector: bool) -> HashMap<String, MenuButton> {
    let mut table: HashMap<String, MenuButton> = [
        MenuButton::First,
        MenuButton::Previous,
        MenuButton::Next,
        MenuButton::Last,
        MenuButton::Stop,
    ]
    .into_iter()
    .map(|button| (normalize_glyph(button.glyph()), button))
    .collect();

    if selector {
        for (slot, glyph) in NUMBER_GLYPHS.iter().enumerate() {
            table.insert(normalize_glyph(glyph), MenuButton::Select(slot));
        }
    }

    table
}

/// Number-glyph slots to add and remove when a page with `old_count`
/// entries is replaced by one with `new_count` entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphDelta {
    pub add: Range<usize>,
    pub remove: Range<usize>,
}

impl GlyphDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

pub fn glyph_delta(old_count: usize, new_count: usize) -> GlyphDelta {
    let old_count = old_count.min(MAX_PAGE_SIZE);
    let new_count = new_count.min(MAX_PAGE_SIZE);

    if new_count >= old_count {
        GlyphDelta {
            add: old_count..new_count,
            remove: 0..0,
        }
    } else {
        GlyphDelta {
            add: 0..0,
            remove: new_count..old_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_buttons_only_beyond_two_pages() {
        assert_eq!(navigation_buttons(1), vec![MenuButton::Stop]);
        assert_eq!(
            navigation_buttons(2),
            vec![MenuButton::Previous, MenuButton::Next, MenuButton::Stop]
        );
        assert_eq!(navigation_buttons(5).len(), 5);
    }

    #[test]
    fn delta_only_touches_changed_slots() {
        let shrink = glyph_delta(8, 3);
        assert_eq!(shrink.remove, 3..8);
        assert!(shrink.add.is_empty());

        let grow = glyph_delta(3, 8);
        assert_eq!(grow.add, 3..8);
        assert!(grow.remove.is_empty());

        assert!(glyph_delta(8, 8).is_empty());
    }

    #[test]
    fn visible_glyphs_match_entries() {
        for entries in 0..=MAX_PAGE_SIZE {
            let visible = (0..MAX_PAGE_SIZE)
                .filter(|slot| is_slot_visible(*slot, entries))
                .count();
            assert_eq!(visible, entries);
        }
    }

    #[test]
    fn lookup_ignores_variation_selector() {
        let table = button_table(true);
        assert_eq!(
            table.get(&normalize_glyph("3\u{20e3}")),
            Some(&MenuButton::Select(2))
        );
        assert_eq!(
            table.get(&normalize_glyph("\u{25b6}")),
            Some(&MenuButton::Next)
        );
        assert!(!button_table(false).contains_key(&normalize_glyph(NUMBER_GLYPHS[0])));
    }
}
