//! Stable facade for pagination helpers used by command handlers.

/// Default idle timeout for reaction menus.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub mod glyph;
pub mod menu;
mod page;
pub mod source;

pub use menu::{MenuOptions, MenuOutcome, MenuState, ReactionMenu, Selection};
pub use page::{
    MAX_PAGE_SIZE, absolute_index, clamp_page, effective_page_size, page_window,
    parse_one_based_page, total_pages,
};
pub use source::{FieldPageSource, ListPageSource, PageSource};
