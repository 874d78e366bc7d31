/// Audit log mirroring.
pub mod audit;
/// Best-effort cleanup helpers for prompt and menu messages.
pub mod cleanup;
/// Generic embed builders shared across commands.
pub mod embed;
/// In-memory transport used by tests and dry runs.
pub mod memory;
/// Default message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Paginated sources and the reaction menu controller.
pub mod pagination;
/// Pure parser helpers.
pub mod parse;
/// Permission helper utilities.
pub mod permissions;
/// Timed prompt steps, wizards and confirmation menus.
pub mod prompt;
/// Shared time helpers.
pub mod time;
/// Transport adapter contract consumed by prompts and menus.
pub mod transport;
/// Twilight-backed transport adapter.
pub mod twilight;
