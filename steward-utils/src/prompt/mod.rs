//! Interactive prompts: timed question steps, multi-step wizards and
//! yes/no confirmation menus.

pub mod confirm;
mod error;
pub mod step;
pub mod wizard;

pub use confirm::{CONFIRM_TIMEOUT, confirm};
pub use error::{FlowError, Rejection};
pub use step::{Answer, DEFAULT_REPLY_TIMEOUT, Prompt, TaggedEmoji, TextStep};
pub use wizard::{RecordSink, RepeatingSection, WizardFlow, WizardOutcome, run_wizard};

/// Reply that skips an optional step.
pub const SKIP_TOKENS: &[&str] = &["skip"];
/// Reply that leaves an optional description empty.
pub const NONE_TOKENS: &[&str] = &["none"];
/// Reply that closes a repeating section.
pub const DONE_TOKENS: &[&str] = &["done"];
