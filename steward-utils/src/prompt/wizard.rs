//! Multi-step wizards: a flow collects a record through one prompt message,
//! and the record is saved exactly once when the flow completes.

use async_trait::async_trait;
use tracing::{info, warn};
use twilight_model::{
    channel::message::embed::Embed,
    id::{Id, marker::ChannelMarker},
};

use super::{error::FlowError, step::Prompt};
use crate::{
    audit::post_audit_entry,
    cleanup::discard_message,
    transport::{Invocation, Transport},
};

/// Receives completed records.
#[async_trait]
pub trait RecordSink<R>: Send + Sync {
    async fn save(&self, record: &R) -> anyhow::Result<()>;
}

/// A guided flow producing one record.
///
/// `collect` owns the accumulator; the wizard only sees the finished record,
/// so an aborted flow can never leave a partial record behind.
#[async_trait]
pub trait WizardFlow: Send + Sync {
    type Record: Send + Sync;

    /// First embed posted when the wizard opens.
    fn opening(&self) -> anyhow::Result<Embed>;

    async fn collect(&self, prompt: &mut Prompt<'_>) -> Result<Self::Record, FlowError>;

    /// Replaces the prompt once the record is saved.
    fn summary(&self, record: &Self::Record) -> anyhow::Result<Embed>;

    /// Entry mirrored to the audit log channel.
    fn audit_entry(&self, record: &Self::Record, invocation: &Invocation) -> anyhow::Result<Embed>;

    async fn after_save(
        &self,
        _transport: &dyn Transport,
        _invocation: &Invocation,
        _record: &Self::Record,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WizardOutcome<R> {
    Completed(R),
    Aborted,
}

/// Bounds for a section that repeats until a done token.
#[derive(Clone, Copy, Debug)]
pub struct RepeatingSection<'a> {
    pub min_entries: usize,
    pub done_tokens: &'a [&'a str],
}

impl<'a> RepeatingSection<'a> {
    pub fn new(min_entries: usize, done_tokens: &'a [&'a str]) -> Self {
        Self {
            min_entries,
            done_tokens,
        }
    }

    pub fn may_finish(&self, collected: usize) -> bool {
        collected >= self.min_entries
    }

    /// Tokens that end the section; empty until the minimum is reached.
    pub fn termination_tokens(&self, collected: usize) -> &'a [&'a str] {
        if self.may_finish(collected) {
            self.done_tokens
        } else {
            &[]
        }
    }
}

/// Drive a flow from opening question to saved record.
pub async fn run_wizard<F: WizardFlow>(
    transport: &dyn Transport,
    invocation: Invocation,
    flow: &F,
    sink: &dyn RecordSink<F::Record>,
    audit_channel: Option<Id<ChannelMarker>>,
) -> anyhow::Result<WizardOutcome<F::Record>> {
    let mut prompt = Prompt::open(transport, invocation, flow.opening()?).await?;
    let prompt_message = prompt.message();

    let record = match flow.collect(&mut prompt).await {
        Ok(record) => record,
        Err(FlowError::TimedOut) => {
            info!(
                channel_id = invocation.channel_id.get(),
                user_id = invocation.author_id.get(),
                "wizard timed out"
            );
            return Ok(WizardOutcome::Aborted);
        }
        Err(FlowError::Transport(source)) => {
            discard_message(transport, prompt_message).await;
            return Err(source);
        }
    };

    if let Err(source) = sink.save(&record).await {
        prompt.abandon().await;
        return Err(source);
    }

    prompt.finish(flow.summary(&record)?).await?;

    if let Err(source) = flow.after_save(transport, &invocation, &record).await {
        warn!(
            ?source,
            channel_id = invocation.channel_id.get(),
            "post-save step failed"
        );
    }

    if audit_channel.is_some() {
        post_audit_entry(transport, audit_channel, flow.audit_entry(&record, &invocation)).await;
    }

    Ok(WizardOutcome::Completed(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn termination_tokens_wait_for_minimum() {
        let section = RepeatingSection::new(1, &["done"]);
        assert!(section.termination_tokens(0).is_empty());
        assert_eq!(section.termination_tokens(1), &["done"]);

        let open = RepeatingSection::new(0, &["done", "skip"]);
        assert_eq!(open.termination_tokens(0).len(), 2);
    }
}
