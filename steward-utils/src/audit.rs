use tracing::warn;
use twilight_model::{
    channel::message::embed::Embed,
    id::{Id, marker::ChannelMarker},
};

use crate::transport::{MessagePayload, Transport};

/// Mirror an audit entry to a log channel, if one is configured.
///
/// Failures to build or send the entry are logged and never reach the caller.
pub async fn post_audit_entry(
    transport: &dyn Transport,
    channel_id: Option<Id<ChannelMarker>>,
    entry: anyhow::Result<Embed>,
) {
    let Some(channel_id) = channel_id else {
        return;
    };

    let result = match entry {
        Ok(embed) => transport
            .send_message(channel_id, &MessagePayload::embed(embed))
            .await
            .map(|_| ()),
        Err(source) => Err(source),
    };

    if let Err(source) = result {
        warn!(
            ?source,
            channel_id = channel_id.get(),
            "could not post audit entry"
        );
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use twilight_model::id::Id;

    use super::*;
    use crate::{embed::EmbedStyle, memory::MemoryTransport};

    #[tokio::test]
    async fn entry_goes_to_configured_channel_only() {
        let transport = MemoryTransport::new();
        let entry = || EmbedStyle::default().simple("Logged", None);

        post_audit_entry(&transport, None, entry()).await;
        assert!(transport.sent().is_empty());

        post_audit_entry(&transport, Some(Id::new(77)), entry()).await;
        post_audit_entry(&transport, Some(Id::new(77)), Err(anyhow!("bad embed"))).await;
        assert_eq!(transport.sent_to(Id::new(77)).len(), 1);
    }
}
