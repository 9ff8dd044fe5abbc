//! Use case for turning inbound channel frames into presentation entries.

use thiserror::Error;

use crate::domain::message::{InboundMessage, PresentedMessage};

use super::{
    attribution::IdentityCache,
    contracts::{DirectoryClient, DirectoryError, InboundFrames, PresentationSink},
};

const RECEIVE_FRAME_DECODED: &str = "RECEIVE_FRAME_DECODED";
const RECEIVE_FRAME_DROPPED: &str = "RECEIVE_FRAME_DROPPED";
const RECEIVE_LOOP_STOPPED: &str = "RECEIVE_LOOP_STOPPED";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiveError {
    #[error("malformed inbound frame: {details}")]
    MalformedMessage { details: String },
    #[error("no directory entry for sender id {from_user_id}")]
    UnattributedMessage { from_user_id: i64 },
    #[error("sender attribution failed: {0}")]
    LookupFailed(#[source] DirectoryError),
}

impl ReceiveError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedMessage { .. } => "RECEIVE_MALFORMED_MESSAGE",
            Self::UnattributedMessage { .. } => "RECEIVE_UNATTRIBUTED_MESSAGE",
            Self::LookupFailed(_) => "RECEIVE_LOOKUP_FAILED",
        }
    }
}

/// Counters reported when the receive loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveSummary {
    pub presented: usize,
    pub dropped: usize,
}

pub struct InboundReceiver<D> {
    identities: IdentityCache<D>,
}

impl<D> InboundReceiver<D>
where
    D: DirectoryClient,
{
    pub fn new(directory: D) -> Self {
        Self {
            identities: IdentityCache::new(directory),
        }
    }

    /// Decodes and attributes a single frame.
    pub async fn on_frame(&mut self, raw: &str) -> Result<PresentedMessage, ReceiveError> {
        let message =
            InboundMessage::from_json(raw).map_err(|error| ReceiveError::MalformedMessage {
                details: error.to_string(),
            })?;
        tracing::debug!(
            code = RECEIVE_FRAME_DECODED,
            from_user_id = message.from_user_id,
            message_id = ?message.message_id,
            to_user_id = ?message.to_user_id,
            status = ?message.message_status,
            group = ?message.is_group_message,
            broadcast = ?message.is_broadcast_message,
            "inbound frame decoded"
        );

        let author = self
            .identities
            .display_name(message.from_user_id)
            .await
            .map_err(ReceiveError::LookupFailed)?
            .ok_or(ReceiveError::UnattributedMessage {
                from_user_id: message.from_user_id,
            })?;

        Ok(PresentedMessage::new(author, message.content()))
    }

    /// Drains `frames` in delivery order until the channel goes away.
    ///
    /// Each frame is fully attributed (or dropped) before the next one is read,
    /// so the sink sees messages in exactly the order the channel delivered them.
    pub async fn run(
        mut self,
        mut frames: InboundFrames,
        sink: &mut dyn PresentationSink,
    ) -> ReceiveSummary {
        let mut summary = ReceiveSummary::default();

        while let Some(raw) = frames.recv().await {
            match self.on_frame(&raw).await {
                Ok(message) => {
                    sink.append(message);
                    summary.presented += 1;
                }
                Err(error) => {
                    summary.dropped += 1;
                    tracing::warn!(
                        code = RECEIVE_FRAME_DROPPED,
                        reason = error.code(),
                        error = %error,
                        "inbound frame dropped"
                    );
                }
            }
        }

        tracing::info!(
            code = RECEIVE_LOOP_STOPPED,
            presented = summary.presented,
            dropped = summary.dropped,
            "inbound frame stream ended"
        );
        summary
    }
}
