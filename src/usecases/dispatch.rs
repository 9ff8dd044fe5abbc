//! Use case for dispatching one outbound message.
//!
//! Resolves the sender and recipient names through the directory, builds a
//! single addressed [`OutboundMessage`] and hands its JSON form to the channel.

use thiserror::Error;

use crate::domain::{
    message::OutboundMessage,
    target::{AddressingMode, DispatchTarget, TargetError, TargetPolicy},
};

use super::contracts::{DirectoryClient, DirectoryError, MessageChannel};

const DISPATCH_TARGET_TIE_BROKEN: &str = "DISPATCH_TARGET_TIE_BROKEN";
const DISPATCH_SENT: &str = "DISPATCH_SENT";

/// Recipient id the server treats as "every connected user".
pub const DEFAULT_BROADCAST_ID: i64 = 1;

/// Raw form input for one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub sender: String,
    pub content: String,
    pub target: DispatchTarget,
}

impl DispatchRequest {
    pub fn new(
        sender: impl Into<String>,
        content: impl Into<String>,
        target: DispatchTarget,
    ) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    pub target_policy: TargetPolicy,
    pub broadcast_id: i64,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            target_policy: TargetPolicy::Strict,
            broadcast_id: DEFAULT_BROADCAST_ID,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("exactly one target must be set, got {provided}")]
    AmbiguousTarget { provided: usize },
    #[error("unknown sender `{name}`: {source}")]
    UnknownSender {
        name: String,
        #[source]
        source: DirectoryError,
    },
    #[error("unknown recipient `{name}`: {source}")]
    UnknownRecipient {
        name: String,
        #[source]
        source: DirectoryError,
    },
    #[error("unknown group `{name}`: {source}")]
    UnknownGroup {
        name: String,
        #[source]
        source: DirectoryError,
    },
    #[error("failed to encode message: {details}")]
    Encode { details: String },
    #[error("chat channel is unavailable")]
    ChannelUnavailable,
}

/// Resolves, addresses and sends one message.
///
/// Issues one directory lookup for the sender plus one for a user or group
/// recipient, then exactly one channel send. Nothing is sent when any step
/// before the send fails. Returns the message as it went on the wire.
pub async fn dispatch(
    directory: &dyn DirectoryClient,
    channel: &dyn MessageChannel,
    options: &DispatchOptions,
    request: DispatchRequest,
) -> Result<OutboundMessage, DispatchError> {
    let mode = request
        .target
        .addressing_mode(options.target_policy)
        .map_err(|TargetError::Ambiguous { provided }| {
            DispatchError::AmbiguousTarget { provided }
        })?;

    if request.target.provided() > 1 {
        tracing::warn!(
            code = DISPATCH_TARGET_TIE_BROKEN,
            provided = request.target.provided(),
            mode = mode.as_label(),
            "several targets set; lower-priority targets dropped"
        );
    }

    let sender_name = request.sender.trim();
    let from = directory
        .resolve_user(sender_name)
        .await
        .map_err(|source| DispatchError::UnknownSender {
            name: sender_name.to_owned(),
            source,
        })?;

    let message = match mode {
        AddressingMode::User(name) => {
            let to = directory.resolve_user(&name).await.map_err(|source| {
                DispatchError::UnknownRecipient {
                    name: name.clone(),
                    source,
                }
            })?;
            OutboundMessage::direct(from.id, to.id, request.content)
        }
        AddressingMode::Group(name) => {
            let group = directory.resolve_group(&name).await.map_err(|source| {
                DispatchError::UnknownGroup {
                    name: name.clone(),
                    source,
                }
            })?;
            OutboundMessage::group(from.id, group.id, request.content)
        }
        AddressingMode::Broadcast => {
            OutboundMessage::broadcast(from.id, options.broadcast_id, request.content)
        }
    };

    let payload = message.to_json().map_err(|error| DispatchError::Encode {
        details: error.to_string(),
    })?;

    channel
        .send(payload)
        .await
        .map_err(|_| DispatchError::ChannelUnavailable)?;

    tracing::debug!(
        code = DISPATCH_SENT,
        from_user_id = message.from_user_id,
        to_user_id = message.to_user_id,
        "outbound message handed to channel"
    );

    Ok(message)
}
