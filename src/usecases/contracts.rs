use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{events::ConnectivityStatus, identity::Identity, message::PresentedMessage};

/// Failures reported by a directory lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("no directory entry named `{name}`")]
    NotFound { name: String },
    #[error("directory lookup failed: {details}")]
    LookupFailed { details: String },
}

impl DirectoryError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn lookup_failed(details: impl ToString) -> Self {
        Self::LookupFailed {
            details: details.to_string(),
        }
    }
}

/// Name and id lookups against the directory service.
///
/// Every call issues its own request; implementations keep no cache.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn resolve_user(&self, name: &str) -> Result<Identity, DirectoryError>;

    async fn resolve_group(&self, name: &str) -> Result<Identity, DirectoryError>;

    /// Full user snapshot, in the order the directory reports it.
    async fn list_users(&self) -> Result<Vec<Identity>, DirectoryError>;
}

#[async_trait]
impl<T> DirectoryClient for &T
where
    T: DirectoryClient + ?Sized,
{
    async fn resolve_user(&self, name: &str) -> Result<Identity, DirectoryError> {
        (**self).resolve_user(name).await
    }

    async fn resolve_group(&self, name: &str) -> Result<Identity, DirectoryError> {
        (**self).resolve_group(name).await
    }

    async fn list_users(&self) -> Result<Vec<Identity>, DirectoryError> {
        (**self).list_users().await
    }
}

#[async_trait]
impl<T> DirectoryClient for Arc<T>
where
    T: DirectoryClient + ?Sized,
{
    async fn resolve_user(&self, name: &str) -> Result<Identity, DirectoryError> {
        (**self).resolve_user(name).await
    }

    async fn resolve_group(&self, name: &str) -> Result<Identity, DirectoryError> {
        (**self).resolve_group(name).await
    }

    async fn list_users(&self) -> Result<Vec<Identity>, DirectoryError> {
        (**self).list_users().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("channel is not connected")]
    Unavailable,
    #[error("channel connect failed: {details}")]
    Connect { details: String },
    #[error("invalid channel url: {details}")]
    InvalidUrl { details: String },
}

/// Outbound half of an open duplex channel.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    fn status(&self) -> ConnectivityStatus;

    /// Queues one text frame. Fails with `Unavailable` unless connected.
    async fn send(&self, payload: String) -> Result<(), ChannelError>;

    /// Closes the connection; every later `send` fails.
    async fn close(&self);
}

/// Inbound text frames in delivery order. Ends when the channel disconnects.
pub type InboundFrames = mpsc::Receiver<String>;

/// A freshly opened channel: the shared outbound handle plus its inbound stream.
pub struct ChannelHandle {
    pub channel: Arc<dyn MessageChannel>,
    pub inbound: InboundFrames,
}

impl std::fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("status", &self.channel.status())
            .finish_non_exhaustive()
    }
}

/// Opens chat channels on behalf of a user.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn connect(&self, username: &str) -> Result<ChannelHandle, ChannelError>;
}

/// Ordered, append-only log of attributed messages.
pub trait PresentationSink: Send {
    fn append(&mut self, message: PresentedMessage);
}

impl PresentationSink for Vec<PresentedMessage> {
    fn append(&mut self, message: PresentedMessage) {
        self.push(message);
    }
}
