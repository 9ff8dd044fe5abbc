use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::domain::{events::ConnectivityStatus, message::OutboundMessage};

use super::{
    contracts::{ChannelConnector, ChannelError, DirectoryClient, InboundFrames, MessageChannel},
    dispatch::{dispatch, DispatchError, DispatchOptions, DispatchRequest},
    receive::InboundReceiver,
};

const SESSION_CONNECTED: &str = "SESSION_CONNECTED";
const SESSION_CONNECT_FAILED: &str = "SESSION_CONNECT_FAILED";
const SESSION_DISCONNECTED: &str = "SESSION_DISCONNECTED";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a chat channel is already open")]
    AlreadyConnected,
    #[error(transparent)]
    Connect(#[from] ChannelError),
}

/// Session context: owns the one chat channel and shares the directory with
/// the dispatcher and the receiver.
pub struct ChatSession {
    directory: Arc<dyn DirectoryClient>,
    connector: Arc<dyn ChannelConnector>,
    options: DispatchOptions,
    channel: Option<Arc<dyn MessageChannel>>,
    lifecycle: watch::Sender<ConnectivityStatus>,
}

impl ChatSession {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        connector: Arc<dyn ChannelConnector>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            directory,
            connector,
            options,
            channel: None,
            lifecycle: watch::Sender::new(ConnectivityStatus::Disconnected),
        }
    }

    /// Live channel state once open, otherwise the session's own lifecycle
    /// (`Connecting` while a connect is in flight).
    pub fn status(&self) -> ConnectivityStatus {
        match &self.channel {
            Some(channel) => channel.status(),
            None => *self.lifecycle.borrow(),
        }
    }

    /// Follows connect and disconnect transitions issued through this session.
    /// A drop on the server side shows up in [`ChatSession::status`] only.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn status_updates(&self) -> watch::Receiver<ConnectivityStatus> {
        self.lifecycle.subscribe()
    }

    /// Opens the channel for `username` and returns its inbound frames.
    ///
    /// A channel that dropped on its own is released first; a live one is
    /// never replaced.
    pub async fn connect(&mut self, username: &str) -> Result<InboundFrames, SessionError> {
        if let Some(channel) = &self.channel {
            if channel.status() != ConnectivityStatus::Disconnected {
                return Err(SessionError::AlreadyConnected);
            }
            self.channel = None;
        }

        self.lifecycle.send_replace(ConnectivityStatus::Connecting);
        match self.connector.connect(username).await {
            Ok(handle) => {
                tracing::info!(code = SESSION_CONNECTED, username, "chat session connected");
                self.channel = Some(handle.channel);
                self.lifecycle.send_replace(ConnectivityStatus::Connected);
                Ok(handle.inbound)
            }
            Err(error) => {
                self.lifecycle.send_replace(ConnectivityStatus::Disconnected);
                tracing::warn!(
                    code = SESSION_CONNECT_FAILED,
                    username,
                    error = %error,
                    "chat session connect failed"
                );
                Err(error.into())
            }
        }
    }

    pub async fn dispatch(
        &self,
        request: DispatchRequest,
    ) -> Result<OutboundMessage, DispatchError> {
        let channel = self
            .channel
            .as_deref()
            .ok_or(DispatchError::ChannelUnavailable)?;

        dispatch(self.directory.as_ref(), channel, &self.options, request).await
    }

    /// Receiver sharing this session's directory.
    pub fn receiver(&self) -> InboundReceiver<Arc<dyn DirectoryClient>> {
        InboundReceiver::new(Arc::clone(&self.directory))
    }

    pub async fn disconnect(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.close().await;
            tracing::info!(code = SESSION_DISCONNECTED, "chat session disconnected");
        }
        self.lifecycle.send_replace(ConnectivityStatus::Disconnected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::target::DispatchTarget,
        test_support::{StubConnector, StubDirectory},
    };

    fn session(connector: Arc<StubConnector>) -> ChatSession {
        let directory = StubDirectory::default()
            .with_user(1, "alice")
            .with_user(2, "bob");
        ChatSession::new(Arc::new(directory), connector, DispatchOptions::default())
    }

    fn hello_bob() -> DispatchRequest {
        DispatchRequest::new("alice", "hi", DispatchTarget::user("bob"))
    }

    #[tokio::test]
    async fn dispatch_without_channel_is_unavailable() {
        let session = session(Arc::new(StubConnector::default()));

        assert_eq!(
            session.dispatch(hello_bob()).await,
            Err(DispatchError::ChannelUnavailable)
        );
        assert_eq!(session.status(), ConnectivityStatus::Disconnected);
    }

    #[tokio::test]
    async fn connect_then_dispatch_goes_through_session_channel() {
        let connector = Arc::new(StubConnector::default());
        let mut session = session(Arc::clone(&connector));

        session.connect("alice").await.expect("connect must succeed");
        session
            .dispatch(hello_bob())
            .await
            .expect("dispatch must succeed");

        let channel = connector.last_channel().expect("channel must exist");
        assert_eq!(channel.sent().len(), 1);
        assert_eq!(connector.connections(), vec!["alice".to_owned()]);
        assert_eq!(session.status(), ConnectivityStatus::Connected);
    }

    #[tokio::test]
    async fn second_connect_is_rejected_while_open() {
        let connector = Arc::new(StubConnector::default());
        let mut session = session(Arc::clone(&connector));

        session.connect("alice").await.expect("connect must succeed");
        let second = session.connect("alice").await;

        assert_eq!(second.err(), Some(SessionError::AlreadyConnected));
        assert_eq!(connector.connections().len(), 1);
    }

    #[tokio::test]
    async fn disconnect_closes_channel_and_blocks_later_sends() {
        let connector = Arc::new(StubConnector::default());
        let mut session = session(Arc::clone(&connector));

        session.connect("alice").await.expect("connect must succeed");
        session.disconnect().await;

        let channel = connector.last_channel().expect("channel must exist");
        assert_eq!(channel.status(), ConnectivityStatus::Disconnected);
        assert_eq!(
            session.dispatch(hello_bob()).await,
            Err(DispatchError::ChannelUnavailable)
        );
    }

    #[tokio::test]
    async fn reconnect_is_allowed_after_channel_dropped() {
        let connector = Arc::new(StubConnector::default());
        let mut session = session(Arc::clone(&connector));

        session.connect("alice").await.expect("connect must succeed");
        connector
            .last_channel()
            .expect("channel must exist")
            .close()
            .await;

        session
            .connect("alice")
            .await
            .expect("reconnect must succeed once the old channel is down");
        assert_eq!(connector.connections().len(), 2);
    }

    #[tokio::test]
    async fn connect_failure_leaves_session_disconnected() {
        let mut session = session(Arc::new(StubConnector::refusing()));

        let result = session.connect("alice").await;

        assert!(matches!(
            result,
            Err(SessionError::Connect(ChannelError::Connect { .. }))
        ));
        assert_eq!(session.status(), ConnectivityStatus::Disconnected);
    }

    #[tokio::test]
    async fn status_is_connecting_while_handshake_is_pending() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let connector = Arc::new(StubConnector::gated(Arc::clone(&gate)));
        let mut session = session(Arc::clone(&connector));
        let mut updates = session.status_updates();

        let observe = async {
            updates.changed().await.expect("session must publish status");
            let seen = *updates.borrow_and_update();
            gate.notify_one();
            seen
        };
        let (connected, seen) = tokio::join!(session.connect("alice"), observe);

        connected.expect("connect must succeed");
        assert_eq!(seen, ConnectivityStatus::Connecting);
        assert_eq!(session.status(), ConnectivityStatus::Connected);
        assert_eq!(*updates.borrow(), ConnectivityStatus::Connected);
    }

    #[tokio::test]
    async fn failed_connect_publishes_disconnected() {
        let mut session = session(Arc::new(StubConnector::refusing()));
        let updates = session.status_updates();

        let _ = session.connect("alice").await;

        assert_eq!(*updates.borrow(), ConnectivityStatus::Disconnected);
    }

    #[tokio::test]
    async fn receiver_attributes_frames_from_session_channel() {
        let connector = Arc::new(StubConnector::default());
        let mut session = session(Arc::clone(&connector));
        let frames = session.connect("alice").await.expect("connect must succeed");

        let channel = connector.last_channel().expect("channel must exist");
        channel.push_frame(r#"{"fromUserId":2,"content":"yo"}"#).await;
        channel.hang_up();

        let mut log = Vec::new();
        session.receiver().run(frames, &mut log).await;

        assert_eq!(log.len(), 1);
        assert_eq!(log[0].author, "bob");
        assert_eq!(log[0].content, "yo");
    }
}
