use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use crate::{
    domain::{events::ConnectivityStatus, identity::Identity},
    usecases::contracts::{
        ChannelConnector, ChannelError, ChannelHandle, DirectoryClient, DirectoryError,
        InboundFrames, MessageChannel,
    },
};

/// In-memory directory that records every lookup it serves.
#[derive(Debug, Default)]
pub struct StubDirectory {
    users: Vec<Identity>,
    groups: Vec<Identity>,
    failure: Option<String>,
    list_delays: Mutex<Vec<Duration>>,
    calls: Mutex<DirectoryCalls>,
}

#[derive(Debug, Default)]
struct DirectoryCalls {
    users: Vec<String>,
    groups: Vec<String>,
    list_users: usize,
}

impl StubDirectory {
    pub fn with_user(mut self, id: i64, name: &str) -> Self {
        self.users.push(Identity::new(id, name));
        self
    }

    pub fn with_group(mut self, id: i64, name: &str) -> Self {
        self.groups.push(Identity::new(id, name));
        self
    }

    /// Every call fails with `LookupFailed` carrying `details`.
    pub fn failing(mut self, details: &str) -> Self {
        self.failure = Some(details.to_owned());
        self
    }

    /// Successive `list_users` calls sleep for these durations, in order.
    pub fn with_list_delays(self, delays: Vec<Duration>) -> Self {
        *self.list_delays.lock().expect("delays lock") = delays;
        self
    }

    pub fn user_lookups(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").users.clone()
    }

    pub fn group_lookups(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").groups.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls.lock().expect("calls lock").list_users
    }

    fn check_failure(&self) -> Result<(), DirectoryError> {
        match &self.failure {
            Some(details) => Err(DirectoryError::lookup_failed(details)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DirectoryClient for StubDirectory {
    async fn resolve_user(&self, name: &str) -> Result<Identity, DirectoryError> {
        self.calls
            .lock()
            .expect("calls lock")
            .users
            .push(name.to_owned());
        self.check_failure()?;
        self.users
            .iter()
            .find(|user| user.display_name == name)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found(name))
    }

    async fn resolve_group(&self, name: &str) -> Result<Identity, DirectoryError> {
        self.calls
            .lock()
            .expect("calls lock")
            .groups
            .push(name.to_owned());
        self.check_failure()?;
        self.groups
            .iter()
            .find(|group| group.display_name == name)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found(name))
    }

    async fn list_users(&self) -> Result<Vec<Identity>, DirectoryError> {
        self.calls.lock().expect("calls lock").list_users += 1;
        let delay = {
            let mut delays = self.list_delays.lock().expect("delays lock");
            (!delays.is_empty()).then(|| delays.remove(0))
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failure()?;
        Ok(self.users.clone())
    }
}

/// Channel that keeps every payload instead of writing it anywhere.
///
/// When opened through [`StubConnector`] it also owns the inbound feed, so
/// closing it ends the inbound stream like a real disconnect does.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    status: Mutex<ConnectivityStatus>,
    sent: Mutex<Vec<String>>,
    feed: Mutex<Option<mpsc::Sender<String>>>,
}

impl RecordingChannel {
    pub fn connected() -> Self {
        Self::with_status(ConnectivityStatus::Connected)
    }

    pub fn with_status(status: ConnectivityStatus) -> Self {
        Self {
            status: Mutex::new(status),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub async fn push_frame(&self, frame: &str) {
        let feed = self
            .feed
            .lock()
            .expect("feed lock")
            .clone()
            .expect("inbound feed must be open");
        feed.send(frame.to_owned())
            .await
            .expect("frame must be queued");
    }

    /// Peer-side drop: the channel goes down and the inbound stream ends.
    pub fn hang_up(&self) {
        *self.status.lock().expect("status lock") = ConnectivityStatus::Disconnected;
        self.feed.lock().expect("feed lock").take();
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    fn status(&self) -> ConnectivityStatus {
        *self.status.lock().expect("status lock")
    }

    async fn send(&self, payload: String) -> Result<(), ChannelError> {
        if !self.status().is_connected() {
            return Err(ChannelError::Unavailable);
        }
        self.sent.lock().expect("sent lock").push(payload);
        Ok(())
    }

    async fn close(&self) {
        self.hang_up();
    }
}

/// Connector handing out [`RecordingChannel`]s.
#[derive(Debug, Default)]
pub struct StubConnector {
    refuse: bool,
    gate: Option<Arc<Notify>>,
    connections: Mutex<Vec<String>>,
    last: Mutex<Option<Arc<RecordingChannel>>>,
}

impl StubConnector {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// Holds every connect until `gate` is notified.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn connections(&self) -> Vec<String> {
        self.connections.lock().expect("connections lock").clone()
    }

    pub fn last_channel(&self) -> Option<Arc<RecordingChannel>> {
        self.last.lock().expect("last lock").clone()
    }
}

#[async_trait]
impl ChannelConnector for StubConnector {
    async fn connect(&self, username: &str) -> Result<ChannelHandle, ChannelError> {
        self.connections
            .lock()
            .expect("connections lock")
            .push(username.to_owned());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.refuse {
            return Err(ChannelError::Connect {
                details: "connection refused".to_owned(),
            });
        }

        let (feed, inbound): (mpsc::Sender<String>, InboundFrames) = mpsc::channel(16);
        let channel = Arc::new(RecordingChannel {
            feed: Mutex::new(Some(feed)),
            ..RecordingChannel::connected()
        });
        *self.last.lock().expect("last lock") = Some(Arc::clone(&channel));

        Ok(ChannelHandle { channel, inbound })
    }
}
