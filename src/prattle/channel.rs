use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::{
    domain::events::ConnectivityStatus,
    infra::{config::ChannelConfig, error::AppError},
    usecases::contracts::{ChannelConnector, ChannelError, ChannelHandle, MessageChannel},
};

const CHANNEL_CONNECT_FAILED: &str = "CHANNEL_CONNECT_FAILED";
const CHANNEL_WRITE_FAILED: &str = "CHANNEL_WRITE_FAILED";
const CHANNEL_READ_FAILED: &str = "CHANNEL_READ_FAILED";
const CHANNEL_CLOSED_BY_PEER: &str = "CHANNEL_CLOSED_BY_PEER";
const CHANNEL_NON_TEXT_FRAME: &str = "CHANNEL_NON_TEXT_FRAME";
const CHANNEL_FRAME_DISCARDED: &str = "CHANNEL_FRAME_DISCARDED";

/// Builds `{scheme}://{host}{basePath}/chat/{username}`, mapping http(s) to ws(s).
pub fn chat_url(base: &Url, username: &str) -> Result<Url, ChannelError> {
    let mut url = base.clone();

    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => {
            return Err(ChannelError::InvalidUrl {
                details: format!("unsupported scheme `{other}`"),
            })
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| ChannelError::InvalidUrl {
            details: format!("cannot switch `{base}` to {scheme}"),
        })?;

    url.path_segments_mut()
        .map_err(|()| ChannelError::InvalidUrl {
            details: format!("`{base}` cannot be a base"),
        })?
        .pop_if_empty()
        .extend(["chat", username]);

    Ok(url)
}

/// Opens WebSocket chat channels against the configured server.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    base_url: Url,
    connect_timeout: Duration,
    outbound_buffer: usize,
}

impl WebSocketConnector {
    pub fn new(config: &ChannelConfig) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.base_url).map_err(|error| AppError::InvalidConfig {
            details: format!("channel.base_url: {error}"),
        })?;

        Ok(Self {
            base_url,
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            outbound_buffer: config.outbound_buffer,
        })
    }
}

#[async_trait]
impl ChannelConnector for WebSocketConnector {
    async fn connect(&self, username: &str) -> Result<ChannelHandle, ChannelError> {
        let url = chat_url(&self.base_url, username.trim())?;
        tracing::info!(
            code = ConnectivityStatus::Connecting.as_label(),
            url = %url,
            "opening chat channel"
        );

        let connected = tokio::time::timeout(self.connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| format!("timed out after {:?}", self.connect_timeout))
            .and_then(|result| result.map_err(|error| error.to_string()));

        let stream = match connected {
            Ok((stream, _response)) => stream,
            Err(details) => {
                tracing::warn!(
                    code = CHANNEL_CONNECT_FAILED,
                    url = %url,
                    details = %details,
                    "chat channel connect failed"
                );
                return Err(ChannelError::Connect { details });
            }
        };

        let (status_tx, _) = watch::channel(ConnectivityStatus::Connected);
        let status_tx = Arc::new(status_tx);
        tracing::info!(
            code = ConnectivityStatus::Connected.as_label(),
            url = %url,
            "chat channel connected"
        );

        let (mut write, mut read) = stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(self.outbound_buffer);
        let (inbound_tx, inbound_rx) = mpsc::channel::<String>(self.outbound_buffer);
        let (stop_tx, mut writer_stop) = watch::channel(false);
        let mut reader_stop = stop_tx.subscribe();

        let writer_status = Arc::clone(&status_tx);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = writer_stop.changed() => {
                        // flush frames queued before close
                        while let Ok(payload) = outbound_rx.try_recv() {
                            if write.send(Message::Text(payload)).await.is_err() {
                                break;
                            }
                        }
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                    payload = outbound_rx.recv() => {
                        let Some(payload) = payload else {
                            let _ = write.send(Message::Close(None)).await;
                            break;
                        };
                        if let Err(error) = write.send(Message::Text(payload)).await {
                            tracing::warn!(
                                code = CHANNEL_WRITE_FAILED,
                                error = %error,
                                "chat channel write failed"
                            );
                            break;
                        }
                    }
                }
            }
            writer_status.send_replace(ConnectivityStatus::Disconnected);
        });

        let reader_status = Arc::clone(&status_tx);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = reader_stop.changed() => break,
                    frame = read.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            // nobody listening is not a disconnect
                            if inbound_tx.is_closed() {
                                tracing::debug!(
                                    code = CHANNEL_FRAME_DISCARDED,
                                    len = text.len(),
                                    "no inbound consumer, frame discarded"
                                );
                            } else if inbound_tx.send(text).await.is_err() {
                                tracing::debug!(
                                    code = CHANNEL_FRAME_DISCARDED,
                                    "inbound consumer went away, frame discarded"
                                );
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!(
                                code = CHANNEL_CLOSED_BY_PEER,
                                "chat channel closed by server"
                            );
                            break;
                        }
                        Some(Ok(other)) => {
                            tracing::debug!(
                                code = CHANNEL_NON_TEXT_FRAME,
                                len = other.len(),
                                "ignoring non-text frame"
                            );
                        }
                        Some(Err(error)) => {
                            tracing::warn!(
                                code = CHANNEL_READ_FAILED,
                                error = %error,
                                "chat channel read failed"
                            );
                            break;
                        }
                    },
                }
            }
            reader_status.send_replace(ConnectivityStatus::Disconnected);
        });

        let channel = WebSocketChannel {
            outbound: outbound_tx,
            status: status_tx,
            stop_tx,
        };

        Ok(ChannelHandle {
            channel: Arc::new(channel),
            inbound: inbound_rx,
        })
    }
}

/// Outbound half of an open WebSocket chat channel.
///
/// Frames are queued to a single writer task; the reader task feeds the
/// inbound stream and discards frames once that stream is dropped. Either task
/// going down marks the channel disconnected.
#[derive(Debug)]
pub struct WebSocketChannel {
    outbound: mpsc::Sender<String>,
    status: Arc<watch::Sender<ConnectivityStatus>>,
    stop_tx: watch::Sender<bool>,
}

#[async_trait]
impl MessageChannel for WebSocketChannel {
    fn status(&self) -> ConnectivityStatus {
        *self.status.borrow()
    }

    async fn send(&self, payload: String) -> Result<(), ChannelError> {
        if !self.status().is_connected() {
            return Err(ChannelError::Unavailable);
        }

        self.outbound
            .send(payload)
            .await
            .map_err(|_| ChannelError::Unavailable)
    }

    async fn close(&self) {
        self.status.send_replace(ConnectivityStatus::Disconnected);
        let _ = self.stop_tx.send(true);
    }
}

impl Drop for WebSocketChannel {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}
