use std::sync::Arc;

use crate::{
    infra::config::AppConfig,
    prattle::{HttpDirectoryClient, WebSocketConnector},
    usecases::{dispatch::DispatchOptions, session::ChatSession},
};

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub directory: Arc<HttpDirectoryClient>,
    pub connector: Arc<WebSocketConnector>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        directory: HttpDirectoryClient,
        connector: WebSocketConnector,
    ) -> Self {
        Self {
            config,
            directory: Arc::new(directory),
            connector: Arc::new(connector),
        }
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            target_policy: self.config.dispatch.target_policy,
            broadcast_id: self.config.dispatch.broadcast_id,
        }
    }

    /// Fresh, disconnected session over this context's adapters.
    pub fn session(&self) -> ChatSession {
        ChatSession::new(
            self.directory.clone(),
            self.connector.clone(),
            self.dispatch_options(),
        )
    }
}
