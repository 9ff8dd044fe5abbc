use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::target::TargetPolicy;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub directory: DirectoryConfig,
    pub channel: ChannelConfig,
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub all_users_path: String,
    pub request_timeout_ms: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/prattle/rest".to_owned(),
            all_users_path: "user/allusers".to_owned(),
            request_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub outbound_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            base_url: "ws://localhost:8080/prattle".to_owned(),
            connect_timeout_ms: 5_000,
            outbound_buffer: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchConfig {
    pub target_policy: TargetPolicy,
    pub broadcast_id: i64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            target_policy: TargetPolicy::Strict,
            broadcast_id: 1,
        }
    }
}
