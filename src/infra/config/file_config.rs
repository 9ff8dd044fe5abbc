use std::path::PathBuf;

use serde::Deserialize;

use crate::{
    domain::target::TargetPolicy,
    infra::config::{AppConfig, ChannelConfig, DirectoryConfig, DispatchConfig, LogConfig},
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub directory: Option<FileDirectoryConfig>,
    pub channel: Option<FileChannelConfig>,
    pub dispatch: Option<FileDispatchConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(directory) = self.directory {
            directory.merge_into(&mut config.directory);
        }

        if let Some(channel) = self.channel {
            channel.merge_into(&mut config.channel);
        }

        if let Some(dispatch) = self.dispatch {
            dispatch.merge_into(&mut config.dispatch);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(file) = self.file {
            config.file = Some(file);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDirectoryConfig {
    pub base_url: Option<String>,
    pub all_users_path: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

impl FileDirectoryConfig {
    fn merge_into(self, config: &mut DirectoryConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        if let Some(path) = self.all_users_path {
            config.all_users_path = path;
        }

        if let Some(timeout_ms) = self.request_timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileChannelConfig {
    pub base_url: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub outbound_buffer: Option<usize>,
}

impl FileChannelConfig {
    fn merge_into(self, config: &mut ChannelConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        if let Some(timeout_ms) = self.connect_timeout_ms {
            config.connect_timeout_ms = timeout_ms;
        }

        if let Some(buffer) = self.outbound_buffer {
            config.outbound_buffer = buffer;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDispatchConfig {
    pub target_policy: Option<TargetPolicy>,
    pub broadcast_id: Option<i64>,
}

impl FileDispatchConfig {
    fn merge_into(self, config: &mut DispatchConfig) {
        if let Some(policy) = self.target_policy {
            config.target_policy = policy;
        }

        if let Some(broadcast_id) = self.broadcast_id {
            config.broadcast_id = broadcast_id;
        }
    }
}
