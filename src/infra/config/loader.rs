use std::{
    fs,
    path::{Path, PathBuf},
};

use url::Url;

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = AppConfig::default();

    if config_path.exists() {
        let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
            path: config_path.clone(),
            source,
        })?;

        let file_config: FileConfig =
            toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
                path: config_path,
                source,
            })?;

        file_config.merge_into(&mut config);
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), AppError> {
    check_base_url("directory.base_url", &config.directory.base_url)?;
    check_base_url("channel.base_url", &config.channel.base_url)?;

    if config.directory.all_users_path.trim_matches('/').is_empty() {
        return Err(invalid("directory.all_users_path must not be empty"));
    }
    if config.directory.request_timeout_ms == 0 {
        return Err(invalid("directory.request_timeout_ms must be positive"));
    }
    if config.channel.connect_timeout_ms == 0 {
        return Err(invalid("channel.connect_timeout_ms must be positive"));
    }
    if config.channel.outbound_buffer == 0 {
        return Err(invalid("channel.outbound_buffer must be positive"));
    }

    Ok(())
}

fn check_base_url(key: &str, value: &str) -> Result<(), AppError> {
    let url = Url::parse(value).map_err(|error| invalid(format!("{key}: {error}")))?;
    if url.cannot_be_a_base() {
        return Err(invalid(format!("{key}: `{value}` cannot be used as a base url")));
    }
    Ok(())
}

fn invalid(details: impl Into<String>) -> AppError {
    AppError::InvalidConfig {
        details: details.into(),
    }
}
