use std::path::Path;

use crate::{
    infra::{self, error::AppError, logging::LoggingGuard},
    prattle::{HttpDirectoryClient, WebSocketConnector},
    usecases::context::AppContext,
};

pub fn bootstrap(config_path: Option<&Path>) -> Result<(AppContext, LoggingGuard), AppError> {
    let context = build_context(config_path)?;
    let guard = infra::logging::init(&context.config.logging)?;

    Ok((context, guard))
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config = infra::config::load(config_path)?;
    let directory = HttpDirectoryClient::new(&config.directory)?;
    let connector = WebSocketConnector::new(&config.channel)?;

    Ok(AppContext::new(config, directory, connector))
}
