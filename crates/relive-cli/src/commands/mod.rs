pub mod auth;
pub mod family;
pub mod memory;

use anyhow::{Context, Result};
use relive_infrastructure::{ConfigService, FileSessionStore, RelivePaths};
use relive_interaction::{ReliveApi, ReqwestTransport, TokenLifecycleManager};
use std::path::Path;
use std::sync::Arc;

/// The client stack shared by all commands.
pub struct App {
    pub api: ReliveApi,
}

impl App {
    pub fn connect(config_dir: Option<&Path>) -> Result<Self> {
        let paths = RelivePaths::new(config_dir);
        let config = ConfigService::new(&paths)?
            .get_config()
            .context("Failed to load configuration")?;
        tracing::debug!("[CLI] Using API at {}", config.api_base_url);

        let store = Arc::new(FileSessionStore::new(&paths)?);
        let threshold = config.refresh_threshold();
        let transport = Arc::new(ReqwestTransport::new(config)?);
        let tokens = Arc::new(TokenLifecycleManager::new(
            transport.clone(),
            store,
            threshold,
        ));

        Ok(Self {
            api: ReliveApi::new(transport, tokens),
        })
    }
}
