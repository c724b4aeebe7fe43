//! Command state shared by every handler.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::db::{Database, User, UserRepository};
use crate::{GatorError, Result};

/// Loaded configuration plus the open store.
pub struct State {
    pub config: Config,
    /// Where `config` was loaded from; session changes are written back here.
    pub config_path: PathBuf,
    pub db: Arc<Database>,
}

impl State {
    pub fn new(config: Config, config_path: impl Into<PathBuf>, db: Arc<Database>) -> Self {
        Self {
            config,
            config_path: config_path.into(),
            db,
        }
    }

    /// Resolve the active user.
    pub async fn current_user(&self) -> Result<User> {
        let name = self
            .config
            .session
            .current_user
            .as_deref()
            .ok_or_else(|| {
                GatorError::Session("no user logged in; run `gator login <name>`".to_string())
            })?;

        UserRepository::new(self.db.pool())
            .get_by_name(name)
            .await?
            .ok_or_else(|| GatorError::Session(format!("current user '{name}' does not exist")))
    }

    /// Make `name` the active user and persist it.
    ///
    /// Only the session is written back; environment overrides applied to
    /// the in-memory config stay out of the file.
    pub fn set_current_user(&mut self, name: &str) -> Result<()> {
        let mut on_disk = Config::load_or_create(&self.config_path)?;
        on_disk.set_current_user(name, &self.config_path)?;
        self.config.session.current_user = Some(name.to_string());
        Ok(())
    }
}
