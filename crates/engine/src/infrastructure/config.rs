//! Configuration loading and the shared config handle.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults (`PartyConfig::default()`)
//! 2. Optional TOML file (`PARTIES_CONFIG`, default `parties.toml`)
//! 3. Environment: `PARTIES__<SECTION>__<KEY>`, e.g. `PARTIES__MECHANICS__PARTY_SIZE=8`
//!
//! Components never hold a config reference across operations. They call
//! [`ConfigHandle::current`] once per operation and use that snapshot, so a
//! reload is observed all at once or not at all.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parties_domain::{PartyConfig, PartyError};
use tokio::sync::watch;

use crate::infrastructure::ports::{ConfigLoadError, ConfigProvider};

pub const DEFAULT_CONFIG_PATH: &str = "parties.toml";
pub const DEFAULT_ENV_PREFIX: &str = "PARTIES";

/// Loads `PartyConfig` from a TOML file layered with environment overrides.
pub struct FileConfigProvider {
    path: PathBuf,
    env_prefix: String,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Use the path from `PARTIES_CONFIG`, falling back to `parties.toml`.
    pub fn from_env() -> Self {
        let path = std::env::var("PARTIES_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::new(path)
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for FileConfigProvider {
    fn load(&self) -> Result<PartyConfig, ConfigLoadError> {
        let source_name = self.path.display().to_string();

        let settings = config::Config::builder()
            .add_source(config::File::from(self.path.as_path()).required(false))
            .add_source(
                config::Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("boss_module.mark_bosses"),
            )
            .build()
            .map_err(|e| ConfigLoadError::from_source(&source_name, e))?;

        let parsed: PartyConfig = settings
            .try_deserialize()
            .map_err(|e| ConfigLoadError::from_source(&source_name, e))?;
        parsed.validate()?;

        tracing::debug!(path = %source_name, "Configuration loaded");
        Ok(parsed)
    }
}

/// Shared, atomically swappable configuration snapshot.
#[derive(Clone)]
pub struct ConfigHandle {
    tx: Arc<watch::Sender<Arc<PartyConfig>>>,
}

impl ConfigHandle {
    /// Wrap a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `config` fails validation.
    pub fn new(config: PartyConfig) -> Result<Self, PartyError> {
        config.validate()?;
        let (tx, _rx) = watch::channel(Arc::new(config));
        Ok(Self { tx: Arc::new(tx) })
    }

    /// The snapshot in force right now.
    pub fn current(&self) -> Arc<PartyConfig> {
        self.tx.borrow().clone()
    }

    /// Validate and swap in a new snapshot. The old one stays in force on error.
    pub fn replace(&self, config: PartyConfig) -> Result<Arc<PartyConfig>, PartyError> {
        config.validate()?;
        let config = Arc::new(config);
        self.tx.send_replace(config.clone());
        tracing::info!("Configuration reloaded");
        Ok(config)
    }

    /// Watch for replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PartyConfig>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parties_domain::CountPolicy;
    use std::io::Write;

    // Prefix no test environment defines, so only the file is read.
    const ISOLATED_PREFIX: &str = "PARTIES_CONFIG_TEST_UNSET";

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let provider = FileConfigProvider::new("/nonexistent/parties.toml")
            .with_env_prefix(ISOLATED_PREFIX);
        let config = provider.load().expect("defaults load");
        assert_eq!(config, PartyConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_toml(
            r#"
            [mechanics]
            party_size = 8
            friendly_fire = true

            [boss_module]
            enabled = true
            player_count_type = "PARTY"
            mark_bosses = ["custom:lich"]
            "#,
        );
        let provider = FileConfigProvider::new(file.path()).with_env_prefix(ISOLATED_PREFIX);
        let config = provider.load().expect("config loads");

        assert_eq!(config.max_party_size(), 8);
        assert!(config.mechanics.friendly_fire);
        assert!(config.boss_module.enabled);
        assert_eq!(config.boss_module.player_count_type, CountPolicy::Party);
        assert_eq!(config.boss_module.mark_bosses, vec!["custom:lich".to_string()]);
        assert_eq!(config.timers.player_accept_timer, 30);
    }

    #[test]
    fn invalid_file_values_are_rejected() {
        let file = write_toml(
            r#"
            [timers]
            fast_interval = 100
            slow_interval = 50
            "#,
        );
        let provider = FileConfigProvider::new(file.path()).with_env_prefix(ISOLATED_PREFIX);
        let err = provider.load().unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid(PartyError::InvalidConfig(_))));
    }

    #[test]
    fn handle_replace_swaps_snapshot_atomically() {
        let handle = ConfigHandle::new(PartyConfig::default()).unwrap();
        let before = handle.current();

        let mut next = PartyConfig::default();
        next.mechanics.party_size = 3;
        handle.replace(next).unwrap();

        assert_eq!(before.max_party_size(), 5);
        assert_eq!(handle.current().max_party_size(), 3);
    }

    #[test]
    fn handle_keeps_old_snapshot_when_replacement_is_invalid() {
        let handle = ConfigHandle::new(PartyConfig::default()).unwrap();
        let mut bad = PartyConfig::default();
        bad.mechanics.party_size = 0;

        assert!(handle.replace(bad).is_err());
        assert_eq!(handle.current().max_party_size(), 5);
    }

    #[test]
    fn subscribers_see_replacements() {
        let handle = ConfigHandle::new(PartyConfig::default()).unwrap();
        let mut rx = handle.subscribe();
        assert!(!rx.has_changed().unwrap());

        let mut next = PartyConfig::default();
        next.timers.fast_interval = 20;
        handle.replace(next).unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().timers.fast_interval, 20);
    }
}
