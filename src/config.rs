use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::app::{APP_ID, CONFIG_FILE_NAME};
use crate::error::ConfigError;

/// Supervisor configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Milliseconds to wait after spawning before the liveness probe
    pub probe_delay_ms: u64,

    /// Maximum tracing level written to stderr
    pub log_level: String,

    /// Use ANSI bold/red in the banner and messages
    pub color: bool,

    /// Clear the terminal before printing the banner
    pub clear_screen: bool,

    /// Longest command line accepted by the console
    pub max_input_length: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            probe_delay_ms: 100, // 0.1 seconds
            log_level: "warn".to_string(),
            color: true,
            clear_screen: true,
            max_input_length: 512,
        }
    }
}

impl SupervisorConfig {
    /// Load configuration from the given file, or the default location
    /// Falls back to defaults when the file is missing or unreadable
    ///
    /// Nothing is logged here; call `LoadedConfig::report` once logging is up.
    pub fn load(path: Option<&Path>) -> LoadedConfig {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::get_config_path() {
                Ok(path) => path,
                Err(_) => return LoadedConfig::defaults(),
            },
        };

        if !config_path.exists() {
            return LoadedConfig::defaults();
        }

        match Self::read_from(&config_path) {
            Ok(config) => LoadedConfig {
                config,
                source: Some(config_path),
                rejected: None,
            },
            Err(e) => LoadedConfig {
                config: Self::default(),
                source: None,
                rejected: Some((config_path, e)),
            },
        }
    }

    /// Parse a configuration file, surfacing every failure
    pub fn read_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::get_config_path()?,
        };

        // Create directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        info!("Saved supervisor config to {:?}", config_path);
        Ok(config_path)
    }

    pub fn probe_delay(&self) -> Duration {
        Duration::from_millis(self.probe_delay_ms)
    }

    /// Get the configuration file path
    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_ID).join(CONFIG_FILE_NAME))
    }
}

/// Outcome of `SupervisorConfig::load`
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: SupervisorConfig,
    /// File the settings came from, if any
    pub source: Option<PathBuf>,
    /// A file that exists but could not be used
    pub rejected: Option<(PathBuf, ConfigError)>,
}

impl LoadedConfig {
    fn defaults() -> Self {
        Self {
            config: SupervisorConfig::default(),
            source: None,
            rejected: None,
        }
    }

    /// Log where the configuration came from
    pub fn report(&self) {
        if let Some((path, e)) = &self.rejected {
            warn!("Ignoring config at {}: {}; using defaults", path.display(), e);
        } else if let Some(path) = &self.source {
            info!("Loaded supervisor config from {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_defaults() {
        let config = SupervisorConfig::default();
        assert_eq!(config.probe_delay(), Duration::from_millis(100));
        assert_eq!(config.max_input_length, 512);
        assert!(config.color);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SupervisorConfig = serde_json::from_str(r#"{"probe_delay_ms": 250}"#).unwrap();
        assert_eq!(config.probe_delay_ms, 250);
        assert_eq!(config.log_level, "warn");
        assert!(config.clear_screen);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let loaded = SupervisorConfig::load(Some(Path::new("/nonexistent/scee/config.json")));
        assert_eq!(loaded.config, SupervisorConfig::default());
        assert!(loaded.source.is_none());
        assert!(loaded.rejected.is_none());
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_rejected_file_is_reported_as_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ probe_delay_ms: ").unwrap();

        let loaded = SupervisorConfig::load(Some(&path));
        assert_eq!(loaded.config, SupervisorConfig::default());
        assert!(matches!(loaded.rejected, Some((_, ConfigError::Parse(_)))));

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, || loaded.report());

        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("WARN"));
        assert!(text.contains("Ignoring config at"));
        assert!(text.contains(&path.display().to_string()));
    }
}
