use std::path::Path;

use thiserror::Error;

use crate::models::Config;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration: {0}")]
    Read(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from defaults, an optional TOML file, and the
/// environment, in that order of precedence (environment wins).
///
/// Environment keys use the `CATHODE__` prefix with `__` as the section
/// separator, e.g. `CATHODE__DATABASE__URL`.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigLoadError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder
            .add_source(config::File::from(path).required(false));
    }

    let config: Config = builder
        .add_source(
            config::Environment::with_prefix("CATHODE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigLoadError> {
    if config.database.url.trim().is_empty() {
        return Err(ConfigLoadError::Invalid(
            "database.url must not be empty".into(),
        ));
    }
    if config.worker.count == 0 {
        return Err(ConfigLoadError::Invalid(
            "worker.count must be at least 1".into(),
        ));
    }
    if config.sync.chunk_size == 0 {
        return Err(ConfigLoadError::Invalid(
            "sync.chunk_size must be at least 1".into(),
        ));
    }
    if config.sync.detail_concurrency == 0 {
        return Err(ConfigLoadError::Invalid(
            "sync.detail_concurrency must be at least 1".into(),
        ));
    }
    if !(0.0..=1.0).contains(&config.sync.snooze_threshold) {
        return Err(ConfigLoadError::Invalid(
            "sync.snooze_threshold must be within [0.0, 1.0]".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;

    #[test]
    fn defaults_pass_validation() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
        assert_eq!(config.sync.chunk_size, 50);
        assert_eq!(config.sync.detail_concurrency, 5);
        assert!((config.sync.snooze_threshold - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_workers_are_rejected() {
        let mut config = Config::default();
        config.worker.count = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigLoadError::Invalid(_))
        ));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut config = Config::default();
        config.sync.snooze_threshold = 1.5;
        assert!(validate(&config).is_err());
    }
}
