use thiserror::Error;

pub const MAX_BUBBLE_DEPTH_VAR: &str = "GEOSCENE_MAX_BUBBLE_DEPTH";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";
pub const DEFAULT_LOG_FILTER: &str = "geoscene=debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidDepth { var: &'static str, value: String },
}

/// Runtime settings for the event subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsConfig {
    /// Upper bound on nodes visited per dispatch; `None` bubbles until the root
    pub max_bubble_depth: Option<usize>,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            max_bubble_depth: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EventsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source, unset values fall back
    /// to the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_bubble_depth = match lookup(MAX_BUBBLE_DEPTH_VAR) {
            Some(raw) => {
                let parsed = raw.trim().parse::<usize>();
                match parsed {
                    Ok(depth) if depth > 0 => Some(depth),
                    _ => {
                        return Err(ConfigError::InvalidDepth {
                            var: MAX_BUBBLE_DEPTH_VAR,
                            value: raw,
                        })
                    }
                }
            }
            None => defaults.max_bubble_depth,
        };

        Ok(Self {
            max_bubble_depth,
            log_filter: lookup(LOG_FILTER_VAR).unwrap_or(defaults.log_filter),
        })
    }
}
