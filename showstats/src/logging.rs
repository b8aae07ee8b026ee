//! Logging utilities and configuration for showstats.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the application. [`setup::init_logging`] is a convenience for binaries,
//! tests and benches.

use tracing::Level;

/// Logging configuration for report execution.
///
/// Controls how much of the generated SQL and timing information is emitted.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for showstats components
    pub base_level: Level,
    /// Whether to log the generated SQL queries
    pub log_queries: bool,
    /// Whether to log per-query timings
    pub log_timings: bool,
    /// Maximum length for logged field values (generated SQL can be long)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_queries: true,
            log_timings: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_queries: true,
            log_timings: true,
            max_field_length: 4096,
        }
    }

    /// Creates a configuration that emits nothing below warnings.
    pub fn quiet() -> Self {
        Self {
            base_level: Level::WARN,
            log_queries: false,
            log_timings: false,
            max_field_length: 128,
        }
    }
}

/// Macro for performance-sensitive debug logging.
///
/// Only evaluates its arguments if the config's base level admits debug events.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional query logging.
#[macro_export]
macro_rules! log_query {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_queries {
            tracing::debug!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` characters.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    match value.char_indices().nth(max_length) {
        None => value.to_string(),
        Some((byte_idx, _)) => format!("{}...(truncated)", &value[..byte_idx]),
    }
}

/// Utilities for installing a `tracing` subscriber.
pub mod setup {
    use tracing::Level;

    /// Configuration for the global subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for the application
        pub level: Level,
        /// Log level for the showstats crate specifically
        pub showstats_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                showstats_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Creates a configuration for production use.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                showstats_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                showstats_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// Sets the log level for the application.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for showstats components.
        pub fn with_showstats_level(mut self, level: Level) -> Self {
            self.showstats_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},showstats={}",
                    self.level.as_str().to_lowercase(),
                    self.showstats_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a global subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured filter. Fails if a
    /// global subscriber is already installed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use showstats::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
