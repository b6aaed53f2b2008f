//! Logging setup for ioc-container
//!
//! Every event the container emits uses the `ioc_container` target with
//! structured fields (`service`, `lifetime`, `depth`, `chain`). This module
//! installs a subscriber for applications that don't bring their own.
//!
//! # Features
//!
//! - `logging` - Emit events through `tracing` (default)
//! - `logging-json` - JSON structured output (recommended for production)
//! - `logging-pretty` - Colorful multi-line output (recommended for development)
//!
//! # Example
//!
//! ```rust,ignore
//! use ioc_container::logging;
//!
//! // JSON if logging-json, pretty if logging-pretty
//! logging::init();
//!
//! // Or configure explicitly
//! logging::builder()
//!     .trace()
//!     .container_only()
//!     .compact()
//!     .with_thread_names()
//!     .init();
//! ```

use tracing::Level;

/// Target used by every event this crate emits
pub const TARGET: &str = "ioc_container";

/// Logging format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON structured logging (production default)
    #[default]
    Json,
    /// Pretty colorful output (development)
    Pretty,
    /// Compact single-line output
    Compact,
}

/// Builder for logging configuration
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_file: bool,
    with_line_number: bool,
    with_thread_ids: bool,
    with_thread_names: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Json,
            target: None,
            with_file: false,
            with_line_number: false,
            with_thread_ids: false,
            with_thread_names: false,
        }
    }
}

impl LoggingBuilder {
    /// Create a new logging builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set log level to TRACE (shows every resolution step)
    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    /// Set log level to DEBUG (registrations, cycles, lazy initialization)
    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    /// Set log level to INFO
    pub fn info(self) -> Self {
        self.with_level(Level::INFO)
    }

    /// Set log level to WARN (eager construction failures only)
    pub fn warn(self) -> Self {
        self.with_level(Level::WARN)
    }

    /// Filter to only show logs from a specific target
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only show container logs
    pub fn container_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    /// Include file names in log output
    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    /// Include line numbers in log output
    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    /// Include thread IDs in log output
    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    /// Include thread names in log output
    pub fn with_thread_names(mut self) -> Self {
        self.with_thread_names = true;
        self
    }

    /// Use JSON structured logging format
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Use pretty colorful logging format
    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    /// Use compact single-line logging format
    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// `EnvFilter` directive for the configured level and target
    pub fn directive(&self) -> String {
        match self.target {
            Some(target) => format!("{}={}", target, self.level),
            None => self.level.to_string().to_lowercase(),
        }
    }

    /// Install the subscriber.
    ///
    /// Returns false if a global subscriber was already installed.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) -> bool {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::new(self.directive());
        let (file, line, thread_ids, thread_names) = (
            self.with_file,
            self.with_line_number,
            self.with_thread_ids,
            self.with_thread_names,
        );

        macro_rules! install {
            ($layer:expr) => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        $layer
                            .with_file(file)
                            .with_line_number(line)
                            .with_thread_ids(thread_ids)
                            .with_thread_names(thread_names)
                            .with_target(true),
                    )
                    .try_init()
                    .is_ok()
            };
        }

        match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => install!(fmt::layer().json()),
            // Without JSON support fall back to the default line format
            #[cfg(not(feature = "logging-json"))]
            LogFormat::Json => install!(fmt::layer()),
            LogFormat::Pretty => install!(fmt::layer().pretty()),
            LogFormat::Compact => install!(fmt::layer().compact()),
        }
    }

    /// No-op when no subscriber feature is enabled
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) -> bool {
        false
    }
}

/// Create a new logging builder
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Initialize logging with default settings
///
/// Uses JSON format if `logging-json` is enabled, otherwise pretty format.
pub fn init() -> bool {
    if cfg!(feature = "logging-json") {
        init_json()
    } else {
        init_pretty()
    }
}

/// Initialize JSON structured logging
///
/// # Example output
/// ```json
/// {"timestamp":"2026-01-01T00:00:00.000Z","level":"DEBUG","fields":{"message":"Registered service","service":"dyn app::Database","lifetime":"lazy_singleton"},"target":"ioc_container"}
/// ```
pub fn init_json() -> bool {
    builder().json().debug().init()
}

/// Initialize pretty colorful logging
pub fn init_pretty() -> bool {
    builder().pretty().debug().init()
}

/// Initialize logging for container events only (filters other crates)
pub fn init_container_only() -> bool {
    builder().container_only().debug().init()
}
