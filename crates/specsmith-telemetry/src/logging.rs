//! Structured logging setup.
//!
//! Logs go to stderr so command output on stdout stays clean.

use crate::{LogFormat, TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging subsystem.
///
/// Sets up tracing-subscriber with either JSON or pretty format,
/// respecting the configured log level.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    // RUST_LOG wins over the configured level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => init_json_logging(filter),
        LogFormat::Pretty => init_pretty_logging(filter),
    }
}

fn init_json_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let json_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_file(false)
        .with_line_number(false)
        .flatten_event(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

fn init_pretty_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let pretty_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(pretty_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

/// Standard log event names.
pub mod events {
    /// A command is starting.
    pub const STARTUP: &str = "startup";

    /// An input file could not be read or an output file written.
    pub const IO_ERROR: &str = "io_error";

    /// A YAML/JSON document was imported into the model.
    pub const IMPORT_COMPLETED: &str = "import_completed";

    /// A document was validated.
    pub const VALIDATION_COMPLETED: &str = "validation_completed";

    /// A document failed validation.
    pub const VALIDATION_FAILURE: &str = "validation_failure";

    /// A model snapshot was exported to YAML.
    pub const EXPORT_COMPLETED: &str = "export_completed";

    /// A document was imported and re-serialized.
    pub const NORMALIZE_COMPLETED: &str = "normalize_completed";
}

/// Helper macros for structured logging with standard fields.
///
/// These wrap the tracing macros to ensure consistent field naming.
#[macro_export]
macro_rules! log_startup {
    ($($field:tt)*) => {
        tracing::debug!(
            event = $crate::logging::events::STARTUP,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_io_error {
    ($($field:tt)*) => {
        tracing::error!(
            event = $crate::logging::events::IO_ERROR,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_import_completed {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::IMPORT_COMPLETED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_validation_completed {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::VALIDATION_COMPLETED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_validation_failure {
    ($($field:tt)*) => {
        tracing::warn!(
            event = $crate::logging::events::VALIDATION_FAILURE,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_export_completed {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::EXPORT_COMPLETED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_normalize_completed {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::NORMALIZE_COMPLETED,
            $($field)*
        )
    };
}
