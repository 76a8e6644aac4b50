//! Leveled key-value log sinks
//!
//! The store never talks to a global logger. A sink is picked once, when the
//! store is built, and every log call ignores the sink's result.

use std::fmt;
use std::sync::Arc;

/// Severity of a log line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Error reported by a sink that failed to record a line
#[derive(Debug, thiserror::Error)]
#[error("log sink failed: {0}")]
pub struct LogError(pub String);

/// Destination for the store's structured log lines
pub trait LogSink: Send + Sync + 'static {
    fn log(&self, level: Level, message: &str, fields: &[(&str, &dyn fmt::Display)]) -> Result<(), LogError>;
}

/// Sink forwarding to `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str, fields: &[(&str, &dyn fmt::Display)]) -> Result<(), LogError> {
        let fields = fields
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ");

        match level {
            Level::Debug => tracing::debug!(target: "salvo_mongo_session", %fields, "{}", message),
            Level::Info => tracing::info!(target: "salvo_mongo_session", %fields, "{}", message),
            Level::Warn => tracing::warn!(target: "salvo_mongo_session", %fields, "{}", message),
            Level::Error => tracing::error!(target: "salvo_mongo_session", %fields, "{}", message),
        }
        Ok(())
    }
}

/// Sink discarding everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NopSink;

impl LogSink for NopSink {
    fn log(&self, _level: Level, _message: &str, _fields: &[(&str, &dyn fmt::Display)]) -> Result<(), LogError> {
        Ok(())
    }
}

/// Handle the store logs through
#[derive(Clone)]
pub(crate) struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    /// Pick the sink: disabled logging always wins, then the caller's sink,
    /// then `tracing`.
    pub(crate) fn resolve(enabled: bool, sink: Option<Arc<dyn LogSink>>) -> Self {
        let sink = match (enabled, sink) {
            (false, _) => Arc::new(NopSink) as Arc<dyn LogSink>,
            (true, Some(sink)) => sink,
            (true, None) => Arc::new(TracingSink),
        };
        Self { sink }
    }

    pub(crate) fn debug(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        let _ = self.sink.log(Level::Debug, message, fields);
    }

    pub(crate) fn info(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        let _ = self.sink.log(Level::Info, message, fields);
    }

    pub(crate) fn warn(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        let _ = self.sink.log(Level::Warn, message, fields);
    }

    pub(crate) fn error(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        let _ = self.sink.log(Level::Error, message, fields);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}
