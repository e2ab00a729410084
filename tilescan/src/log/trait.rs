//! Logger trait definition.

use std::fmt;

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Verbose debugging information
    Trace,
    /// Debugging information
    Debug,
    /// General information
    Info,
    /// Warning messages
    Warn,
    /// Error messages
    Error,
}

/// A structured key-value pair attached to a log event.
pub type Field<'a> = (&'static str, &'a dyn fmt::Display);

/// Logging interface for application components.
///
/// Events carry a static-ish message plus key-value fields, so backends can
/// render them however they like. Components hold an `Arc<dyn Logger>` and
/// never write to a stream directly.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across tasks.
///
/// # Example
///
/// ```
/// use tilescan::log::{Logger, NoOpLogger};
/// use tilescan::{log_debug, log_info};
/// use std::sync::Arc;
///
/// let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
/// log_info!(logger, "Batch started", tiles = 4);
/// log_debug!(logger, "Nothing to add");
/// ```
pub trait Logger: Send + Sync {
    /// Log a message with fields at the specified level.
    ///
    /// This is the core method that implementations must provide.
    /// The convenience methods delegate to it.
    fn log(&self, level: LogLevel, message: &str, fields: &[Field<'_>]);

    /// Log a trace-level event.
    fn trace(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Trace, message, fields);
    }

    /// Log a debug-level event.
    fn debug(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Debug, message, fields);
    }

    /// Log an info-level event.
    fn info(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Info, message, fields);
    }

    /// Log a warning-level event.
    fn warn(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Warn, message, fields);
    }

    /// Log an error-level event.
    fn error(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Error, message, fields);
    }
}

/// Convenience macros for logging with `key = value` fields.
///
/// `log_info!(logger, "Fetched tile", url = url, status = 200)`
#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $logger.trace($msg, &[$((stringify!($key), &$value as &dyn ::std::fmt::Display)),*])
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $logger.debug($msg, &[$((stringify!($key), &$value as &dyn ::std::fmt::Display)),*])
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $logger.info($msg, &[$((stringify!($key), &$value as &dyn ::std::fmt::Display)),*])
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $logger.warn($msg, &[$((stringify!($key), &$value as &dyn ::std::fmt::Display)),*])
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $logger.error($msg, &[$((stringify!($key), &$value as &dyn ::std::fmt::Display)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_default_methods_route_to_level() {
        use std::sync::Mutex;

        #[derive(Default)]
        struct LevelSink(Mutex<Vec<LogLevel>>);

        impl Logger for LevelSink {
            fn log(&self, level: LogLevel, _message: &str, _fields: &[Field<'_>]) {
                self.0.lock().unwrap().push(level);
            }
        }

        let sink = LevelSink::default();
        sink.trace("t", &[]);
        sink.debug("d", &[]);
        sink.info("i", &[]);
        sink.warn("w", &[]);
        sink.error("e", &[]);

        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![
                LogLevel::Trace,
                LogLevel::Debug,
                LogLevel::Info,
                LogLevel::Warn,
                LogLevel::Error
            ]
        );
    }
}
