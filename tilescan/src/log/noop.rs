//! No-operation logger implementation.

use crate::log::{Field, LogLevel, Logger};

/// A logger that discards all messages.
///
/// Useful for unit tests where log output would be noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    #[inline]
    fn log(&self, _level: LogLevel, _message: &str, _fields: &[Field<'_>]) {}
}
