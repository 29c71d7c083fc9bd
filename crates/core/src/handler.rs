//! Error handlers decide what happens to mapping problems

use crate::error::{CogwheelError, ErrorEntry, Result};
use crate::report::ValidationReport;
use crate::serializer::SerializerContext;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Receives every [`ErrorEntry`] produced while loading or saving.
///
/// Returning `Ok` lets the operation continue; an `Err` aborts it and is
/// propagated to the caller unchanged.
pub trait ErrorHandler: Send + Sync + Debug {
    fn handle(&self, context: &SerializerContext, entry: &ErrorEntry) -> Result<()>;
}

/// Logs each entry as a warning and continues
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, _context: &SerializerContext, entry: &ErrorEntry) -> Result<()> {
        warn!(
            kind = %entry.kind,
            path = %entry.path,
            "{}",
            entry.message
        );
        Ok(())
    }
}

/// Ignores every entry
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressingErrorHandler;

impl ErrorHandler for SuppressingErrorHandler {
    fn handle(&self, _context: &SerializerContext, entry: &ErrorEntry) -> Result<()> {
        debug!(kind = %entry.kind, path = %entry.path, "Suppressed: {}", entry.message);
        Ok(())
    }
}

/// Aborts on the first entry
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictErrorHandler;

impl ErrorHandler for StrictErrorHandler {
    fn handle(&self, _context: &SerializerContext, entry: &ErrorEntry) -> Result<()> {
        Err(CogwheelError::Rejected(entry.clone()))
    }
}

/// Records entries into a shared [`ValidationReport`]
#[derive(Debug, Clone, Default)]
pub struct CollectingErrorHandler {
    report: Arc<Mutex<ValidationReport>>,
}

impl CollectingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything collected so far
    pub fn report(&self) -> ValidationReport {
        self.lock().clone()
    }

    /// Take the collected report, leaving an empty one behind
    pub fn take(&self) -> ValidationReport {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, ValidationReport> {
        self.report.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ErrorHandler for CollectingErrorHandler {
    fn handle(&self, _context: &SerializerContext, entry: &ErrorEntry) -> Result<()> {
        self.lock().add_entry(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::ConfigOptions;

    fn context() -> SerializerContext {
        SerializerContext::new(ConfigOptions::default())
    }

    #[test]
    fn test_log_and_suppress_continue() {
        let entry = ErrorEntry::new(ErrorKind::Custom, "a", "message");
        assert!(LogErrorHandler.handle(&context(), &entry).is_ok());
        assert!(SuppressingErrorHandler.handle(&context(), &entry).is_ok());
    }

    #[test]
    fn test_strict_rejects() {
        let entry = ErrorEntry::new(ErrorKind::KeyNotFound, "port", "Required key 'port' is missing");
        let err = StrictErrorHandler.handle(&context(), &entry).unwrap_err();
        assert_eq!(
            err.to_string(),
            "KEY_NOT_FOUND: Required key 'port' is missing (at 'port')"
        );
    }

    #[test]
    fn test_collecting_handler_shares_report() {
        let handler = CollectingErrorHandler::new();
        let shared = handler.clone();

        handler
            .handle(&context(), &ErrorEntry::new(ErrorKind::MismatchedTypes, "a", "bad"))
            .unwrap();
        handler
            .handle(&context(), &ErrorEntry::new(ErrorKind::UnexpectedKey, "", "extra"))
            .unwrap();

        let report = shared.report();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 1);

        let taken = shared.take();
        assert!(taken.has_errors());
        assert!(handler.report().is_valid());
    }
}
