use alloc::vec::Vec;
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, ErrorEntry, ErrorType};

// -----------------------------------------------------------------------------
// ErrorHandler

/// Decides the fate of advisory errors.
///
/// Returning `Err` aborts the conversion that reported the entry.
///
/// Any `Fn(&ErrorEntry) -> Result<(), Error>` closure is a handler.
///
/// # Examples
///
/// ```
/// use vc_bind::error::{Error, ErrorContainer, ErrorEntry, ErrorType};
///
/// let only_missing_keys_fail = |entry: &ErrorEntry| match entry.ty {
///     ErrorType::KeyNotFound => Err(Error::Aborted(entry.clone())),
///     _ => Ok(()),
/// };
///
/// let mut errors = ErrorContainer::new();
/// errors.report(ErrorEntry::unexpected_key("extra"));
/// assert!(errors.handle(&only_missing_keys_fail).is_ok());
///
/// errors.report(ErrorEntry::key_not_found("port"));
/// assert!(errors.handle(&only_missing_keys_fail).is_err());
/// ```
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, entry: &ErrorEntry) -> Result<(), Error>;
}

impl<F> ErrorHandler for F
where
    F: Fn(&ErrorEntry) -> Result<(), Error> + Send + Sync,
{
    #[inline]
    fn handle(&self, entry: &ErrorEntry) -> Result<(), Error> {
        self(entry)
    }
}

// -----------------------------------------------------------------------------
// Built-in handlers

/// Logs each entry at `warn` level. The default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

impl ErrorHandler for LoggingHandler {
    #[inline]
    fn handle(&self, entry: &ErrorEntry) -> Result<(), Error> {
        log::warn!("{entry}");
        Ok(())
    }
}

/// Drops every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressingHandler;

impl ErrorHandler for SuppressingHandler {
    #[inline]
    fn handle(&self, _: &ErrorEntry) -> Result<(), Error> {
        Ok(())
    }
}

/// Escalates the first entry into [`Error::Aborted`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingHandler;

impl ErrorHandler for FailingHandler {
    #[inline]
    fn handle(&self, entry: &ErrorEntry) -> Result<(), Error> {
        Err(Error::Aborted(entry.clone()))
    }
}

/// Keeps every entry for later inspection.
///
/// Share it through an `Arc` to read the entries after a conversion.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    entries: Mutex<Vec<ErrorEntry>>,
}

impl RecordingHandler {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// A copy of the recorded entries, in order.
    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns the recorded entries.
    pub fn take(&self) -> Vec<ErrorEntry> {
        core::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of recorded entries of type `ty`.
    pub fn count(&self, ty: ErrorType) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.ty == ty)
            .count()
    }
}

impl ErrorHandler for RecordingHandler {
    fn handle(&self, entry: &ErrorEntry) -> Result<(), Error> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests
