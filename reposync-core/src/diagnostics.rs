//! Diagnostics sink injected into every sync run.
//!
//! The core never exits the process. Fatal conditions are reported through
//! [`Diagnostics::set_failed`] and the caller turns [`Diagnostics::has_failed`]
//! into an exit code.

use std::sync::Mutex;

/// Logger plus run-failure flag, scoped to one synchronization run.
pub trait Diagnostics: Send + Sync {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// Mark the whole run as failed. The run may keep going; the caller
    /// decides what to do with the flag once `sync` returns.
    fn set_failed(&self, message: &str);

    fn has_failed(&self) -> bool;
}

/// Standard [`Diagnostics`] implementation: forwards messages to the `log`
/// facade and remembers every failure message of the run.
#[derive(Debug, Default)]
pub struct RunDiagnostics {
    failures: Mutex<Vec<String>>,
}

impl RunDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failure messages recorded so far, in order.
    pub fn failures(&self) -> Vec<String> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Diagnostics for RunDiagnostics {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn set_failed(&self, message: &str) {
        tracing::error!("run failed: {message}");
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }

    fn has_failed(&self) -> bool {
        !self
            .failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_empty()
    }
}
