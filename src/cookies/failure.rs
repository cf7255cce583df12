//! Failure sinks: where persist and restore failures go.
//!
//! The persistent store never returns persistence failures to callers of
//! cookie operations. It hands them to a [`FailureSink`] on the calling
//! thread instead.

use crate::base::cookieerror::PersistenceError;

/// Notified synchronously when a snapshot cannot be written or read.
pub trait FailureSink: Send + Sync {
    fn on_persist_failure(&self, error: &PersistenceError);

    fn on_restore_failure(&self, error: &PersistenceError);
}

/// Ignores every failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFailureSink;

impl FailureSink for NoopFailureSink {
    fn on_persist_failure(&self, _error: &PersistenceError) {}

    fn on_restore_failure(&self, _error: &PersistenceError) {}
}

/// Reports failures as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureSink;

impl FailureSink for TracingFailureSink {
    fn on_persist_failure(&self, error: &PersistenceError) {
        tracing::error!(error = %error, "cookie persist failed");
    }

    fn on_restore_failure(&self, error: &PersistenceError) {
        tracing::error!(error = %error, "cookie restore failed");
    }
}

/// A sink built from two closures.
///
/// ```
/// use cookiepersist::cookies::failure::FnFailureSink;
///
/// let sink = FnFailureSink::new(
///     |e| eprintln!("persist failed: {}", e),
///     |e| eprintln!("restore failed: {}", e),
/// );
/// # let _ = sink;
/// ```
pub struct FnFailureSink<P, R> {
    on_persist: P,
    on_restore: R,
}

impl<P, R> FnFailureSink<P, R>
where
    P: Fn(&PersistenceError) + Send + Sync,
    R: Fn(&PersistenceError) + Send + Sync,
{
    pub fn new(on_persist: P, on_restore: R) -> Self {
        Self {
            on_persist,
            on_restore,
        }
    }
}

impl<P, R> FailureSink for FnFailureSink<P, R>
where
    P: Fn(&PersistenceError) + Send + Sync,
    R: Fn(&PersistenceError) + Send + Sync,
{
    fn on_persist_failure(&self, error: &PersistenceError) {
        (self.on_persist)(error)
    }

    fn on_restore_failure(&self, error: &PersistenceError) {
        (self.on_restore)(error)
    }
}
