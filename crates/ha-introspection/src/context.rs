//! Per-request cancellation and deadline
//!
//! Every backend call receives a [`RequestContext`]. The engine also races
//! each call against the context, so a backend that ignores it still cannot
//! keep a cancelled request alive.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::BackendError;

/// Cancellation signal and optional deadline for one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    cancelled: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

/// Owner side of a [`RequestContext`]'s cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the request; in-flight and future calls fail with `Cancelled`
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl RequestContext {
    /// Create a cancellable context and its handle
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancelled: rx,
                deadline: None,
            },
            CancelHandle { tx },
        )
    }

    /// A context that can only end through its deadline
    pub fn background() -> Self {
        let (ctx, _handle) = Self::new();
        ctx
    }

    /// Set a deadline `timeout` from now
    ///
    /// A timeout too large to represent as an instant leaves the context
    /// without a deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Set the deadline, keeping an earlier one if already set
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Fail fast if the request is already cancelled or past its deadline
    pub fn check(&self) -> Result<(), BackendError> {
        if self.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(BackendError::TimedOut);
        }
        Ok(())
    }

    /// Resolves once the request is cancelled; never resolves if the handle
    /// was dropped without cancelling
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Run a backend call, abandoning it on cancellation or deadline
    pub async fn run<T, F>(&self, call: F) -> Result<T, BackendError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(BackendError::Cancelled),
            _ = deadline => Err(BackendError::TimedOut),
            result = call => result,
        }
    }
}
