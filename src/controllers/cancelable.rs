//! Cooperative cancellation for long-running vehicle actions.
//!
//! Actions poll a [`Cancelable`] at every loop boundary. There are no implied
//! timeouts; a caller that wants one pairs a [`Deadline`] with its token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::ControllerError;

pub trait Cancelable {
    fn is_canceled(&self) -> bool;

    /// `Err(Canceled)` once the handle fired.
    fn check(&self) -> Result<(), ControllerError> {
        if self.is_canceled() {
            Err(ControllerError::Canceled)
        } else {
            Ok(())
        }
    }
}

/// Shareable cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl Cancelable for CancelToken {
    fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Fires once wall-clock time passes `at`, or when its inner token fires.
///
/// A timeout too large for the clock (e.g. `Duration::MAX`) never expires;
/// only the token can fire it.
#[derive(Debug, Clone)]
pub struct Deadline {
    token: CancelToken,
    at: Option<Instant>,
}

impl Deadline {
    pub fn new(token: CancelToken, timeout: Duration) -> Self {
        Self { token, at: Instant::now().checked_add(timeout) }
    }

    /// `Duration::MAX` for an unbounded deadline.
    pub fn remaining(&self) -> Duration {
        self.at.map_or(Duration::MAX, |at| at.saturating_duration_since(Instant::now()))
    }
}

impl Cancelable for Deadline {
    fn is_canceled(&self) -> bool {
        self.token.is_canceled() || self.at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancelable for NeverCancel {
    fn is_canceled(&self) -> bool {
        false
    }
}

/// Drive `step` until it reports completion, polling `cancel` before every
/// iteration. `step` returns `Ok(true)` when done.
pub fn run_cancelable<F>(cancel: &dyn Cancelable, mut step: F) -> Result<(), ControllerError>
where
    F: FnMut() -> Result<bool, ControllerError>,
{
    loop {
        cancel.check()?;
        if step()? {
            return Ok(());
        }
    }
}
