//! Memoized deferred computation evaluated at most once
//!
//! `AtomicLazy` is a three-state machine (unevaluated, evaluating, evaluated).
//! Callers race with a compare-and-swap to become the single evaluator; losers
//! retry a bounded number of times and then block until the outcome is
//! published. The outcome, value or failure, is cached forever.

use super::diagnostic::panic_message;
use super::error::{BoxError, Cause, LoggerError};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

const UNEVALUATED: u8 = 0;
const EVALUATING: u8 = 1;
const EVALUATED: u8 = 2;

/// Contention retries before a caller blocks on the evaluator
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

type Initializer<T> = Box<dyn FnOnce() -> std::result::Result<T, BoxError> + Send>;

pub struct AtomicLazy<T> {
    state: AtomicU8,
    initializer: Mutex<Option<Initializer<T>>>,
    outcome: OnceLock<std::result::Result<T, Cause>>,
    max_attempts: u32,
    gate: Mutex<()>,
    published: Condvar,
}

impl<T> AtomicLazy<T> {
    pub fn new<F>(initializer: F) -> Self
    where
        F: FnOnce() -> std::result::Result<T, BoxError> + Send + 'static,
    {
        Self::with_max_attempts(initializer, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts<F>(initializer: F, max_attempts: u32) -> Self
    where
        F: FnOnce() -> std::result::Result<T, BoxError> + Send + 'static,
    {
        Self {
            state: AtomicU8::new(UNEVALUATED),
            initializer: Mutex::new(Some(Box::new(initializer))),
            outcome: OnceLock::new(),
            max_attempts,
            gate: Mutex::new(()),
            published: Condvar::new(),
        }
    }

    /// Return the value, evaluating it first if nobody has yet.
    ///
    /// A failed evaluation returns the same cached cause to every caller.
    pub fn get(&self) -> std::result::Result<&T, Cause> {
        for _ in 0..self.max_attempts {
            match self.state.load(Ordering::Acquire) {
                EVALUATED => return self.cached(),
                UNEVALUATED => {
                    if self.try_claim() {
                        return self.evaluate();
                    }
                }
                _ => {}
            }
            thread::yield_now();
        }
        self.wait()
    }

    /// Whether a terminal state has been reached
    pub fn is_evaluated(&self) -> bool {
        self.state.load(Ordering::Acquire) == EVALUATED
    }

    fn try_claim(&self) -> bool {
        self.state
            .compare_exchange(UNEVALUATED, EVALUATING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn evaluate(&self) -> std::result::Result<&T, Cause> {
        let initializer = self.initializer.lock().take();
        let outcome = match initializer {
            Some(initializer) => match panic::catch_unwind(AssertUnwindSafe(initializer)) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(error)) => Err(Cause::from(error)),
                Err(payload) => Err(Arc::new(LoggerError::InitializerPanicked(panic_message(
                    payload.as_ref(),
                ))) as Cause),
            },
            None => Err(Arc::new(LoggerError::other("lazy initializer already consumed")) as Cause),
        };
        let _ = self.outcome.set(outcome);

        {
            let _gate = self.gate.lock();
            self.state.store(EVALUATED, Ordering::Release);
        }
        self.published.notify_all();
        self.cached()
    }

    fn wait(&self) -> std::result::Result<&T, Cause> {
        let mut gate = self.gate.lock();
        loop {
            match self.state.load(Ordering::Acquire) {
                EVALUATED => {
                    drop(gate);
                    return self.cached();
                }
                UNEVALUATED => {
                    drop(gate);
                    if self.try_claim() {
                        return self.evaluate();
                    }
                    gate = self.gate.lock();
                }
                _ => self.published.wait(&mut gate),
            }
        }
    }

    fn cached(&self) -> std::result::Result<&T, Cause> {
        match self.outcome.get() {
            Some(Ok(value)) => Ok(value),
            Some(Err(cause)) => Err(Arc::clone(cause)),
            None => Err(Arc::new(LoggerError::other("lazy outcome was not published")) as Cause),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AtomicLazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("AtomicLazy");
        match self.outcome.get() {
            Some(Ok(value)) => debug.field("value", value),
            Some(Err(cause)) => debug.field("failure", &cause.to_string()),
            None => debug.field("state", &self.state.load(Ordering::Acquire)),
        };
        debug.finish()
    }
}
