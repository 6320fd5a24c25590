//! One-time initialization guard.
//!
//! States move UNINITIALIZED -> INITIALIZING -> READY | FAILED and never go
//! back. Concurrent callers block on the in-flight attempt and all receive
//! its outcome.

use std::sync::{Condvar, Mutex, MutexGuard};

use crate::error::{ListingError, ListingResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
    Failed(String),
}

/// Runs an initializer at most once per guard.
#[derive(Debug)]
pub struct InitGuard {
    state: Mutex<InitState>,
    done: Condvar,
}

impl Default for InitGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl InitGuard {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InitState::Uninitialized),
            done: Condvar::new(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ListingResult<InitState> {
        Ok(self.lock()?.clone())
    }

    /// Runs `init` if no attempt has started, otherwise waits for and returns
    /// the outcome of the single attempt.
    pub fn run<F>(&self, init: F) -> ListingResult<()>
    where
        F: FnOnce() -> ListingResult<()>,
    {
        let mut state = self.lock()?;
        loop {
            let in_flight = match &*state {
                InitState::Ready => return Ok(()),
                InitState::Failed(message) => return Err(ListingError::Seed(message.clone())),
                InitState::Initializing => true,
                InitState::Uninitialized => false,
            };
            if !in_flight {
                break;
            }
            state = self
                .done
                .wait(state)
                .map_err(|e| ListingError::Internal(format!("init guard poisoned: {}", e)))?;
        }
        *state = InitState::Initializing;
        drop(state);

        // Resolves the state even if `init` panics, so waiters are released.
        let mut attempt = Attempt {
            guard: self,
            outcome: None,
        };
        let result = init().map_err(|e| match e {
            ListingError::Seed(message) => message,
            other => other.to_string(),
        });
        attempt.outcome = Some(match &result {
            Ok(()) => InitState::Ready,
            Err(message) => InitState::Failed(message.clone()),
        });
        drop(attempt);

        result.map_err(ListingError::Seed)
    }

    fn lock(&self) -> ListingResult<MutexGuard<'_, InitState>> {
        self.state
            .lock()
            .map_err(|e| ListingError::Internal(format!("init guard poisoned: {}", e)))
    }
}

struct Attempt<'a> {
    guard: &'a InitGuard,
    outcome: Option<InitState>,
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        let outcome = self
            .outcome
            .take()
            .unwrap_or_else(|| InitState::Failed("initializer panicked".to_string()));
        let mut state = match self.guard.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        *state = outcome;
        self.guard.done.notify_all();
    }
}
