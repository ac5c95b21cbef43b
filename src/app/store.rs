//! Shared state store with observer fan-out.
//!
//! ```text
//!  Scheduler ─┐                                  ┌──▶ LED observer
//!  Wake mon. ─┼──▶ update(mutator) ──▶ notify ───┤
//!  Valve wkr ─┘        (Mutex)        (caller)   └──▶ console renderer signal
//! ```
//!
//! * `update` runs the mutator under the lock; concurrent callers block.
//! * The mutator decides whether its change is worth a notification.
//! * Observers run after the lock is released, synchronously on the
//!   mutating thread. They may call [`StateStore::snapshot`] but must not
//!   subscribe from inside a notification.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use super::state::AppState;

/// Zero-argument change callback.
pub type Observer = Box<dyn Fn() + Send + Sync>;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mutually exclusive, observable application state.
pub struct StateStore {
    state: Mutex<AppState>,
    observers: RwLock<Vec<Observer>>,
}

impl StateStore {
    pub fn new(initial: AppState) -> Self {
        Self {
            state: Mutex::new(initial),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Full copy of the current state.
    pub fn snapshot(&self) -> AppState {
        lock(&self.state).clone()
    }

    /// Register an observer. It is invoked once per notifying update.
    pub fn subscribe(&self, observer: impl Fn() + Send + Sync + 'static) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(observer));
    }

    /// Apply `mutator` under the lock.
    ///
    /// The mutator returns `true` when its change should reach the
    /// observers. Returns whether observers were notified.
    pub fn update<F>(&self, mutator: F) -> bool
    where
        F: FnOnce(&mut AppState) -> bool,
    {
        let notify = {
            let mut state = lock(&self.state);
            mutator(&mut state)
        };
        if notify {
            self.notify();
        }
        notify
    }

    /// Apply `mutator` and notify only if an observable field changed.
    pub fn update_if_changed<F>(&self, mutator: F) -> bool
    where
        F: FnOnce(&mut AppState),
    {
        self.update(|state| {
            let before = state.clone();
            mutator(state);
            *state != before
        })
    }

    /// Invoke every observer on the calling thread.
    fn notify(&self) {
        let observers = self.observers.read().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer();
        }
    }
}
