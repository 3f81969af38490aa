use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

use crate::errors::SessionError;

pub type RefreshResult = Result<String, SessionError>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<oneshot::Sender<RefreshResult>>,
}

/// Serializes refresh cycles for one client.
///
/// The `refreshing` flag and the waiter queue live behind one lock so that
/// deciding "lead or wait" is atomic: two callers can never both observe an
/// idle coordinator and start overlapping refreshes.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

pub enum Entry<'a> {
    /// This caller performs the refresh and must settle the guard.
    Lead(RefreshGuard<'a>),
    /// A refresh is already running; the receiver yields its outcome.
    Wait(oneshot::Receiver<RefreshResult>),
    /// The session already moved past the rejected token.
    Current(String),
}

/// Result of [`RefreshCoordinator::try_lead`], which never queues.
pub enum Attempt<'a> {
    Lead(RefreshGuard<'a>),
    /// Another cycle is running.
    Busy,
    Current(String),
}

impl RefreshCoordinator {
    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    pub fn queued(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Leads a new cycle, queues behind the running one, or hands back the
    /// current token if it differs from `rejected`.
    ///
    /// `current` is evaluated under the lock, so a cycle that persisted its
    /// token and then went idle is always observed.
    pub fn join_or_lead<F>(&self, rejected: Option<&str>, current: F) -> Entry<'_>
    where
        F: FnOnce() -> Option<String>,
    {
        let mut state = self.lock();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            debug!(queued = state.waiters.len(), "refresh in flight; request queued");
            return Entry::Wait(rx);
        }
        match self.lead_unless_current(&mut state, rejected, current) {
            Ok(guard) => Entry::Lead(guard),
            Err(token) => Entry::Current(token),
        }
    }

    /// Like [`join_or_lead`](Self::join_or_lead) but reports `Busy` instead of queueing.
    pub fn try_lead<F>(&self, rejected: Option<&str>, current: F) -> Attempt<'_>
    where
        F: FnOnce() -> Option<String>,
    {
        let mut state = self.lock();
        if state.refreshing {
            return Attempt::Busy;
        }
        match self.lead_unless_current(&mut state, rejected, current) {
            Ok(guard) => Attempt::Lead(guard),
            Err(token) => Attempt::Current(token),
        }
    }

    fn lead_unless_current<F>(
        &self,
        state: &mut RefreshState,
        rejected: Option<&str>,
        current: F,
    ) -> Result<RefreshGuard<'_>, String>
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(token) = current() {
            if rejected != Some(token.as_str()) {
                return Err(token);
            }
        }
        state.refreshing = true;
        Ok(RefreshGuard {
            coordinator: self,
            settled: false,
        })
    }

    fn release<F>(&self, outcome: RefreshResult, before_release: F) -> usize
    where
        F: FnOnce(usize),
    {
        let waiters = {
            let mut state = self.lock();
            before_release(state.waiters.len());
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose caller went away is simply skipped.
            let _ = waiter.send(outcome.clone());
        }
        released
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of the running refresh cycle. Settling (or dropping) it clears the
/// flag and releases every waiter in arrival order.
pub struct RefreshGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshGuard<'_> {
    /// Ends the cycle and returns how many queued requests were released.
    pub fn settle(self, outcome: RefreshResult) -> usize {
        self.settle_with(outcome, |_| {})
    }

    /// Like [`settle`](Self::settle), but first runs `before_release` with the
    /// number of queued requests while no new request can join or lead.
    /// `before_release` must not call back into the coordinator.
    pub fn settle_with<F>(mut self, outcome: RefreshResult, before_release: F) -> usize
    where
        F: FnOnce(usize),
    {
        self.settled = true;
        self.coordinator.release(outcome, before_release)
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.release(Err(SessionError::Abandoned), |_| {});
        }
    }
}
