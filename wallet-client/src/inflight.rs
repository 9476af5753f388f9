use parking_lot::RwLock;
use std::sync::Arc;

use crate::errors::{WalletError, WalletResult};

/// State that carries a single in-flight request flag and a last error slot.
pub(crate) trait RequestState {
    fn is_pending(&self) -> bool;
    fn set_pending(&mut self, pending: bool);
    fn set_last_error(&mut self, error: Option<WalletError>);
}

/// Marks one outstanding request on a component.
///
/// `pending` is cleared exactly once: by [`InFlight::settle`] together with
/// the outcome, or by `Drop` if the command future is abandoned mid-request.
#[must_use = "an in-flight request must be settled"]
pub(crate) struct InFlight<S: RequestState> {
    state: Arc<RwLock<S>>,
    command: &'static str,
    settled: bool,
}

impl<S: RequestState> InFlight<S> {
    /// Run `check` and, if it passes, mark the component pending.
    ///
    /// Busy and local failures are recorded as the last error under the same
    /// lock and never set `pending`.
    pub(crate) fn start<T, F>(
        state: &Arc<RwLock<S>>,
        command: &'static str,
        check: F,
    ) -> WalletResult<(Self, T)>
    where
        F: FnOnce(&mut S) -> WalletResult<T>,
    {
        let mut guard = state.write();
        if guard.is_pending() {
            log::debug!("{} rejected: another request is outstanding", command);
            guard.set_last_error(Some(WalletError::Busy));
            return Err(WalletError::Busy);
        }

        let value = match check(&mut guard) {
            Ok(value) => value,
            Err(err) => {
                log::debug!("{} rejected locally: {}", command, err);
                guard.set_last_error(Some(err.clone()));
                return Err(err);
            }
        };

        guard.set_pending(true);
        guard.set_last_error(None);
        log::debug!("{} issued", command);

        Ok((
            InFlight {
                state: Arc::clone(state),
                command,
                settled: false,
            },
            value,
        ))
    }

    /// Apply the request outcome and clear `pending` in one step.
    pub(crate) fn settle<T, R, F>(mut self, outcome: WalletResult<T>, apply: F) -> WalletResult<R>
    where
        F: FnOnce(&mut S, T) -> R,
    {
        let mut guard = self.state.write();
        let result = match outcome {
            Ok(value) => {
                guard.set_last_error(None);
                Ok(apply(&mut guard, value))
            }
            Err(err) => {
                log::warn!("{} failed: {}", self.command, err);
                guard.set_last_error(Some(err.clone()));
                Err(err)
            }
        };
        guard.set_pending(false);
        drop(guard);

        self.settled = true;
        result
    }
}

impl<S: RequestState> Drop for InFlight<S> {
    fn drop(&mut self) {
        if !self.settled {
            log::debug!("{} abandoned before completion", self.command);
            self.state.write().set_pending(false);
        }
    }
}
