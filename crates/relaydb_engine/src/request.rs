//! Pending engine requests.

use crate::error::ErrorCode;
use parking_lot::Mutex;
use std::sync::Arc;

/// The outcome a request settles with.
pub type Outcome<T> = Result<T, ErrorCode>;

type Callback<T> = Box<dyn FnOnce(Outcome<T>) + Send>;

/// A pending engine request.
///
/// A request is an ephemeral unit of work issued against the engine. Its
/// only observable states are pending, succeeded or failed, and it settles
/// exactly once. The engine side calls [`Request::complete`]; the consumer
/// attaches a single handler with [`Request::on_complete`].
///
/// Completion and handler attachment may happen in either order: whichever
/// arrives second fires the handler, so a consumer that attaches after a
/// synchronous completion still observes exactly one settlement and there
/// is no race window.
pub struct Request<T> {
    state: Arc<Mutex<State<T>>>,
}

struct State<T> {
    outcome: Option<Outcome<T>>,
    callback: Option<Callback<T>>,
    delivered: bool,
}

impl<T> Clone for Request<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for Request<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Request<T> {
    /// Creates a pending request.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                outcome: None,
                callback: None,
                delivered: false,
            })),
        }
    }

    /// Creates a request that has already settled.
    #[must_use]
    pub fn settled(outcome: Outcome<T>) -> Self {
        let request = Self::new();
        request.complete(outcome);
        request
    }

    /// Completes the request (engine side).
    ///
    /// Settling twice is a contract violation; the second completion is
    /// debug-asserted and otherwise ignored.
    pub fn complete(&self, outcome: Outcome<T>) {
        let fire = {
            let mut state = self.state.lock();
            if state.outcome.is_some() || state.delivered {
                debug_assert!(false, "request completed twice");
                return;
            }
            match state.callback.take() {
                Some(callback) => {
                    state.delivered = true;
                    Some((callback, outcome))
                }
                None => {
                    state.outcome = Some(outcome);
                    None
                }
            }
        };
        // Fire outside the lock; the handler may issue further requests.
        if let Some((callback, outcome)) = fire {
            callback(outcome);
        }
    }

    /// Attaches the completion handler (consumer side).
    ///
    /// At most one handler may ever be attached; a second attachment is
    /// debug-asserted and otherwise ignored. If the request already
    /// settled, the handler fires immediately.
    pub fn on_complete(&self, f: impl FnOnce(Outcome<T>) + Send + 'static) {
        let mut callback: Option<Callback<T>> = Some(Box::new(f));
        let fire = {
            let mut state = self.state.lock();
            if state.delivered || state.callback.is_some() {
                debug_assert!(false, "request handler attached twice");
                return;
            }
            match state.outcome.take() {
                Some(outcome) => {
                    state.delivered = true;
                    Some(outcome)
                }
                None => {
                    state.callback = callback.take();
                    None
                }
            }
        };
        if let (Some(outcome), Some(callback)) = (fire, callback) {
            callback(outcome);
        }
    }

    /// Whether the request has settled (delivered or buffered).
    #[must_use]
    pub fn is_settled(&self) -> bool {
        let state = self.state.lock();
        state.delivered || state.outcome.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn handler_then_completion() {
        let request: Request<u32> = Request::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&fired);
        request.on_complete(move |outcome| {
            assert_eq!(outcome, Ok(7));
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!request.is_settled());

        request.complete(Ok(7));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn completion_then_handler() {
        let request: Request<u32> = Request::settled(Err(ErrorCode::Constraint));
        let fired = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&fired);
        request.on_complete(move |outcome| {
            assert_eq!(outcome, Err(ErrorCode::Constraint));
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn settles_exactly_once_across_clones() {
        let request: Request<u32> = Request::new();
        let engine_side = request.clone();
        let fired = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&fired);
        request.on_complete(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        engine_side.complete(Ok(1));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
