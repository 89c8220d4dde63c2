//! Bridging engine requests into one-shot futures.

use futures_channel::oneshot;
use relaydb_engine::{ErrorCode, Request};
use std::future::Future;

/// Converts one pending engine request into a future.
///
/// The returned future resolves with the request's value on success or
/// with the engine's failure code on error, and settles exactly once.
/// The completion handler is attached before this function returns, so
/// there is no window in which the request could complete unobserved —
/// not even for requests the engine settles synchronously.
///
/// Every single-record operation in this crate is built on this one
/// primitive. If the engine drops the request without ever settling it,
/// the future resolves with [`ErrorCode::Abandoned`] instead of hanging.
pub fn bridge<T: Send + 'static>(
    request: Request<T>,
) -> impl Future<Output = Result<T, ErrorCode>> {
    let (tx, rx) = oneshot::channel();
    request.on_complete(move |outcome| {
        // The receiver may have been dropped; nothing to deliver to then.
        let _ = tx.send(outcome);
    });
    async move {
        match rx.await {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Err(ErrorCode::Abandoned),
        }
    }
}
