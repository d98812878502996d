//! Completion indicators.
//!
//! A view learns whether its result is authoritative from a `QueryComplete`
//! handed to its builder: already complete, already failed, or a future that
//! settles later.

use crate::status::ErroredQuery;
use core::fmt;
use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use log::debug;

/// The completion state of a query at view construction.
pub enum QueryComplete {
    /// The result is complete.
    Complete,
    /// The query already failed.
    Errored(ErroredQuery),
    /// Settles with `Ok` once complete or `Err` if the query fails.
    Pending(LocalBoxFuture<'static, Result<(), ErroredQuery>>),
}

impl QueryComplete {
    /// Wraps a future as a pending indicator.
    pub fn pending<F>(future: F) -> Self
    where
        F: core::future::Future<Output = Result<(), ErroredQuery>> + 'static,
    {
        QueryComplete::Pending(future.boxed_local())
    }

    /// Returns true for a pending indicator.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryComplete::Pending(_))
    }
}

impl Default for QueryComplete {
    fn default() -> Self {
        QueryComplete::Complete
    }
}

impl From<bool> for QueryComplete {
    fn from(complete: bool) -> Self {
        if complete {
            QueryComplete::Complete
        } else {
            // Never settles: the result stays unconfirmed.
            QueryComplete::Pending(future::pending().boxed_local())
        }
    }
}

impl fmt::Debug for QueryComplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryComplete::Complete => f.write_str("Complete"),
            QueryComplete::Errored(err) => f.debug_tuple("Errored").field(err).finish(),
            QueryComplete::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Settles the indicator returned by `completion`.
#[derive(Debug)]
pub struct Resolver {
    sender: oneshot::Sender<Result<(), ErroredQuery>>,
}

impl Resolver {
    /// Marks the query complete.
    pub fn resolve(self) {
        // A closed receiver means the view is gone.
        let _ = self.sender.send(Ok(()));
    }

    /// Marks the query failed.
    pub fn reject(self, err: ErroredQuery) {
        let _ = self.sender.send(Err(err));
    }
}

/// Creates a pending indicator and the handle that settles it.
///
/// Dropping the resolver without settling leaves the indicator pending
/// forever.
pub fn completion() -> (Resolver, QueryComplete) {
    let (sender, receiver) = oneshot::channel();
    let future = receiver.then(|settled| match settled {
        Ok(result) => future::ready(result).left_future(),
        Err(oneshot::Canceled) => {
            debug!("completion resolver dropped without settling");
            future::pending().right_future()
        }
    });
    (Resolver { sender }, QueryComplete::pending(future))
}
