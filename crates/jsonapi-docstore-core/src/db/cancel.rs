//! Request cancellation passed from the host into storage calls.

use crate::error::Error;
use std::future::Future;
use tokio::sync::watch;

///
/// CancelHandle
///
/// Owner side of a request's cancellation signal. Held by the host for the
/// lifetime of one inbound request.
///

#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: Some(self.tx.subscribe()),
        }
    }
}

///
/// CancelSignal
///
/// Observer side handed to repository calls. `CancelSignal::none()` never fires.
///

#[derive(Clone, Debug)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// Create a linked handle/signal pair.
    #[must_use]
    pub fn pair() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);

        (CancelHandle { tx }, Self { rx: Some(rx) })
    }

    /// A signal that is never cancelled.
    #[must_use]
    pub const fn none() -> Self {
        Self { rx: None }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once the signal fires. Pends forever for `none()` or when the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };

        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Run a storage future, aborting it when the signal fires first.
    ///
    /// The future is dropped on cancellation; an already-fired signal fails
    /// before the future is polled at all.
    pub(crate) async fn guard<T, F>(&self, operation: &'static str, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if self.is_cancelled() {
            return Err(Error::canceled(operation));
        }

        tokio::select! {
            biased;
            () = self.cancelled() => Err(Error::canceled(operation)),
            result = fut => result,
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::none()
    }
}
