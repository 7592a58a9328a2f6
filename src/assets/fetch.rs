//! Eventually-ready resources.
//!
//! A [`Fetched`] is the consumer side of a background load. It never blocks:
//! consumers call [`Fetched::poll`] once per tick, which reports the
//! not-ready→ready transition exactly once, and read the value with
//! [`Fetched::get`] afterwards.
//!
//! Loads either run on a worker thread ([`Fetched::spawn`]) or are resolved by
//! an external callback through a [`FetchPromise`]. There is no cancellation;
//! a promise that is dropped without a value (or a loader that fails) turns
//! into [`StrideError::FetchFailed`] on the next poll.

use std::fmt;
use std::sync::Arc;

use flume::{Receiver, Sender, TryRecvError};

use crate::errors::{Result, StrideError};

enum FetchState<T> {
    Pending(Receiver<Arc<T>>),
    Ready { value: Arc<T>, announced: bool },
}

/// Consumer handle of a resource that becomes available at some later tick.
pub struct Fetched<T> {
    label: String,
    state: FetchState<T>,
}

/// Producer handle resolving a [`Fetched`].
pub struct FetchPromise<T> {
    sender: Sender<Arc<T>>,
}

impl<T> FetchPromise<T> {
    /// Delivers the value. Resolving after the consumer was dropped is a no-op.
    pub fn resolve(self, value: impl Into<Arc<T>>) {
        let _ = self.sender.send(value.into());
    }
}

impl<T> Fetched<T> {
    /// Wraps an already loaded value. The first [`poll`](Self::poll) still
    /// reports the ready transition, so consumers size their buffers the same
    /// way for both paths.
    pub fn ready(label: impl Into<String>, value: impl Into<Arc<T>>) -> Self {
        Self {
            label: label.into(),
            state: FetchState::Ready {
                value: value.into(),
                announced: false,
            },
        }
    }

    /// Creates a pending handle and the promise that resolves it.
    pub fn pending(label: impl Into<String>) -> (FetchPromise<T>, Self) {
        let (sender, receiver) = flume::bounded(1);
        (
            FetchPromise { sender },
            Self {
                label: label.into(),
                state: FetchState::Pending(receiver),
            },
        )
    }

    /// Runs `loader` on a worker thread.
    pub fn spawn<F>(label: impl Into<String>, loader: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + Sync + 'static,
    {
        let label = label.into();
        let (promise, fetched) = Self::pending(label.clone());
        let thread_label = label.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("fetch:{label}"))
            .spawn(move || match loader() {
                Ok(value) => promise.resolve(value),
                Err(err) => log::error!("Failed to load '{thread_label}': {err}"),
            });

        if let Err(err) = spawned {
            log::error!("Failed to spawn loader thread for '{label}': {err}");
        }

        fetched
    }

    /// Non-blocking readiness check.
    ///
    /// Returns `Ok(true)` exactly once: on the first poll that observes the
    /// value. Returns `Ok(false)` while pending and on every later poll.
    pub fn poll(&mut self) -> Result<bool> {
        match &mut self.state {
            FetchState::Pending(receiver) => match receiver.try_recv() {
                Ok(value) => {
                    log::debug!("Resource '{}' is ready", self.label);
                    self.state = FetchState::Ready {
                        value,
                        announced: true,
                    };
                    Ok(true)
                }
                Err(TryRecvError::Empty) => Ok(false),
                Err(TryRecvError::Disconnected) => {
                    Err(StrideError::FetchFailed(self.label.clone()))
                }
            },
            FetchState::Ready { announced, .. } => {
                let first = !*announced;
                *announced = true;
                Ok(first)
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn has_value(&self) -> bool {
        matches!(self.state, FetchState::Ready { .. })
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.value().map(Arc::as_ref)
    }

    /// Shared handle to the loaded value, if ready.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&Arc<T>> {
        match &self.state {
            FetchState::Ready { value, .. } => Some(value),
            FetchState::Pending(_) => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T> fmt::Debug for Fetched<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetched")
            .field("label", &self.label)
            .field("ready", &self.has_value())
            .finish()
    }
}
