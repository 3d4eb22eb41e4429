//! What a mutating service call can result in

use std::error::Error;
use std::fmt::Display;

/// The result of a call that writes to the store.
///
/// Store errors never cross the service boundary: they are logged, and the caller only gets `Failed`.
/// A caller that receives `Failed` must behave as if nothing happened.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub enum Outcome<T> {
    /// The store has applied the change, and this is its authoritative answer
    Done(T),
    /// The store could not be reached or refused the change
    Failed,
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(t) => Some(t),
            Outcome::Failed => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Done(t) => Outcome::Done(f(t)),
            Outcome::Failed => Outcome::Failed,
        }
    }

    /// Settle the result of a store call, logging its error if any
    pub fn from_result<D: Display>(result: Result<T, Box<dyn Error>>, action: D) -> Self {
        match result {
            Ok(t) => Outcome::Done(t),
            Err(err) => {
                log::error!("Error {}: {}", action, err);
                Outcome::Failed
            },
        }
    }
}

/// Input that is rejected before anything is sent to the store
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("the title must not be empty")]
    EmptyTitle,
    #[error("{0} is a read-only college slot")]
    ReadOnlySlot(String),
    #[error("there is no task {0}")]
    UnknownTask(String),
}
