//! Deferred work returned from [`EnrollmentSession::update`].
//!
//! A [`Task`] is an optional future that yields the next [`Message`]. The
//! surrounding event loop awaits it and feeds the message back into `update`.
//!
//! [`EnrollmentSession::update`]: crate::session::EnrollmentSession::update

use std::future::Future;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::message::Message;

/// Work to perform after handling a message.
#[must_use = "tasks do nothing unless driven"]
pub struct Task(Option<BoxFuture<'static, Message>>);

impl Task {
    /// No follow-up work.
    pub fn none() -> Self {
        Self(None)
    }

    /// Run `future` and map its output to a message.
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> Message + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: 'static,
    {
        Self(Some(future.map(map).boxed()))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Await the task, returning its message if there was any work.
    pub async fn run(self) -> Option<Message> {
        match self.0 {
            Some(future) => Some(future.await),
            None => None,
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Task")
            .field(&if self.0.is_some() { "pending" } else { "none" })
            .finish()
    }
}
