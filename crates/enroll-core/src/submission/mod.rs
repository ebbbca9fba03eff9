//! Enrollment submission under a deadline.
//!
//! A submission attempt validates the draft locally, then races the backend
//! insert against a deadline timer. Both report into an [`OutcomeArbiter`];
//! whichever commits first decides the outcome and the other is ignored. The
//! insert is never aborted, its late result is simply discarded.
//!
//! The attempt is split in two so it fits a message loop:
//!
//! 1. [`SubmissionController::begin`] validates, starts the race on a
//!    detached task and returns a [`PendingSubmission`] future.
//! 2. Once that future yields a [`Resolution`], [`SubmissionController::resolve`]
//!    applies it and emits exactly one notification.
//!
//! [`SubmissionController::submit`] does both for callers that can simply await.
//!
//! The race keeps running if the pending future is dropped. Its outcome is
//! kept with the attempt and applied by [`SubmissionController::reconcile`],
//! which `begin` also calls, so an abandoned attempt never blocks the next.

mod arbiter;
pub mod validate;

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use enroll_model::{Draft, DraftField, EnrollmentRecord, InsertReceipt, StudentId};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::oneshot;

use crate::backend::SharedBackend;
use crate::error::{InsertError, SubmitRejected, TimeoutError, ValidationError};
use crate::notification::{NotificationRelay, SUCCESS_MESSAGE, TIMEOUT_MESSAGE};
use arbiter::OutcomeArbiter;
pub use validate::validate_draft;

/// Default bound on how long an insert may take.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Called once with the receipt when an insert succeeds.
pub type CompletionCallback = Box<dyn FnOnce(&InsertReceipt) + Send>;

/// Lifecycle of the most recent submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
    TimedOut,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_) | Self::TimedOut)
    }
}

/// Which completion source won the race.
#[derive(Debug, Clone, PartialEq)]
pub enum RaceOutcome {
    Inserted(InsertReceipt),
    Rejected(InsertError),
    DeadlineElapsed(TimeoutError),
}

/// Result of a pending submission, tagged with its attempt number.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub attempt: u64,
    pub outcome: RaceOutcome,
}

/// Final outcome of a submit request.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Succeeded(InsertReceipt),
    Failed(InsertError),
    TimedOut(TimeoutError),
    Invalid(ValidationError),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn receipt(&self) -> Option<&InsertReceipt> {
        match self {
            Self::Succeeded(receipt) => Some(receipt),
            _ => None,
        }
    }

    /// The failure as a unified error, if this was not a success.
    pub fn error(&self) -> Option<crate::error::EnrollError> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(err) => Some(err.clone().into()),
            Self::TimedOut(err) => Some(err.clone().into()),
            Self::Invalid(err) => Some(err.clone().into()),
        }
    }
}

/// Future for an in-flight insert raced against its deadline.
///
/// The insert and the timer are already running when this is returned.
/// Dropping it does not cancel them. It is `'static` and does not borrow the
/// controller.
#[must_use = "the outcome is only applied once the submission is resolved"]
pub struct PendingSubmission {
    attempt: u64,
    future: BoxFuture<'static, Resolution>,
}

impl PendingSubmission {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }
}

impl Future for PendingSubmission {
    type Output = Resolution;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}

/// Outcome of a race, written by the race task once a source has won.
type OutcomeSlot = Arc<Mutex<Option<RaceOutcome>>>;

struct InFlight {
    attempt: u64,
    on_success: Option<CompletionCallback>,
    finished: OutcomeSlot,
}

impl InFlight {
    fn take_finished(&self) -> Option<RaceOutcome> {
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Owns the draft and runs submission attempts.
pub struct SubmissionController {
    backend: SharedBackend,
    student_id: StudentId,
    deadline: Duration,
    draft: Draft,
    state: SubmissionState,
    attempts: u64,
    in_flight: Option<InFlight>,
}

impl SubmissionController {
    pub fn new(backend: SharedBackend, student_id: StudentId) -> Self {
        Self {
            backend,
            student_id,
            deadline: DEFAULT_DEADLINE,
            draft: Draft::default(),
            state: SubmissionState::Idle,
            attempts: 0,
            in_flight: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn set_field(&mut self, field: DraftField) {
        self.draft.apply(field);
    }

    /// Clear the draft. The submission state is left alone.
    pub fn reset_draft(&mut self) {
        self.draft = Draft::default();
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    #[inline]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Number of attempts that passed validation.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Start a submission attempt.
    ///
    /// Rejected without side effects while another attempt is in flight. A
    /// draft that fails validation emits an error notification and never
    /// reaches the backend. Must be called within a tokio runtime.
    pub fn begin(
        &mut self,
        on_success: Option<CompletionCallback>,
        relay: &mut NotificationRelay,
    ) -> Result<PendingSubmission, SubmitRejected> {
        self.reconcile(relay);
        if let Some(in_flight) = &self.in_flight {
            tracing::warn!(
                attempt = in_flight.attempt,
                "Submission already in progress, rejecting"
            );
            return Err(SubmitRejected::InFlight);
        }
        if let Err(err) = validate_draft(&self.draft) {
            tracing::info!(error = %err, "Draft failed validation");
            relay.error(err.to_string());
            return Err(SubmitRejected::Invalid(err));
        }

        self.attempts += 1;
        let attempt = self.attempts;
        let record = EnrollmentRecord::from_draft(self.student_id.clone(), &self.draft);
        tracing::info!(attempt, course = %record.name, "Submitting enrollment");

        let finished = OutcomeSlot::default();
        let (sender, receiver) = oneshot::channel();
        let slot = Arc::clone(&finished);
        let race = race_insert(Arc::clone(&self.backend), record, self.deadline, attempt);
        tokio::spawn(async move {
            let outcome = race.await;
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome.clone());
            // The receiver is gone when the pending submission was dropped.
            let _ = sender.send(outcome);
        });

        self.state = SubmissionState::InFlight;
        self.in_flight = Some(InFlight {
            attempt,
            on_success,
            finished,
        });
        let future = receiver.map(move |received| Resolution {
            attempt,
            outcome: received.unwrap_or_else(|_| interrupted()),
        });
        Ok(PendingSubmission {
            attempt,
            future: future.boxed(),
        })
    }

    /// Apply the outcome of an in-flight attempt whose race has finished but
    /// whose [`PendingSubmission`] was never resolved.
    ///
    /// Returns `None` when nothing is in flight or the race is still running.
    pub fn reconcile(&mut self, relay: &mut NotificationRelay) -> Option<SubmitOutcome> {
        let outcome = self.in_flight.as_ref()?.take_finished()?;
        let in_flight = self.in_flight.take()?;
        tracing::debug!(
            attempt = in_flight.attempt,
            "Applying outcome of an abandoned submission"
        );
        Some(self.settle(in_flight, outcome, relay))
    }

    /// Apply the result of a pending submission.
    ///
    /// Returns `None` (and changes nothing) when the resolution does not
    /// belong to the attempt currently in flight.
    pub fn resolve(
        &mut self,
        resolution: Resolution,
        relay: &mut NotificationRelay,
    ) -> Option<SubmitOutcome> {
        let Some(in_flight) = self
            .in_flight
            .take_if(|in_flight| in_flight.attempt == resolution.attempt)
        else {
            tracing::debug!(
                attempt = resolution.attempt,
                "Ignoring resolution for a submission that is no longer in flight"
            );
            return None;
        };
        Some(self.settle(in_flight, resolution.outcome, relay))
    }

    /// Validate, submit and wait for the outcome.
    ///
    /// Only [`SubmitRejected::InFlight`] is returned as an error; validation
    /// failures come back as [`SubmitOutcome::Invalid`].
    pub async fn submit(
        &mut self,
        on_success: Option<CompletionCallback>,
        relay: &mut NotificationRelay,
    ) -> Result<SubmitOutcome, SubmitRejected> {
        let pending = match self.begin(on_success, relay) {
            Ok(pending) => pending,
            Err(SubmitRejected::Invalid(err)) => return Ok(SubmitOutcome::Invalid(err)),
            Err(SubmitRejected::InFlight) => return Err(SubmitRejected::InFlight),
        };
        let resolution = pending.await;
        self.resolve(resolution, relay)
            .ok_or(SubmitRejected::InFlight)
    }

    fn settle(
        &mut self,
        in_flight: InFlight,
        outcome: RaceOutcome,
        relay: &mut NotificationRelay,
    ) -> SubmitOutcome {
        let attempt = in_flight.attempt;
        match outcome {
            RaceOutcome::Inserted(receipt) => {
                tracing::info!(attempt, id = %receipt.id, "Enrollment added");
                self.state = SubmissionState::Succeeded;
                relay.success(SUCCESS_MESSAGE);
                if let Some(on_success) = in_flight.on_success {
                    on_success(&receipt);
                }
                SubmitOutcome::Succeeded(receipt)
            }
            RaceOutcome::Rejected(err) => {
                tracing::warn!(attempt, error = %err, "Enrollment insert failed");
                self.state = SubmissionState::Failed(err.message.clone());
                relay.error(err.message.clone());
                SubmitOutcome::Failed(err)
            }
            RaceOutcome::DeadlineElapsed(err) => {
                tracing::warn!(
                    attempt,
                    deadline_ms = err.after.as_millis() as u64,
                    "Enrollment insert timed out"
                );
                self.state = SubmissionState::TimedOut;
                relay.error(TIMEOUT_MESSAGE);
                SubmitOutcome::TimedOut(err)
            }
        }
    }
}

/// Race the backend insert against the deadline.
///
/// The insert runs on its own task so it can finish after the deadline has
/// won; its result then fails to commit and is dropped.
async fn race_insert(
    backend: SharedBackend,
    record: EnrollmentRecord,
    deadline: Duration,
    attempt: u64,
) -> RaceOutcome {
    let (arbiter, receiver) = OutcomeArbiter::new();

    let insert_arbiter = arbiter.clone();
    tokio::spawn(async move {
        let outcome = match backend.insert_enrollment(record).await {
            Ok(receipt) => RaceOutcome::Inserted(receipt),
            Err(err) => RaceOutcome::Rejected(err),
        };
        if !insert_arbiter.commit(outcome) {
            tracing::debug!(attempt, "Discarding insert result that arrived after the deadline");
        }
    });

    let deadline_arbiter = arbiter.clone();
    let timer = tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        deadline_arbiter.commit(RaceOutcome::DeadlineElapsed(TimeoutError { after: deadline }));
    });

    // Both sources can only be dropped without committing on runtime shutdown.
    let outcome = receiver.await.unwrap_or_else(|_| interrupted());
    timer.abort();
    outcome
}

fn interrupted() -> RaceOutcome {
    RaceOutcome::Rejected(InsertError::new("Submission was interrupted"))
}
