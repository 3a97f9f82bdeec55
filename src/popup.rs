//! Single-slot popup coordinator: at most one modal dialog job per repository
//! context, and at most one mutating operation in flight.
//!
//! The embedding UI drives this from its own thread: `show` when a dialog
//! opens, `confirm`/`cancel` on user input, and `poll` once per frame to pump
//! a locked job's worker channel. Mutations never run on the calling thread.

use std::any::Any;
use std::path::Path;
use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::{debug, warn};

use crate::git::{GitRepo, MutationOutcome};
use crate::notice::{Notifier, Severity};
use crate::validate::{MessageKey, ValidationContext, ValidationResult};

/// Lifecycle of the active job. An empty slot is the idle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupState {
    /// Dialog is visible and accepting input.
    Shown,
    /// A mutation is in flight; user input is ignored until it finishes.
    Locked,
    /// Finished (completed or cancelled); the slot may be reused.
    Closed,
}

/// What to do when a locked job's mutation fails. With `Always` the dialog
/// closes no matter what and the failure is only visible through the
/// notifier; `KeepOpenOnFailure` unlocks the dialog instead so the user can
/// retry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CloseBehavior {
    #[default]
    Always,
    KeepOpenOnFailure,
}

/// One dialog workflow: a payload of field values bound at construction,
/// validated against a fresh snapshot at confirm time, and dispatched to a
/// worker thread once valid.
pub trait Workflow {
    /// Localization key for the dialog title.
    fn title_key(&self) -> &'static str;

    /// Re-evaluate this workflow's rules against current listings. Called on
    /// every confirm even if per-keystroke validation already ran - the
    /// snapshot may have changed in between.
    fn validate(&self, ctx: &ValidationContext) -> ValidationResult;

    /// Start the mutation on a worker thread and return its outcome channel.
    fn dispatch(&self, workdir: &Path) -> Receiver<MutationOutcome>;

    /// Downcast support so the embedding UI can edit fields while Shown.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The active dialog job. Owns its workflow payload for the job's lifetime;
/// the repository is only ever borrowed at confirm time.
struct PopupJob {
    workflow: Box<dyn Workflow>,
    state: PopupState,
    result: Option<bool>,
    error: Option<MessageKey>,
    receiver: Option<Receiver<MutationOutcome>>,
}

impl PopupJob {
    fn new(workflow: Box<dyn Workflow>) -> Self {
        Self {
            workflow,
            state: PopupState::Shown,
            result: None,
            error: None,
            receiver: None,
        }
    }
}

/// Coordinator owning the single popup slot for one repository context.
#[derive(Default)]
pub struct PopupController {
    job: Option<PopupJob>,
    close_behavior: CloseBehavior,
    on_close: Option<Box<dyn FnMut(bool)>>,
}

impl PopupController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_close_behavior(mut self, behavior: CloseBehavior) -> Self {
        self.close_behavior = behavior;
        self
    }

    /// Register a listener invoked with the success flag whenever a job
    /// closes, so dependent views can refresh from the mutated repository.
    pub fn set_close_listener(&mut self, listener: impl FnMut(bool) + 'static) {
        self.on_close = Some(Box::new(listener));
    }

    /// Whether a non-closed job occupies the slot.
    pub fn is_busy(&self) -> bool {
        self.job
            .as_ref()
            .is_some_and(|job| job.state != PopupState::Closed)
    }

    /// State of the job currently in the slot, if any.
    pub fn state(&self) -> Option<PopupState> {
        self.job.as_ref().map(|job| job.state)
    }

    /// Recorded success flag of the job in the slot (set at close).
    pub fn result(&self) -> Option<bool> {
        self.job.as_ref().and_then(|job| job.result)
    }

    /// Validation failure of the last confirm attempt, for inline display.
    pub fn error(&self) -> Option<MessageKey> {
        self.job.as_ref().and_then(|job| job.error)
    }

    /// Title key of the active dialog.
    pub fn title_key(&self) -> Option<&'static str> {
        self.job.as_ref().map(|job| job.workflow.title_key())
    }

    /// Show a new dialog job. Rejected while another job is Shown or Locked:
    /// at most one active job per context. Returns whether the job was taken.
    pub fn show(&mut self, workflow: Box<dyn Workflow>) -> bool {
        if self.is_busy() {
            warn!(rejected = workflow.title_key(), "popup slot is busy");
            return false;
        }
        debug!(title = workflow.title_key(), "popup shown");
        self.job = Some(PopupJob::new(workflow));
        true
    }

    /// Mutable access to the active workflow's payload for field edits.
    /// Refused while Locked - inputs are disabled during a mutation.
    pub fn workflow_mut<W: Workflow + 'static>(&mut self) -> Option<&mut W> {
        let job = self.job.as_mut()?;
        if job.state != PopupState::Shown {
            return None;
        }
        job.workflow.as_any_mut().downcast_mut::<W>()
    }

    /// Transition Shown -> Locked. Calling this in any other state is a
    /// contract violation of the state machine and panics.
    pub fn lock(&mut self) {
        let job = self
            .job
            .as_mut()
            .expect("lock() called with no active popup job");
        assert!(
            job.state == PopupState::Shown,
            "lock() is only legal from Shown, job is {:?}",
            job.state
        );
        job.state = PopupState::Locked;
        debug!("popup locked");
    }

    /// Close the active job, recording the success flag and releasing the
    /// slot. Safe to call again on an already-closed job (no-op).
    pub fn close(&mut self, success: bool) {
        let Some(job) = self.job.as_mut() else { return };
        if job.state == PopupState::Closed {
            return;
        }
        job.state = PopupState::Closed;
        job.result = Some(success);
        job.receiver = None;
        debug!(success, "popup closed");
        if let Some(listener) = self.on_close.as_mut() {
            listener(success);
        }
    }

    /// Cancel: only meaningful from Shown, where it closes without running
    /// anything. Ignored while Locked (the mutation runs to completion).
    pub fn cancel(&mut self) {
        match self.state() {
            Some(PopupState::Shown) => self.close(false),
            Some(PopupState::Locked) => debug!("cancel ignored while locked"),
            Some(PopupState::Closed) | None => {}
        }
    }

    /// Confirm the active dialog: re-validate against a fresh snapshot, and
    /// if valid, lock the popup and dispatch the mutation to a worker.
    ///
    /// Returns `true` when a mutation was dispatched. On validation failure
    /// the job stays Shown with the message key available via [`error`];
    /// confirm while Locked is a no-op.
    ///
    /// [`error`]: PopupController::error
    pub fn confirm(&mut self, repo: &GitRepo, notifier: &mut Notifier) -> bool {
        {
            let Some(job) = self.job.as_mut() else { return false };
            if job.state != PopupState::Shown {
                return false;
            }

            let ctx = match ValidationContext::from_snapshot(repo) {
                Ok(ctx) => ctx,
                Err(e) => {
                    notifier.push(
                        Severity::Error,
                        format!("Failed to read repository state: {}", e.root_cause()),
                    );
                    return false;
                }
            };

            if let ValidationResult::Invalid(key) = job.workflow.validate(&ctx) {
                debug!(key = key.as_str(), "confirm blocked by validation");
                job.error = Some(key);
                return false;
            }
            job.error = None;
        }

        let Some(workdir) = repo.workdir() else {
            notifier.push(Severity::Error, "Repository has no working directory");
            return false;
        };

        // Lock happens-before dispatch: once locked, no further confirm or
        // cancel can reach this job until the worker finishes.
        self.lock();
        if let Some(job) = self.job.as_mut() {
            job.receiver = Some(job.workflow.dispatch(workdir));
        }
        true
    }

    /// Pump a locked job's worker channel. On completion, pushes a notice
    /// with the outcome and closes (or unlocks, per [`CloseBehavior`]).
    pub fn poll(&mut self, notifier: &mut Notifier) {
        enum Pumped {
            Outcome(MutationOutcome),
            WorkerGone,
        }

        let pumped = {
            let Some(job) = self.job.as_mut() else { return };
            if job.state != PopupState::Locked {
                return;
            }
            let Some(rx) = job.receiver.as_ref() else { return };
            match rx.try_recv() {
                Ok(outcome) => Pumped::Outcome(outcome),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => Pumped::WorkerGone,
            }
        };

        match pumped {
            Pumped::Outcome(outcome) => {
                let success = outcome.result.is_ok();
                match outcome.result {
                    Ok(message) => notifier.push(Severity::Success, message),
                    Err(err) => {
                        notifier.push(Severity::Error, format!("{}: {}", outcome.label, err))
                    }
                }
                if success || self.close_behavior == CloseBehavior::Always {
                    self.close(success);
                } else if let Some(job) = self.job.as_mut() {
                    // Unlock so the user can adjust and retry
                    job.receiver = None;
                    job.state = PopupState::Shown;
                }
            }
            Pumped::WorkerGone => {
                warn!("mutation worker exited without reporting an outcome");
                notifier.push(Severity::Error, "Operation failed unexpectedly");
                self.close(false);
            }
        }
    }
}
