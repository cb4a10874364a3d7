//! Run-level error taxonomy. Domain errors fail fast at the call site;
//! errors escaping a step abort the whole run with no partial recovery.

use thiserror::Error;

use crate::model::Pos;
use crate::random::RandomError;
use crate::schedule::ScheduleError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenError {
    #[error("context was already seeded; a run seeds exactly once")]
    AlreadySeeded,
    #[error(transparent)]
    Random(#[from] RandomError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("placement refused at {pos:?}")]
    PlacementRefused { pos: Pos },
    #[error("step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },
}
