//! The release state machine
//!
//! - `state` - steps and the per-run state
//! - `undo` - compensating actions and the undo log replayed on failure
//! - `machine` - drives a run from `Idle` to `Done` or `Failed`

pub mod machine;
pub mod state;
pub mod undo;

pub use machine::{ReleaseContext, ReleasePlan, ReleaseStateMachine, VersionOverrides};
pub use state::{ReleaseRun, ReleaseStep};
pub use undo::{UndoAction, UndoLog};
