use std::fmt;

use crate::boundary::BoundaryWarning;
use crate::domain::Version;
use crate::error::PublishFailure;
use crate::release::undo::UndoLog;

/// Steps of a release run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseStep {
    Idle,
    Checking,
    VersioningRelease,
    Committing,
    Tagging,
    Publishing,
    VersioningNext,
    CommittingNext,
    Pushing,
    Done,
    RollingBack,
    Failed,
}

impl ReleaseStep {
    /// Step that follows this one on the success path
    pub fn next(self) -> Option<ReleaseStep> {
        use ReleaseStep::*;
        match self {
            Idle => Some(Checking),
            Checking => Some(VersioningRelease),
            VersioningRelease => Some(Committing),
            Committing => Some(Tagging),
            Tagging => Some(Publishing),
            Publishing => Some(VersioningNext),
            VersioningNext => Some(CommittingNext),
            CommittingNext => Some(Pushing),
            Pushing => Some(Done),
            Done | RollingBack | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ReleaseStep::Done | ReleaseStep::Failed)
    }

    pub fn name(self) -> &'static str {
        match self {
            ReleaseStep::Idle => "Idle",
            ReleaseStep::Checking => "Checking",
            ReleaseStep::VersioningRelease => "VersioningRelease",
            ReleaseStep::Committing => "Committing",
            ReleaseStep::Tagging => "Tagging",
            ReleaseStep::Publishing => "Publishing",
            ReleaseStep::VersioningNext => "VersioningNext",
            ReleaseStep::CommittingNext => "CommittingNext",
            ReleaseStep::Pushing => "Pushing",
            ReleaseStep::Done => "Done",
            ReleaseStep::RollingBack => "RollingBack",
            ReleaseStep::Failed => "Failed",
        }
    }
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State of one release invocation. Lives only as long as the run.
#[derive(Debug)]
pub struct ReleaseRun {
    pub step: ReleaseStep,
    /// Every step entered, in order, starting with `Idle`
    pub history: Vec<ReleaseStep>,
    pub original_version: Option<Version>,
    pub release_version: Option<Version>,
    pub next_version: Option<Version>,
    pub tag_name: Option<String>,
    /// Reversible actions performed so far
    pub completed: UndoLog,
    /// Set when publishing failed but was not fatal
    pub publish_failure: Option<PublishFailure>,
    pub warnings: Vec<BoundaryWarning>,
}

impl Default for ReleaseRun {
    fn default() -> Self {
        ReleaseRun::new()
    }
}

impl ReleaseRun {
    pub fn new() -> Self {
        ReleaseRun {
            step: ReleaseStep::Idle,
            history: vec![ReleaseStep::Idle],
            original_version: None,
            release_version: None,
            next_version: None,
            tag_name: None,
            completed: UndoLog::new(),
            publish_failure: None,
            warnings: Vec::new(),
        }
    }

    /// Move to `step` and append it to the history
    pub fn enter(&mut self, step: ReleaseStep) {
        self.step = step;
        self.history.push(step);
    }

    pub fn visited(&self, step: ReleaseStep) -> bool {
        self.history.contains(&step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_path_order() {
        let mut step = ReleaseStep::Idle;
        let mut path = vec![step];
        while let Some(next) = step.next() {
            path.push(next);
            step = next;
        }
        assert_eq!(
            path,
            vec![
                ReleaseStep::Idle,
                ReleaseStep::Checking,
                ReleaseStep::VersioningRelease,
                ReleaseStep::Committing,
                ReleaseStep::Tagging,
                ReleaseStep::Publishing,
                ReleaseStep::VersioningNext,
                ReleaseStep::CommittingNext,
                ReleaseStep::Pushing,
                ReleaseStep::Done,
            ]
        );
        assert!(step.is_terminal());
    }

    #[test]
    fn test_run_history() {
        let mut run = ReleaseRun::new();
        run.enter(ReleaseStep::Checking);
        run.enter(ReleaseStep::Failed);
        assert_eq!(run.step, ReleaseStep::Failed);
        assert!(run.visited(ReleaseStep::Checking));
        assert!(!run.visited(ReleaseStep::RollingBack));
        assert_eq!(ReleaseStep::VersioningNext.to_string(), "VersioningNext");
    }
}
