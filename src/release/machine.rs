use std::path::PathBuf;

use crate::boundary::BoundaryWarning;
use crate::config::ReleaseConfig;
use crate::domain::{TagTemplate, Version, VersionPolicy};
use crate::error::{ReleaseError, ReleaseFailure, Result, RollbackOutcome};
use crate::guard::check_preconditions;
use crate::lock::RunLock;
use crate::project::VersionFile;
use crate::publish::{Artifact, Publisher};
use crate::release::state::{ReleaseRun, ReleaseStep};
use crate::release::undo::UndoAction;
use crate::vcs::VcsAdapter;

/// Versions given on the command line instead of being derived from the version file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionOverrides {
    pub release: Option<String>,
    pub next: Option<String>,
}

/// Collaborators of one release run
pub struct ReleaseContext<'a> {
    /// Directory holding the version file; publish tasks run here too
    pub project_dir: PathBuf,
    pub vcs: &'a dyn VcsAdapter,
    pub publisher: &'a dyn Publisher,
    pub overrides: VersionOverrides,
}

/// What a run would do, computed without touching anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub project_name: String,
    pub version_file: PathBuf,
    pub current_version: String,
    pub release_version: String,
    pub next_version: String,
    pub tag_name: String,
    pub remote: String,
    pub publish_tasks: Vec<String>,
    /// False when the current version is already a release version
    pub rewrites_release_version: bool,
}

struct Prepared {
    file: VersionFile,
    current: Version,
    release: Version,
    next: Version,
    tag_name: String,
}

/// Drives one release run through its steps:
///
/// `Idle -> Checking -> VersioningRelease -> Committing -> Tagging ->
/// Publishing -> VersioningNext -> CommittingNext -> Pushing -> Done`
///
/// Every mutation records its inverse in the run's undo log as soon as it is
/// acquired. When a step fails the log is replayed newest first
/// (`RollingBack`) and the run ends in `Failed`. Failures before the first
/// mutation go straight to `Failed`.
pub struct ReleaseStateMachine<'a> {
    config: &'a ReleaseConfig,
    ctx: ReleaseContext<'a>,
    policy: VersionPolicy,
    template: TagTemplate,
    run: ReleaseRun,
    prepared: Option<Prepared>,
}

impl<'a> ReleaseStateMachine<'a> {
    pub fn new(config: &'a ReleaseConfig, ctx: ReleaseContext<'a>) -> Self {
        ReleaseStateMachine {
            config,
            policy: config.version_policy(),
            template: config.tag_template(),
            ctx,
            run: ReleaseRun::new(),
            prepared: None,
        }
    }

    /// The run state, for inspection before `run` consumes the machine
    pub fn state(&self) -> &ReleaseRun {
        &self.run
    }

    /// Name substituted for `$name` in the tag template
    pub fn project_name(&self) -> String {
        if let Some(name) = &self.config.project_name {
            return name.clone();
        }
        self.ctx
            .project_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }

    fn version_file_path(&self) -> PathBuf {
        self.ctx.project_dir.join(&self.config.version_property_file)
    }

    /// Compute versions and tag without mutating anything
    pub fn plan(&self) -> Result<ReleasePlan> {
        let prepared = self.prepare()?;
        Ok(ReleasePlan {
            project_name: self.project_name(),
            version_file: prepared.file.path().to_path_buf(),
            current_version: self.policy.render(&prepared.current),
            release_version: self.policy.render(&prepared.release),
            next_version: self.policy.render(&prepared.next),
            rewrites_release_version: prepared.release != prepared.current,
            tag_name: prepared.tag_name,
            remote: self.config.git.push_to_remote.clone(),
            publish_tasks: self.config.publish_tasks.clone(),
        })
    }

    fn prepare(&self) -> Result<Prepared> {
        let file = VersionFile::load(self.version_file_path())?;
        let current = self.policy.parse(&file.version()?)?;

        let release = match &self.ctx.overrides.release {
            Some(raw) => {
                let release = self.policy.parse(raw)?;
                if release.development {
                    return Err(ReleaseError::config(format!(
                        "Release version '{}' must not end with '{}'",
                        raw,
                        self.policy.snapshot_suffix()
                    )));
                }
                release
            }
            None => self.policy.to_release(&current),
        };

        let next = match &self.ctx.overrides.next {
            Some(raw) => self.policy.parse(raw)?.as_development(),
            None => self.policy.to_next_development(&release)?,
        };
        if next <= release {
            return Err(ReleaseError::config(format!(
                "Next version {} must be greater than release version {}",
                self.policy.render(&next),
                self.policy.render(&release)
            )));
        }

        let tag_name = self
            .template
            .render(&self.policy.render(&release), &self.project_name());

        Ok(Prepared {
            file,
            current,
            release,
            next,
            tag_name,
        })
    }

    fn prepared(&self) -> Result<&Prepared> {
        self.prepared
            .as_ref()
            .ok_or_else(|| ReleaseError::version_file("release versions have not been computed"))
    }

    /// Execute the release under the working copy's run lock.
    ///
    /// # Returns
    /// * `Ok(ReleaseRun)` - The run reached `Done`
    /// * `Err(ReleaseFailure)` - The run ended in `Failed`; carries the failed
    ///   step, its cause and what the rollback did
    pub fn run(mut self) -> std::result::Result<ReleaseRun, ReleaseFailure> {
        let _lock = match self.ctx.vcs.run_lock_path().map(RunLock::acquire) {
            Some(Err(cause)) => return Err(self.fail(cause)),
            held => held,
        };

        match self.execute() {
            Ok(()) => {
                self.run.completed.disarm();
                self.run.enter(ReleaseStep::Done);
                log::info!(
                    "Release {} done",
                    self.run.tag_name.as_deref().unwrap_or_default()
                );
                Ok(self.run)
            }
            Err(cause) => Err(self.fail(cause)),
        }
    }

    fn execute(&mut self) -> Result<()> {
        while let Some(step) = self.run.step.next() {
            if step == ReleaseStep::Done {
                break;
            }
            self.run.enter(step);
            log::info!("Release step: {}", step);
            self.perform(step)?;
        }
        Ok(())
    }

    fn perform(&mut self, step: ReleaseStep) -> Result<()> {
        match step {
            ReleaseStep::Checking => self.check(),
            ReleaseStep::VersioningRelease => self.write_release_version(),
            ReleaseStep::Committing => self.commit_release(),
            ReleaseStep::Tagging => self.create_tag(),
            ReleaseStep::Publishing => self.publish(),
            ReleaseStep::VersioningNext => self.write_next_version(),
            ReleaseStep::CommittingNext => self.commit_next(),
            ReleaseStep::Pushing => self.push(),
            ReleaseStep::Idle
            | ReleaseStep::Done
            | ReleaseStep::RollingBack
            | ReleaseStep::Failed => Ok(()),
        }
    }

    fn check(&mut self) -> Result<()> {
        if !self.template.has_version_placeholder() {
            self.warn(BoundaryWarning::TagTemplateWithoutVersion {
                template: self.config.tag_template.clone(),
            });
        }

        if self.config.needs_remote_state() {
            if let Err(e) = self.ctx.vcs.refresh_remote() {
                self.warn(BoundaryWarning::RemoteRefreshFailed {
                    remote: self.config.git.push_to_remote.clone(),
                    cause: e.to_string(),
                });
            }
        }

        let status = self.ctx.vcs.status()?;
        check_preconditions(&status, self.config)?;
        Ok(())
    }

    fn write_release_version(&mut self) -> Result<()> {
        let mut prepared = self.prepare()?;
        self.run.original_version = Some(prepared.current.clone());
        self.run.release_version = Some(prepared.release.clone());
        self.run.next_version = Some(prepared.next.clone());
        self.run.tag_name = Some(prepared.tag_name.clone());

        if prepared.release == prepared.current {
            self.warn(BoundaryWarning::VersionUnchanged {
                version: self.policy.render(&prepared.current),
            });
        } else {
            let rendered = self.policy.render(&prepared.release);
            log::info!("Setting release version {}", rendered);
            write_recorded(&mut self.run, &mut prepared.file, &rendered, &self.config.version_properties)?;
        }

        self.prepared = Some(prepared);
        Ok(())
    }

    fn commit_release(&mut self) -> Result<()> {
        let prepared = self.prepared()?;
        if prepared.release == prepared.current {
            log::info!("Version file unchanged, no release commit");
            return Ok(());
        }

        let message = self
            .config
            .commit_message(&self.config.pre_tag_commit_message, &prepared.tag_name);
        let path = prepared.file.path().to_path_buf();
        self.commit_recorded(&message, path)
    }

    fn create_tag(&mut self) -> Result<()> {
        let name = self.prepared()?.tag_name.clone();
        let message = self
            .config
            .commit_message(&self.config.tag_commit_message, &name);

        self.ctx.vcs.tag(&name, &message)?;
        self.run.completed.record(UndoAction::DeleteTag { name });
        Ok(())
    }

    fn publish(&mut self) -> Result<()> {
        let prepared = self.prepared()?;
        let artifact = Artifact {
            project: self.project_name(),
            version: self.policy.render(&prepared.release),
            tag: prepared.tag_name.clone(),
            next_version: self.policy.render(&prepared.next),
            project_dir: self.ctx.project_dir.clone(),
        };

        match self.ctx.publisher.publish(&artifact) {
            Ok(()) => Ok(()),
            Err(failure) if !self.config.fail_on_publish_needed => {
                self.warn(BoundaryWarning::PublishFailedNonFatal {
                    tag: artifact.tag,
                    cause: failure.to_string(),
                });
                self.run.publish_failure = Some(failure);
                Ok(())
            }
            Err(failure) => Err(failure.into()),
        }
    }

    fn write_next_version(&mut self) -> Result<()> {
        let mut prepared = self.prepared.take().ok_or_else(|| {
            ReleaseError::version_file("release versions have not been computed")
        })?;
        let rendered = self.policy.render(&prepared.next);
        log::info!("Setting next development version {}", rendered);

        let result = write_recorded(
            &mut self.run,
            &mut prepared.file,
            &rendered,
            &self.config.version_properties,
        );
        self.prepared = Some(prepared);
        result
    }

    fn commit_next(&mut self) -> Result<()> {
        let prepared = self.prepared()?;
        let message = self.config.commit_message(
            &self.config.new_version_commit_message,
            &self.policy.render(&prepared.next),
        );
        let path = prepared.file.path().to_path_buf();
        self.commit_recorded(&message, path)
    }

    fn push(&mut self) -> Result<()> {
        let tag = self.prepared()?.tag_name.clone();
        log::info!("Pushing to {}", self.config.git.push_to_remote);
        self.ctx.vcs.push(&[tag])
    }

    fn commit_recorded(&mut self, message: &str, path: PathBuf) -> Result<()> {
        let id = self.ctx.vcs.commit(message, &[path])?;
        self.run.completed.record(UndoAction::RevertCommit { id });
        Ok(())
    }

    fn warn(&mut self, warning: BoundaryWarning) {
        log::warn!("{}", warning);
        self.run.warnings.push(warning);
    }

    fn fail(mut self, cause: ReleaseError) -> ReleaseFailure {
        let step = self.run.step;
        log::warn!("Step {} failed: {}", step, cause);

        let rollback = if self.run.completed.is_empty() {
            RollbackOutcome::NotNeeded
        } else if let ReleaseError::PartialPush { pushed, .. } = &cause {
            // Resetting commits the remote already has would fork the branch.
            RollbackOutcome::RemoteAhead {
                pushed: pushed.clone(),
                pending: self.run.completed.actions().iter().rev().cloned().collect(),
            }
        } else if !self.config.revert_on_fail {
            RollbackOutcome::Skipped {
                pending: self.run.completed.actions().iter().rev().cloned().collect(),
            }
        } else {
            self.run.enter(ReleaseStep::RollingBack);
            match self.run.completed.rollback(self.ctx.vcs) {
                Ok(undone) => RollbackOutcome::Completed { undone },
                Err((error, pending)) => RollbackOutcome::Failed { error, pending },
            }
        };

        self.run.enter(ReleaseStep::Failed);
        ReleaseFailure {
            step,
            cause,
            rollback,
            run: self.run,
        }
    }
}

/// Record the restore action, then rewrite the version file
fn write_recorded(
    run: &mut ReleaseRun,
    file: &mut VersionFile,
    version: &str,
    extra_keys: &[String],
) -> Result<()> {
    run.completed.record(UndoAction::RestoreVersionFile {
        path: file.path().to_path_buf(),
        contents: file.contents().to_string(),
    });
    file.write_version(version, extra_keys)
}

