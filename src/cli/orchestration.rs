//! Main workflow orchestration logic
//!
//! Keeps CLI argument parsing in main.rs and the release workflow here, so
//! the workflow can be driven programmatically without clap.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::boundary::BoundaryWarning;
use crate::config::{load_config, ReleaseConfig};
use crate::domain::Version;
use crate::error::PublishFailure;
use crate::guard::check_preconditions;
use crate::publish::{CommandPublisher, Publisher};
use crate::release::{ReleaseContext, ReleasePlan, ReleaseStateMachine, VersionOverrides};
use crate::ui;
use crate::vcs::{Git2Vcs, VcsAdapter};

/// Arguments for the release workflow
///
/// Mirrors the CLI Args in a format suitable for orchestration logic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<PathBuf>,

    /// Project directory; the current directory when unset
    pub project_dir: Option<PathBuf>,

    /// Release this version instead of the one derived from the version file
    pub release_version: Option<String>,

    /// Continue development with this version
    pub next_version: Option<String>,

    /// Preview mode - show the plan and gate results, change nothing
    pub dry_run: bool,

    /// Ask for the versions and confirmation before releasing
    pub interactive: bool,
}

/// Result of a completed release
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// The tag that was created
    pub tag: String,

    pub release_version: String,

    pub next_version: String,

    /// Remote that received the branch and tag
    pub remote: String,

    /// Publish failure tolerated because `failOnPublishNeeded` is off
    pub publish_failure: Option<PublishFailure>,

    pub warnings: Vec<BoundaryWarning>,
}

/// How the workflow ended when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    Released(WorkflowResult),
    /// Dry run: the plan that would have been executed
    Previewed(ReleasePlan),
    /// The user declined the interactive confirmation
    Cancelled,
}

/// Main release workflow
///
/// 1. Load configuration for the project directory
/// 2. Open the enclosing git repository
/// 3. Preview, prompt, or run the release state machine; the run itself
///    holds the per-working-copy lock
///
/// # Returns
///
/// The outcome, or an error. A failed release run surfaces as a
/// [ReleaseFailure](crate::error::ReleaseFailure) inside the error.
pub fn run_release_workflow(args: ReleaseWorkflowArgs) -> Result<WorkflowOutcome> {
    let project_dir = resolve_project_dir(args.project_dir.as_deref().unwrap_or(Path::new(".")))?;
    let config = load_config(args.config_path.as_deref(), &project_dir)
        .context("Failed to load release configuration")?;

    let vcs = Git2Vcs::open(&project_dir, config.git.push_to_remote.clone())?;
    let publisher = CommandPublisher::new(config.publish_tasks.clone());
    let mut overrides = VersionOverrides {
        release: args.release_version.clone(),
        next: args.next_version.clone(),
    };

    let vcs_ref: &dyn VcsAdapter = &vcs;
    let publisher_ref: &dyn Publisher = &publisher;
    let dir = project_dir.clone();
    let context = move |overrides: VersionOverrides| ReleaseContext {
        project_dir: dir.clone(),
        vcs: vcs_ref,
        publisher: publisher_ref,
        overrides,
    };

    if args.dry_run {
        let plan = ReleaseStateMachine::new(&config, context(overrides)).plan()?;
        ui::display_plan(&plan);
        preview_gates(&vcs, &config)?;
        return Ok(WorkflowOutcome::Previewed(plan));
    }

    if args.interactive {
        let plan = ReleaseStateMachine::new(&config, context(overrides.clone())).plan()?;
        ui::display_plan(&plan);

        overrides = prompt_overrides(&config, &plan)?;
        let plan = ReleaseStateMachine::new(&config, context(overrides.clone())).plan()?;
        if !ui::confirm_action(&format!(
            "Release {} as {}, then continue with {}?",
            plan.release_version, plan.tag_name, plan.next_version
        ))? {
            return Ok(WorkflowOutcome::Cancelled);
        }
    }

    ui::display_status("Releasing...");
    let run = ReleaseStateMachine::new(&config, context(overrides)).run()?;

    let policy = config.version_policy();
    let render = |v: Option<&Version>| v.map(|v| policy.render(v)).unwrap_or_default();
    Ok(WorkflowOutcome::Released(WorkflowResult {
        tag: run.tag_name.clone().unwrap_or_default(),
        release_version: render(run.release_version.as_ref()),
        next_version: render(run.next_version.as_ref()),
        remote: config.git.push_to_remote.clone(),
        publish_failure: run.publish_failure,
        warnings: run.warnings,
    }))
}

fn resolve_project_dir(dir: &Path) -> Result<PathBuf> {
    dir.canonicalize()
        .with_context(|| format!("Project directory {} is not accessible", dir.display()))
}

/// Report gate results without failing the dry run
fn preview_gates(vcs: &dyn VcsAdapter, config: &ReleaseConfig) -> Result<()> {
    let status = vcs.status()?;
    match check_preconditions(&status, config) {
        Ok(()) => ui::display_success("All release preconditions hold"),
        Err(gate) => ui::display_error(&format!("A real run would stop: {}", gate)),
    }
    Ok(())
}

fn prompt_overrides(config: &ReleaseConfig, plan: &ReleasePlan) -> Result<VersionOverrides> {
    let policy = config.version_policy();

    let release = ui::prompt_version("\nRelease version", &plan.release_version)?;
    let default_next = if release == plan.release_version {
        plan.next_version.clone()
    } else {
        let parsed = policy.parse(&release)?;
        policy.render(&policy.to_next_development(&parsed)?)
    };
    let next = ui::prompt_version("Next development version", &default_next)?;

    Ok(VersionOverrides {
        release: Some(release),
        next: Some(next),
    })
}
