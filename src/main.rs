use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use git_release::cli::{run_release_workflow, ReleaseWorkflowArgs, WorkflowOutcome};
use git_release::error::ReleaseFailure;
use git_release::ui;

#[derive(clap::Parser)]
#[command(
    name = "git-release",
    version,
    about = "Release a project: tag the release version, publish it and move on to the next development version"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Project directory (defaults to the current directory)")]
    dir: Option<PathBuf>,

    #[arg(long, help = "Release this version instead of the derived one")]
    release_version: Option<String>,

    #[arg(long, help = "Continue development with this version")]
    next_version: Option<String>,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(short, long, help = "Confirm versions interactively before releasing")]
    interactive: bool,

    #[arg(short, long, help = "Log every release step")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let workflow_args = ReleaseWorkflowArgs {
        config_path: args.config,
        project_dir: args.dir,
        release_version: args.release_version,
        next_version: args.next_version,
        dry_run: args.dry_run,
        interactive: args.interactive,
    };

    match run_release_workflow(workflow_args) {
        Ok(WorkflowOutcome::Released(result)) => {
            for warning in &result.warnings {
                ui::display_boundary_warning(warning);
            }
            ui::display_release_summary(&result.tag, &result.next_version, &result.remote);
            ExitCode::SUCCESS
        }
        Ok(WorkflowOutcome::Previewed(_)) => {
            ui::display_status("Dry run: nothing was changed");
            ExitCode::SUCCESS
        }
        Ok(WorkflowOutcome::Cancelled) => {
            println!("Release cancelled by user.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.downcast_ref::<ReleaseFailure>() {
                Some(failure) => {
                    for warning in &failure.run.warnings {
                        ui::display_boundary_warning(warning);
                    }
                    ui::display_error(&failure.to_string());
                }
                None => ui::display_error(&format!("{:#}", err)),
            }
            ExitCode::FAILURE
        }
    }
}
