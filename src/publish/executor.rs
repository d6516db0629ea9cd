use crate::error::PublishFailure;
use crate::publish::{Artifact, Publisher};
use std::process::Command;

/// Publishes by running shell commands, one per configured task
pub struct CommandPublisher {
    tasks: Vec<String>,
}

impl CommandPublisher {
    pub fn new(tasks: Vec<String>) -> Self {
        CommandPublisher { tasks }
    }

    fn shell(task: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", task]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", task]);
            cmd
        }
    }

    /// Execute a single task with the artifact's environment
    ///
    /// The task runs in the project directory. Exit code 0 is success, any
    /// other status is a failure carrying the captured output.
    ///
    /// # Arguments
    /// * `task` - Shell command line
    /// * `artifact` - Release being published
    pub fn execute(task: &str, artifact: &Artifact) -> Result<(), PublishFailure> {
        log::debug!("Running publish task: {}", task);

        let mut cmd = Self::shell(task);
        cmd.current_dir(&artifact.project_dir);
        for (key, value) in artifact.to_env_vars() {
            cmd.env(key, value);
        }

        let output = cmd
            .output()
            .map_err(|e| PublishFailure::new(task, None, format!("cannot start: {}", e)))?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PublishFailure::new(
                task,
                output.status.code(),
                format!("Stdout: {}\nStderr: {}", stdout.trim(), stderr.trim()),
            ));
        }

        Ok(())
    }
}

impl Publisher for CommandPublisher {
    fn publish(&self, artifact: &Artifact) -> Result<(), PublishFailure> {
        if self.tasks.is_empty() {
            log::info!("No publish tasks configured for {}", artifact.tag);
            return Ok(());
        }

        for task in &self.tasks {
            Self::execute(task, artifact)?;
        }
        Ok(())
    }
}
