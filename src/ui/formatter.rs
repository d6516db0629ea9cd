//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::release::ReleasePlan;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Render the release plan as indented lines
pub fn format_plan(plan: &ReleasePlan) -> Vec<String> {
    let mut lines = vec![
        format!("Project:         {}", plan.project_name),
        format!("Version file:    {}", plan.version_file.display()),
        format!("Current version: {}", plan.current_version),
        format!("Release version: {}", plan.release_version),
        format!("Tag:             {}", plan.tag_name),
        format!("Next version:    {}", plan.next_version),
        format!("Push to:         {}", plan.remote),
    ];

    if plan.publish_tasks.is_empty() {
        lines.push("Publish tasks:   (none)".to_string());
    } else {
        lines.push("Publish tasks:".to_string());
        for (i, task) in plan.publish_tasks.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, task));
        }
    }
    lines
}

/// Display what a release run is going to do.
pub fn display_plan(plan: &ReleasePlan) {
    println!("\n{}", style("Release plan:").bold());
    for line in format_plan(plan) {
        println!("  {}", line);
    }
    if !plan.rewrites_release_version {
        println!(
            "  {}",
            style("(version file already holds the release version)").dim()
        );
    }
}

/// Display the outcome of a finished release.
///
/// # Arguments
/// * `tag` - The tag that was created and pushed
/// * `next_version` - Version the working copy now holds
/// * `remote` - The remote that received branch and tag
pub fn display_release_summary(tag: &str, next_version: &str, remote: &str) {
    println!(
        "\n{} Released {} and pushed to {}",
        style("✓").green(),
        style(tag).green().bold(),
        remote
    );
    println!("  Working copy is now at {}\n", style(next_version).cyan());
}
