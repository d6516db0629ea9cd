//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, BufRead, Write};

use anyhow::Result;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_error, display_plan, display_release_summary,
    display_status, display_success,
};

fn read_answer(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Accepts "y" or "yes" (case-insensitive) as confirmation.
/// Default is "no" if user presses Enter.
///
/// # Arguments
/// * `prompt` - The prompt message to display (without the "(y/N): " suffix)
///
/// # Returns
/// * `Ok(true)` - If user entered "y" or "yes"
/// * `Ok(false)` - Otherwise (including Enter, or "n"/"no")
/// * `Err` - If input error occurs
pub fn confirm_action(prompt: &str) -> Result<bool> {
    print!("\n{} (y/N): ", prompt);
    io::stdout().flush()?;
    let answer = read_answer(&mut io::stdin().lock())?;
    Ok(parse_confirmation(&answer))
}

fn parse_confirmation(answer: &str) -> bool {
    let answer = answer.to_lowercase();
    answer == "y" || answer == "yes"
}

/// Prompts for a version, offering the computed one as default.
///
/// # Arguments
/// * `label` - What is being asked for ("Release version")
/// * `default` - Returned when the user just presses Enter
///
/// # Returns
/// * `Ok(String)` - The default or the version typed by the user
/// * `Err` - If input error occurs
pub fn prompt_version(label: &str, default: &str) -> Result<String> {
    print!("{} [{}]: ", label, default);
    io::stdout().flush()?;
    let answer = read_answer(&mut io::stdin().lock())?;
    Ok(choose_version(&answer, default))
}

fn choose_version(answer: &str, default: &str) -> String {
    if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    }
}
