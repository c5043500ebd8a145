//! Unified output formatting utilities for consistent CLI presentation.
//!
//! Standardized formatting for all git-shepherd terminal output: error and
//! status messages plus the colored rendering of sync decisions.
//!
//! # Design Principles
//! - **Consistent color scheme**: Red for stop/error states, yellow for
//!   situations awaiting the user, blue for automatic actions, green for idle
//! - **Standardized spacing**: Newline before and after command output blocks

use crate::core::engine::Decision;
use colored::*;

/// Formats and prints an error message with consistent styling
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a success message with consistent styling
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

/// Formats and prints an informational message with consistent styling
pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Formats and prints a section header with consistent styling
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// One-line colored label for a decision, used by `status` and `watch`.
pub fn format_decision(decision: &Decision) -> String {
    let label = decision.to_string();
    match decision {
        Decision::Idle => label.green().to_string(),
        Decision::AutoPushMain { .. }
        | Decision::AutoSyncBehind(_)
        | Decision::FastForwardAndPush(_) => label.blue().to_string(),
        Decision::MergeCandidate(_) => label.yellow().to_string(),
        Decision::Stop { .. } | Decision::GitError(_) => label.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_helpers_do_not_panic() {
        print_error("Test error message");
        print_success("Operation completed");
        print_info("Information message");
        print_section_header("Repositories");
    }

    #[test]
    fn test_format_decision_contains_label() {
        let rendered = format_decision(&Decision::Idle);
        assert!(rendered.contains("Idle"));

        let rendered = format_decision(&Decision::GitError("remote gone".to_string()));
        assert!(rendered.contains("remote gone"));
    }
}
