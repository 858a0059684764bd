//! Confirmation prompts for destructive operations

use std::io::{self, BufRead, Write};

/// Asks the user to confirm an action
///
/// Only consulted when private module directories would be deleted.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

/// Interactive y/N prompt on stdin
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }

        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Fixed answer, for `--yes` flags and tests
#[derive(Debug, Clone, Copy)]
pub struct PresetConfirm(pub bool);

impl Confirm for PresetConfirm {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}
