//! # User Interface Elements
//!
//! Formatting of command outcomes for text transports.

use super::ERROR_PREFIX;
use crate::RuleViolation;

/// Message shown when a command is rejected by the rules.
///
/// # Examples
///
/// ```
/// use console_dungeon::rendering::format_rejection;
/// use console_dungeon::RuleViolation;
///
/// let violation = RuleViolation::NoHistory("There is no action to repeat yet.".to_string());
/// assert_eq!(
///     format_rejection(&violation),
///     "Operation cannot be performed. There is no action to repeat yet."
/// );
/// ```
pub fn format_rejection(violation: &RuleViolation) -> String {
    format!("{} {}", ERROR_PREFIX, violation)
}
