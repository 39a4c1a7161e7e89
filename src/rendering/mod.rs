//! # Rendering Module
//!
//! Text produced for the player outside of the game rules: the help screen, response
//! formatting for the console, and log-safe escaping of narrative text.

pub mod ui;

pub use ui::*;

/// Prefix printed before every rejected command.
pub const ERROR_PREFIX: &str = "Operation cannot be performed.";

/// Prompt printed before each console read.
pub const PROMPT: &str = "Enter command: ";

/// Full list of commands shown by `help` and at start-up.
pub fn help_text() -> String {
    [
        "How to play:",
        "Lead your party across the dungeon and defeat the dragon (tag \"b\").",
        "Every executed action costs 5 points at the end of the game.",
        "",
        "Commands:",
        "* help - show this text",
        "* print_field - show the board",
        "* info(<tag>) - describe a character or an enemy, e.g. info(e1)",
        "* info(inv) - show the backpack",
        "* info(<x>,<y>) - describe a cell, e.g. info(3,4)",
        "* <tag>.move(<x>,<y>) - walk to a cell, paying energy per step",
        "* f.fly(<x>,<y>) - the fairy flies to any cell for a fixed energy cost",
        "* <tag>.attack(<enemy tag>) or <tag>.attack(<x>,<y>) - melee attack",
        "* <tag>.shoot(<enemy tag>) or <tag>.shoot(<x>,<y>) - ranged attack",
        "* <tag>.use(health) or <tag>.use(energy) - drink an elixir from the backpack",
        "* repeat - repeat the last action",
        "* end_game - end the game",
        "",
        "Board legend: w, a, m, f - your characters; e<N> - enemies; b - the boss;",
        "t - treasure chest; # - cell guarded by enemies; * - free cell.",
    ]
    .join("\n")
}

/// Escape a string for single-line logging.
///
/// Newlines, carriage returns, tabs and backslashes are escaped; other control
/// characters become `\xNN`. Long strings are cut after 300 characters.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 300;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        for command in [
            "help", "print_field", "info(inv)", "move", "fly", "attack", "shoot", "use", "repeat",
            "end_game",
        ] {
            assert!(help.contains(command), "help is missing {}", command);
        }
    }

    #[test]
    fn test_escape_log_single_line() {
        assert_eq!(escape_log("Line1\nLine2\r\tEnd"), "Line1\\nLine2\\r\\tEnd");
        assert_eq!(escape_log("a\\b"), "a\\\\b");
        assert_eq!(escape_log("\u{7}"), "\\x07");
    }

    #[test]
    fn test_escape_log_truncates() {
        let long = "x".repeat(400);
        let escaped = escape_log(&long);
        assert_eq!(escaped.chars().count(), 301);
        assert!(escaped.ends_with('…'));
    }
}
