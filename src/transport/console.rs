//! Interactive console loop for a single session.

use crate::rendering::PROMPT;
use crate::{DungeonResult, GameSession};
use std::io::{BufRead, Write};

/// Plays one session over line-oriented input and output.
///
/// Prints the start-up report, then prompts and executes lines until the game ends
/// or the input is exhausted. Rejected commands are printed with the standard
/// rejection prefix and the loop continues.
pub fn run_console<R: BufRead, W: Write>(
    session: &mut GameSession,
    mut input: R,
    output: &mut W,
) -> DungeonResult<()> {
    writeln!(output, "{}", session.start())?;

    let mut line = String::new();
    while session.is_running() {
        write!(output, "\n{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let response = session.execute(line.trim_end_matches(['\r', '\n']))?;
        writeln!(output, "{}", response.text)?;
    }

    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GenerationConfig, MemoryAuditLog, SessionId};
    use std::io::Cursor;
    use std::sync::Arc;

    fn play(script: &str) -> (String, GameSession, Arc<MemoryAuditLog>) {
        let audit = Arc::new(MemoryAuditLog::new());
        let mut session =
            GameSession::new(SessionId::new("1"), &GenerationConfig::new(3), audit.clone())
                .unwrap();
        let mut output = Vec::new();
        run_console(&mut session, Cursor::new(script.to_string()), &mut output).unwrap();
        (String::from_utf8(output).unwrap(), session, audit)
    }

    #[test]
    fn test_console_session_until_end() {
        let (output, session, audit) = play("w.move(3,2)\nfly\nend_game\nyes\nhelp\n");

        assert!(output.contains("Warrior moved to cell (3, 2)."));
        assert!(output.contains("Operation cannot be performed. Unknown command."));
        assert!(output.contains("Are you sure you want to end the game?"));
        assert!(output.trim_end().ends_with("Game over. Your score: -5."));
        assert!(!session.is_running());
        assert_eq!(audit.records().len(), 1);
    }

    #[test]
    fn test_console_stops_at_end_of_input() {
        let (output, session, audit) = play("print_field\n");
        assert_eq!(output.matches(PROMPT).count(), 2);
        assert!(session.is_running());
        assert!(audit.records().is_empty());
    }
}
