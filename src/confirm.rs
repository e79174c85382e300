use crate::diff::render_diff;
use crate::error::{Error, Result};
use crate::record::RecordSet;
use std::io::{self, BufRead, Write};

/// Source of single-line answers to interactive questions.
pub trait Prompt {
    /// Shows `question` and reads one line. `None` on I/O failure or EOF.
    fn ask(&mut self, question: &str) -> Option<String>;
}

/// Reads answers from stdin.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Option<String> {
        print!("{}", question);
        io::stdout().flush().ok()?;

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input),
        }
    }
}

/// True only for an exact `y` after trimming whitespace.
pub fn is_yes(answer: &str) -> bool {
    answer.trim() == "y"
}

/// Asks once. Anything but `y`, including a failed read, declines.
pub fn confirm(prompt: &mut dyn Prompt, question: &str) -> bool {
    prompt
        .ask(question)
        .map(|answer| is_yes(&answer))
        .unwrap_or(false)
}

/// Shows the pending changes and asks before a write to the instance.
/// A declined prompt becomes `ImportCancelled`.
pub fn confirm_import(prompt: &mut dyn Prompt, current: &RecordSet, candidate: &RecordSet) -> Result<()> {
    let diff = render_diff(current, candidate);
    if diff.is_empty() {
        println!("No differences between current and imported {}.", candidate.kind().plural());
    } else {
        println!("{}", diff);
    }

    if confirm(prompt, "Do you want to import the changes (y/n)? ") {
        Ok(())
    } else {
        Err(Error::ImportCancelled)
    }
}
