//! IG-014: Interactive prompts for values not given on the command line.

use std::io::{BufRead, Write};
use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed before an answer was given")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Print `message`, read one line, and return it without the line ending.
pub fn ask<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    message: &str,
) -> Result<String, PromptError> {
    write!(writer, "{}", message)?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(PromptError::Closed);
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Ask on the terminal.
pub fn ask_stdin(message: &str) -> Result<String, PromptError> {
    let stdin = std::io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = std::io::stdout();
    ask(&mut reader, &mut stdout, message)
}

/// Prompt text for the resource kind, listing the available names.
pub fn kind_prompt(names: &[&str]) -> String {
    format!("Resource type ({}): ", names.join(", "))
}

/// Prompt text for the free-text intent.
pub const INTENT_PROMPT: &str = "What do you want to create? (describe it): ";

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ig014_ask_reads_line() {
        let mut input = Cursor::new("  S3 \r\nignored\n");
        let mut out = Vec::new();
        let answer = ask(&mut input, &mut out, "kind? ").unwrap();
        assert_eq!(answer, "  S3 ");
        assert_eq!(String::from_utf8(out).unwrap(), "kind? ");
    }

    #[test]
    fn test_ig014_ask_eof() {
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        let result = ask(&mut input, &mut out, "kind? ");
        assert!(matches!(result, Err(PromptError::Closed)));
    }

    #[test]
    fn test_ig014_ask_empty_line_is_an_answer() {
        let mut input = Cursor::new("\n");
        let mut out = Vec::new();
        assert_eq!(ask(&mut input, &mut out, "? ").unwrap(), "");
    }

    #[test]
    fn test_ig014_kind_prompt() {
        assert_eq!(
            kind_prompt(&["ec2", "vpc", "s3", "lambda"]),
            "Resource type (ec2, vpc, s3, lambda): "
        );
    }
}
