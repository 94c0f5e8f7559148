//! Prompt-driven normalize loop.
//!
//! ```text
//! Process an image? (yes/no): y
//! Image path: /photos/goat.jpg
//! goat.jpg → goat.bmp
//!     ...
//! Process an image? (yes/no): no
//! Normalized 1 image, 0 failed
//! ```
//!
//! `yes` or `y` (any case, surrounding whitespace ignored) asks for a path.
//! Any other answer, or end of input, ends the session. A failed image is
//! reported and the loop carries on.

use crate::imaging::{ImageBackend, NormalizeConfig, normalize};
use crate::output::{format_error, format_normalize_report, format_session_summary};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::debug;

const CONFIRM_PROMPT: &str = "Process an image? (yes/no): ";
const PATH_PROMPT: &str = "Image path: ";

/// Per-session tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub succeeded: usize,
    pub failed: usize,
}

fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("yes") || answer.eq_ignore_ascii_case("y")
}

/// Print `prompt` and read one line. `None` at end of input.
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> io::Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Run the prompt loop until the user declines or input runs out.
///
/// Only I/O errors on `input`/`out` end the session early; image errors are
/// written to `out` and counted.
pub fn run_session<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    backend: &impl ImageBackend,
    config: &NormalizeConfig,
) -> io::Result<SessionSummary> {
    let mut summary = SessionSummary::default();

    loop {
        let Some(answer) = ask(input, out, CONFIRM_PROMPT)? else {
            writeln!(out)?;
            break;
        };
        if !is_affirmative(&answer) {
            debug!(answer = answer.trim(), "Session ended");
            break;
        }
        let Some(path) = ask(input, out, PATH_PROMPT)? else {
            writeln!(out)?;
            break;
        };
        let path = Path::new(path.trim());

        match normalize(backend, path, config) {
            Ok(report) => {
                summary.succeeded += 1;
                write_lines(out, &format_normalize_report(&report))?;
            }
            Err(e) => {
                summary.failed += 1;
                debug!(path = %path.display(), error = %e, "Normalize failed");
                write_lines(out, &format_error(&e))?;
            }
        }
    }

    write_lines(out, &format_session_summary(&summary))?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use std::io::Cursor;

    fn run(script: &str, backend: &MockBackend) -> (SessionSummary, String) {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        let summary = run_session(&mut input, &mut out, backend, &NormalizeConfig::default()).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn affirmative_answers() {
        for answer in ["yes", "y", "YES", "Y", "  yes\n", "Yes\r\n"] {
            assert!(is_affirmative(answer), "{answer:?}");
        }
        for answer in ["no", "n", "", "yess", "sure", "ye"] {
            assert!(!is_affirmative(answer), "{answer:?}");
        }
    }

    #[test]
    fn no_ends_immediately() {
        let backend = MockBackend::new();
        let (summary, out) = run("no\n", &backend);
        assert_eq!(summary, SessionSummary::default());
        assert!(out.starts_with(CONFIRM_PROMPT));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn processes_paths_until_declined() {
        let backend = MockBackend::new();
        let (summary, out) = run("y\n/in/a.jpg\nYES\n  /in/b.png  \nnope\n", &backend);

        assert_eq!(summary.succeeded, 2);
        assert_eq!(out.matches(PATH_PROMPT).count(), 2);
        assert!(out.contains("a.jpg → a.bmp"));
        assert!(out.contains("b.png → b.bmp"));
        assert!(out.ends_with("Normalized 2 images, 0 failed\n"));

        let sources: Vec<_> = backend
            .get_operations()
            .into_iter()
            .map(|op| match op {
                RecordedOp::Normalize { source, target, .. } => {
                    assert_eq!(target, (900, 900));
                    source
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(sources, vec!["/in/a.jpg", "/in/b.png"]);
    }

    #[test]
    fn errors_do_not_end_the_loop() {
        let backend = MockBackend::failing_normalize();
        let (summary, out) = run("y\nbad.jpg\ny\nworse.jpg\nn\n", &backend);

        assert_eq!(
            summary,
            SessionSummary {
                succeeded: 0,
                failed: 2
            }
        );
        assert_eq!(out.matches("Error: Failed to decode").count(), 2);
        assert_eq!(out.matches(CONFIRM_PROMPT).count(), 3);
    }

    #[test]
    fn eof_ends_session() {
        let backend = MockBackend::new();
        let (summary, _) = run("", &backend);
        assert_eq!(summary, SessionSummary::default());

        let (summary, _) = run("y\n", &backend);
        assert_eq!(summary, SessionSummary::default());
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn answer_without_trailing_newline_counts() {
        let backend = MockBackend::new();
        let (summary, _) = run("y\n/in/last.gif", &backend);
        assert_eq!(summary.succeeded, 1);
    }
}
