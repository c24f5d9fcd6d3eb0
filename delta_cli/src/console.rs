//! Terminal operator: stdout for text, stdin for attempts.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use delta_core::Operator;
use tracing::warn;

/// Operator backed by the process's standard streams.
pub struct StdioOperator<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl StdioOperator<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdioOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Operator for StdioOperator<R, W> {
    fn show(&mut self, text: &str) {
        if let Err(err) = writeln!(self.output, "{text}") {
            warn!(%err, "failed to write to terminal");
        }
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        // A prompt that cannot be shown still leaves input readable.
        let _ = write!(self.output, "{prompt}").and_then(|_| self.output.flush());

        // Invalid UTF-8 is an attempt like any other, not the end of input.
        let mut line = Vec::new();
        match self.input.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => Some(
                String::from_utf8_lossy(&line)
                    .trim_end_matches(['\r', '\n'])
                    .to_string(),
            ),
            Err(err) => {
                warn!(%err, "failed to read from terminal");
                None
            }
        }
    }

    fn pause(&mut self, duration: Duration) {
        let _ = self.output.flush();
        thread::sleep(duration);
    }
}
