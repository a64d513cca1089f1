//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Messages go to stderr; document content goes to stdout.
pub(crate) struct Output {
    term: Term,
    content: Term,
    green: Style,
    yellow: Style,
    red: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            content: Term::stdout(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            dim: Style::new().dim(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Write document content to stdout as is.
    pub(crate) fn content(&self, text: &str) -> std::io::Result<()> {
        self.content.write_str(text)
    }

    /// Write a line to stdout, green when `enabled` and dimmed otherwise.
    pub(crate) fn toggle_line(&self, line: &str, enabled: bool) -> std::io::Result<()> {
        let style = if enabled { &self.green } else { &self.dim };
        self.content.write_line(&style.apply_to(line).to_string())
    }

    /// Write a plain line to stdout.
    pub(crate) fn line(&self, line: &str) -> std::io::Result<()> {
        self.content.write_line(line)
    }
}
