//! Terminal UI on stdout/stderr.

use console::Term;
use std::io::Write;

use super::{should_use_colors, Theme, UserInterface};

/// Writes command output to the terminal.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: Theme,
    quiet: bool,
}

impl TerminalUI {
    /// Create a terminal UI. In quiet mode status lines are suppressed and
    /// only plain output and errors are written.
    pub fn new(quiet: bool) -> Self {
        let theme = if should_use_colors() {
            Theme::new()
        } else {
            Theme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            quiet,
        }
    }
}

impl UserInterface for TerminalUI {
    fn message(&mut self, msg: &str) {
        writeln!(self.out, "{}", msg).ok();
    }

    fn success(&mut self, msg: &str) {
        if !self.quiet {
            writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if !self.quiet {
            writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn theme(&self) -> &Theme {
        &self.theme
    }
}
