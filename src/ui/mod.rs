//! Terminal output for the CLI.
//!
//! Commands talk to a [`UserInterface`] rather than to stdout directly so
//! they can be exercised against [`MockUI`] in tests.

pub mod mock;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, Theme};

/// Output sink for command results.
pub trait UserInterface {
    /// Plain output line. Always shown, including in quiet mode.
    fn message(&mut self, msg: &str);

    /// Success status line.
    fn success(&mut self, msg: &str);

    /// Warning status line.
    fn warning(&mut self, msg: &str);

    /// Error line. Always shown.
    fn error(&mut self, msg: &str);

    /// Theme used to style inline fragments of a message.
    fn theme(&self) -> &Theme;
}
