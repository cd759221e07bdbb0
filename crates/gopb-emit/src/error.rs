//! Error types for the emitters.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

/// Errors that can occur while rendering generated text.
#[derive(Debug)]
pub struct EmitError {
    kind: EmitErrorKind,
    backtrace: Backtrace,
}

#[derive(Debug)]
enum EmitErrorKind {
    /// A template failed to render.
    Render(askama::Error),
}

impl EmitError {
    pub(crate) fn render(err: askama::Error) -> Self {
        Self {
            kind: EmitErrorKind::Render(err),
            backtrace: Backtrace::capture(),
        }
    }

    /// Returns true if a template failed to render.
    pub fn is_render(&self) -> bool {
        matches!(self.kind, EmitErrorKind::Render(_))
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EmitErrorKind::Render(e) => {
                write!(f, "failed to render template: {e}")?;
            }
        }
        if self.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\n{}", self.backtrace)?;
        }
        Ok(())
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            EmitErrorKind::Render(e) => Some(e),
        }
    }
}
