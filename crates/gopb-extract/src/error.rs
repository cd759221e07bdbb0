//! Error types for the gopb-extract crate.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::path::{Path, PathBuf};

use gopb_syntax::ParseError;

/// Error type for model resolution.
///
/// Only two things can go wrong: the input cannot be read, or it is not
/// valid Go. Unresolvable type references and selectors that match nothing
/// are not errors; they are logged and resolution continues.
#[derive(Debug)]
pub struct ExtractError {
    kind: ExtractErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods
/// instead.
#[derive(Debug)]
pub(crate) enum ExtractErrorKind {
    /// The Go source file could not be read.
    InputUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The Go source is syntactically invalid.
    Parse {
        path: Option<PathBuf>,
        source: ParseError,
    },
}

impl ExtractError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: ExtractErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    pub(crate) fn input_unreadable(
        path: &Path,
        source: std::io::Error,
    ) -> Self {
        Self::new(ExtractErrorKind::InputUnreadable {
            path: path.to_owned(),
            source,
        })
    }

    /// Attaches the file the source was read from to a parse error.
    #[must_use]
    pub(crate) fn in_file(mut self, file: &Path) -> Self {
        if let ExtractErrorKind::Parse { path, .. } = &mut self.kind {
            *path = Some(file.to_owned());
        }
        self
    }

    /// Returns true if the input file could not be read.
    pub fn is_input_unreadable(&self) -> bool {
        matches!(self.kind, ExtractErrorKind::InputUnreadable { .. })
    }

    /// Returns true if the input failed to parse.
    pub fn is_parse(&self) -> bool {
        matches!(self.kind, ExtractErrorKind::Parse { .. })
    }

    /// Returns the parser diagnostic, if this is a parse error.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match &self.kind {
            ExtractErrorKind::Parse { source, .. } => Some(source),
            ExtractErrorKind::InputUnreadable { .. } => None,
        }
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for ExtractErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractErrorKind::InputUnreadable { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ExtractErrorKind::Parse {
                path: Some(path),
                source,
            } => write!(f, "failed to parse {}:{source}", path.display()),
            ExtractErrorKind::Parse { path: None, source } => {
                write!(f, "failed to parse source: {source}")
            }
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        // Only present when RUST_BACKTRACE is set.
        if self.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\n{}", self.backtrace)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ExtractErrorKind::InputUnreadable { source, .. } => Some(source),
            ExtractErrorKind::Parse { source, .. } => Some(source),
        }
    }
}

impl From<ParseError> for ExtractError {
    fn from(err: ParseError) -> Self {
        Self::new(ExtractErrorKind::Parse {
            path: None,
            source: err,
        })
    }
}
