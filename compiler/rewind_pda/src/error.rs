//! Error types.
//!
//! A grammar rejecting its input is not a Rust error: it is reported through
//! [`ParseOutcome::Failed`](crate::ParseOutcome::Failed) carrying a
//! [`ParseFailure`]. [`PdaError`] is reserved for misuse of the API.

use std::fmt;

use rewind_tables::ParserId;
use thiserror::Error;

use crate::run::{Entry, Operation, Suspend};
use crate::tree::Location;

/// API misuse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PdaError {
    #[error("parser entry {0} is not declared in the tables")]
    UnknownParser(ParserId),

    #[error("resumed with {found:?} while the context is suspended at {expected:?}")]
    ResumeMismatch {
        expected: Option<Suspend>,
        found: Entry,
    },

    #[error("`{called}` called while `{suspended}` is suspended")]
    WrongOperation {
        suspended: Operation,
        called: Operation,
    },

    #[error("parse context has been cleared")]
    Cleared,
}

/// Permanent parse failure.
///
/// The location is best effort: the end of the deepest token the engine
/// backtracked from, or the start of input if it never got that far.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseFailure {
    pub location: Location,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at {}:{}",
            self.location.line, self.location.column
        )
    }
}
