//! Backtracking, resumable PDA parser runtime.
//!
//! Given grammar [`Tables`](rewind_tables::Tables) and a [`TokenSource`],
//! a [`PdaRun`] builds a parse tree with full backtracking: over parser
//! actions, over lexical regions, and over host semantic actions that
//! recorded reverse code.
//!
//! # Architecture
//!
//! - [`arena`]: generational block arena for parse-stack nodes
//! - [`tree`]: reference-counted payload trees handed to the host
//! - [`input`], [`lexer`], [`source`]: buffered input and token acquisition
//! - [`reverse`]: the reverse-code buffer
//! - [`PdaRun`]: shift/reduce/commit, backtracking and the resumable loop
//! - [`Host`]: optional callback-style driver for semantic actions
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rewind_pda::{EngineConfig, Entry, LiteralLexer, ParseOutcome, PdaRun, StreamSource};
//! use rewind_tables::{Action, TablesBuilder, Transition};
//!
//! let mut b = TablesBuilder::new();
//! let num = b.terminal("num");
//! let eof = b.terminal("_eof");
//! let expr = b.non_terminal("expr");
//! let p = b.production("expr -> num", expr, 1);
//! let main = b.region("main");
//! let (s0, s1, s2) = (b.state(), b.state(), b.state());
//! b.state_regions(s0, &[main]).unwrap();
//! b.state_regions(s1, &[main]).unwrap();
//! b.transition(s0, num, Transition::new(s0, &[Action::ShiftReduce(p)])).unwrap();
//! b.transition(s0, expr, Transition::shift(s1)).unwrap();
//! b.transition(s1, eof, Transition::shift(s2)).unwrap();
//! let parser = b.parser(s0, eof);
//! let tables = Arc::new(b.build().unwrap());
//!
//! let lexer = LiteralLexer::new().repeat(main, |c| c.is_ascii_digit(), num);
//! let mut input = StreamSource::from_text(lexer, "42");
//! let mut pda = PdaRun::new(tables, parser, EngineConfig::new()).unwrap();
//! pda.finish(&mut input, Entry::Start).unwrap();
//!
//! match pda.outcome() {
//!     ParseOutcome::Tree(tree) => assert_eq!(tree.to_text(), "42"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

pub mod arena;
mod config;
mod error;
mod host;
pub mod input;
pub mod lexer;
pub mod reverse;
mod run;
pub mod source;
mod stack;
pub mod tree;

#[cfg(test)]
mod tests;

use std::sync::Once;

pub use config::EngineConfig;
pub use error::{ParseFailure, PdaError};
pub use host::{ActionContext, Drive, Host};
pub use input::InputStream;
pub use lexer::{LexOutcome, Lexer, LiteralLexer};
pub use reverse::{ReverseCode, ReverseUnit};
pub use run::{
    Entry, GenerationMatch, NodeFlags, NodeShape, Operation, ParseOutcome, Pcr, PdaRun, Suspend,
};
pub use source::{Lexeme, ScanRequest, Scanned, StreamSource, TokenSource};
pub use tree::{IgnoreList, Location, TokenText, Tree, TreeNode};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only ever installs once, so
/// tests and hosts can call it freely.
///
/// ```text
/// RUST_LOG=rewind_pda=debug cargo test -p rewind_pda
/// RUST_LOG=rewind_pda::run=trace cargo test -p rewind_pda scenario
/// ```
pub fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    TRACING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }

        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_test_writer())
            .with(EnvFilter::from_default_env())
            .try_init();
    });
}
