//! Grammar tables for the rewind PDA runtime.
//!
//! The tables are produced by an external grammar compiler and are
//! read-only at parse time. They describe:
//!
//! - **Language elements**: terminals (with ignore, term-dup and generation
//!   metadata) followed by non-terminals.
//! - **Productions**: left-hand side, right-hand side length, semantic action.
//! - **The action table**: `(state, symbol)` to a [`Transition`] holding the
//!   goto target, prioritized [`Action`] alternatives and a commit marker.
//! - **Scanning regions**: per-state lists of lexical regions tried in order,
//!   each with optional pre-region, default token and collect-ignore token.
//! - **Parser entry points**: start state and end-of-file symbol.

mod action;
mod builder;
mod error;
mod ids;
mod tables;

pub use action::{Action, Transition};
pub use builder::TablesBuilder;
pub use error::TableError;
pub use ids::{FrameId, ParserId, ProdId, RegionId, RegionSlot, StateId, SymbolId};
pub use tables::{LangEl, ParserEntry, Production, Region, Tables};
