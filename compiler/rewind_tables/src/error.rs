//! Table construction errors.

use thiserror::Error;

use crate::{ProdId, RegionId, StateId, SymbolId};

/// Inconsistencies found while building [`Tables`](crate::Tables).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("terminal `{name}` declared after the first non-terminal")]
    TerminalAfterNonTerminal { name: String },

    #[error("unknown symbol {0}")]
    UnknownSymbol(SymbolId),

    #[error("unknown state {0}")]
    UnknownState(StateId),

    #[error("unknown production {0}")]
    UnknownProduction(ProdId),

    #[error("unknown region {0}")]
    UnknownRegion(RegionId),

    #[error("production `{name}` has a terminal left-hand side")]
    TerminalLhs { name: String },

    #[error("transition from state {state} on symbol {symbol} has no actions")]
    EmptyActions { state: StateId, symbol: SymbolId },

    #[error("term-dup of `{name}` must name a non-terminal")]
    TermDupNotNonTerminal { name: String },

    #[error("tables declare no parser entry point")]
    NoParser,
}
