//! End-to-end tests over small hand-built grammars.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

pub(crate) mod grammars;
mod undo;

use rewind_tables::Tables;

use crate::{Host, ParseOutcome, PdaRun, Tree};

/// Host with no semantic actions.
pub(crate) struct NoActions;

impl Host for NoActions {}

/// Compact rendering: leaves print their text (or `<name>` when empty),
/// interior nodes print `Name(child child)`.
pub(crate) fn sexp(tables: &Tables, tree: &Tree) -> String {
    let children = tree.children();
    if children.is_empty() {
        return match tree.text() {
            Some(text) if !text.is_empty() => text.as_str().to_owned(),
            _ => format!("<{}>", tables.symbol_name(tree.id())),
        };
    }
    let inner: Vec<String> = children.iter().map(|kid| sexp(tables, kid)).collect();
    format!("{}({})", tables.symbol_name(tree.id()), inner.join(" "))
}

pub(crate) fn parsed(pda: &PdaRun) -> Tree {
    match pda.outcome() {
        ParseOutcome::Tree(tree) => tree,
        other => panic!("expected a tree, got {other:?}"),
    }
}

pub(crate) fn parsed_sexp(pda: &PdaRun) -> String {
    sexp(pda.tables(), &parsed(pda))
}
