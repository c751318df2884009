//! `undo_to_step` restores the exact earlier configuration.

use pretty_assertions::assert_eq;

use super::grammars::{conflict, pair, trailing, ConflictOpts};
use super::{parsed_sexp, NoActions};
use crate::{init_tracing, Drive, EngineConfig, ParseOutcome};

#[test]
fn undo_restores_the_earlier_stack() {
    init_tracing();
    let fixture = pair();
    let mut pda = fixture.pda(EngineConfig::new());
    let mut source = fixture.open_source();

    source.append_text("a");
    pda.drive(&mut source, &mut NoActions, Drive::Run).unwrap();
    assert_eq!(pda.steps(), 1);
    let after_first = pda.stack_shape();

    source.append_text(" a");
    pda.drive(&mut source, &mut NoActions, Drive::Run).unwrap();
    assert_eq!(pda.steps(), 3);
    let after_second = pda.stack_shape();
    assert_eq!(after_second.len(), 1);
    assert_eq!(after_second[0].symbol, "S");

    pda.drive(&mut source, &mut NoActions, Drive::UndoTo(1)).unwrap();
    assert_eq!(pda.steps(), 1);
    assert_eq!(pda.stack_shape(), after_first);
    assert_eq!(source.input().remaining_text(), " a");
    assert_eq!(pda.num_retry(), 0);

    // Replaying the same input lands in the same place.
    pda.drive(&mut source, &mut NoActions, Drive::Run).unwrap();
    assert_eq!(pda.stack_shape(), after_second);
    assert_eq!(source.input().remaining_text(), "");
}

#[test]
fn undo_to_current_step_is_a_no_op() {
    init_tracing();
    let fixture = pair();
    let mut pda = fixture.pda(EngineConfig::new());
    let mut source = fixture.open_source();
    source.append_text("a");
    pda.drive(&mut source, &mut NoActions, Drive::Run).unwrap();
    let before = pda.stack_shape();

    pda.drive(&mut source, &mut NoActions, Drive::UndoTo(1)).unwrap();
    pda.drive(&mut source, &mut NoActions, Drive::UndoTo(5)).unwrap();
    assert_eq!(pda.stack_shape(), before);
    assert_eq!(pda.steps(), 1);
}

#[test]
fn undo_to_zero_empties_the_stack() {
    init_tracing();
    let fixture = pair();
    let mut pda = fixture.pda(EngineConfig::new());
    let mut source = fixture.open_source();
    source.append_text(" a a ");
    pda.drive(&mut source, &mut NoActions, Drive::Run).unwrap();

    pda.drive(&mut source, &mut NoActions, Drive::UndoTo(0)).unwrap();
    assert_eq!(pda.steps(), 0);
    assert!(pda.stack_shape().is_empty());
    assert_eq!(pda.shift_count(), 0);
    assert_eq!(source.input().remaining_text(), " a a ");
    // Only the sentinel is left.
    assert_eq!(pda.live_nodes(), 1);
}

#[test]
fn undo_through_end_of_file_reopens_the_parse() {
    init_tracing();
    let fixture = pair();
    let mut pda = fixture.pda(EngineConfig::new());
    let mut source = fixture.source("a a");
    pda.drive(&mut source, &mut NoActions, Drive::Finish).unwrap();
    assert!(matches!(pda.outcome(), ParseOutcome::Tree(_)));
    assert_eq!(pda.steps(), 4);

    pda.drive(&mut source, &mut NoActions, Drive::UndoTo(2)).unwrap();
    assert!(matches!(pda.outcome(), ParseOutcome::Pending));
    assert!(!source.input().eof_sent());
    assert_eq!(source.input().remaining_text(), "a");

    pda.drive(&mut source, &mut NoActions, Drive::Finish).unwrap();
    assert_eq!(parsed_sexp(&pda), "S(A(a) A(a))");
    assert_eq!(pda.stack_text(), "a a");
}

#[test]
fn undo_discards_pending_alternatives() {
    init_tracing();
    let fixture = conflict(ConflictOpts::default());
    let mut pda = fixture.pda(EngineConfig::new());
    let mut source = fixture.open_source();
    source.append_text("ab");
    pda.drive(&mut source, &mut NoActions, Drive::Run).unwrap();
    // Shifting `b` left the reduction to `X` as an alternative.
    assert_eq!(pda.num_retry(), 1);

    pda.drive(&mut source, &mut NoActions, Drive::UndoTo(1)).unwrap();
    assert_eq!(pda.num_retry(), 0);
    assert_eq!(pda.stack_shape().len(), 1);
    assert_eq!(source.input().remaining_text(), "b");

    source.append_text("ce");
    pda.drive(&mut source, &mut NoActions, Drive::Finish).unwrap();
    assert_eq!(parsed_sexp(&pda), "S(X(a) b c e)");
}

#[test]
fn undo_sends_a_trailing_run_back_after_the_token_above_it() {
    init_tracing();
    let fixture = trailing();
    let mut pda = fixture.pda(EngineConfig::new());
    let mut source = fixture.open_source();
    source.append_text("a b");
    pda.drive(&mut source, &mut NoActions, Drive::Run).unwrap();

    let shape = pda.stack_shape();
    assert_eq!(shape.len(), 2);
    assert_eq!(shape[0].right_ignore, vec![" "]);
    assert_eq!(shape[1].symbol, "B");

    pda.drive(&mut source, &mut NoActions, Drive::UndoTo(1)).unwrap();
    let shape = pda.stack_shape();
    assert_eq!(shape.len(), 1);
    assert!(shape[0].right_ignore.is_empty());
    assert_eq!(source.input().remaining_text(), " b");

    pda.drive(&mut source, &mut NoActions, Drive::Finish).unwrap();
    assert_eq!(parsed_sexp(&pda), "S(a B(b))");
    assert_eq!(pda.stack_text(), "a b");
}
