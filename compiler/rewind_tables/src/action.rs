//! Parser actions and the transitions that carry them.

use smallvec::SmallVec;

use crate::{ProdId, StateId};

/// One alternative in a transition's action list.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Action {
    /// Consume the input item and move to the transition target.
    Shift,
    /// Reduce by a production without consuming the input item.
    Reduce(ProdId),
    /// Consume the input item, then immediately reduce.
    ShiftReduce(ProdId),
}

impl Action {
    #[inline]
    pub fn shifts(self) -> bool {
        matches!(self, Action::Shift | Action::ShiftReduce(_))
    }

    #[inline]
    pub fn reduction(self) -> Option<ProdId> {
        match self {
            Action::Shift => None,
            Action::Reduce(prod) | Action::ShiftReduce(prod) => Some(prod),
        }
    }
}

/// Table entry for a `(state, symbol)` pair.
///
/// `actions` is ordered by priority. Alternatives after the first are tried
/// only when the parse later fails and the engine backtracks to this point.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Transition {
    target: StateId,
    actions: SmallVec<[Action; 2]>,
    commit: bool,
}

impl Transition {
    pub fn new(target: StateId, actions: &[Action]) -> Self {
        Transition {
            target,
            actions: SmallVec::from_slice(actions),
            commit: false,
        }
    }

    /// A shift-only transition.
    pub fn shift(target: StateId) -> Self {
        Transition::new(target, &[Action::Shift])
    }

    /// Mark this transition as a commit point.
    #[must_use]
    pub fn with_commit(mut self) -> Self {
        self.commit = true;
        self
    }

    #[inline]
    pub fn target(&self) -> StateId {
        self.target
    }

    #[inline]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The alternative at `retry`, counting from the highest priority.
    #[inline]
    pub fn action(&self, retry: u32) -> Option<Action> {
        self.actions.get(retry as usize).copied()
    }

    /// Whether a lower-priority alternative follows the one at `retry`.
    #[inline]
    pub fn has_alternative_after(&self, retry: u32) -> bool {
        (retry as usize) + 1 < self.actions.len()
    }

    #[inline]
    pub fn commits(&self) -> bool {
        self.commit
    }
}
