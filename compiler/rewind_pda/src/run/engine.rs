//! Table-driven shift, reduce and commit.

use std::rc::Rc;
use std::sync::Arc;

use rewind_tables::{Action, ProdId, StateId};
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::{Entry, NodeFlags, Pcr, PdaRun, StackNode, Suspend};
use crate::arena::NodeId;
use crate::source::TokenSource;
use crate::stack::with_stack;
use crate::tree::TreeNode;

/// Position inside [`PdaRun::parse_token`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum Step {
    /// Apply the next action to the head of the pending queue.
    Again,
    ParseError,
    /// Take one backtracking step.
    Backtrack,
    Fail,
    /// Leave, loading the region list of the current state.
    Out,
    /// Leave without touching the region cursor.
    Done,
    Suspend(Suspend),
}

impl PdaRun {
    /// Drive the automaton until the pending queue is empty, a parse error
    /// is final, or an action needs the host.
    pub(super) fn parse_token(&mut self, input: &mut dyn TokenSource, entry: Entry) -> Pcr {
        let mut step = match entry {
            Entry::Resume(Suspend::Reduction) => self.finish_reduction(),
            Entry::Resume(Suspend::Reverse) => {
                self.reverse_unit = None;
                Step::Backtrack
            }
            Entry::Start | Entry::Resume(Suspend::PreEof | Suspend::Generation) => {
                if self.cs.is_none() {
                    let queue = self.input1.take();
                    self.release_chain(queue);
                    return Pcr::Done;
                }
                if self.input1.is_none() {
                    Step::ParseError
                } else {
                    Step::Again
                }
            }
        };

        loop {
            step = match step {
                Step::Again | Step::Backtrack if self.fail_parsing => Step::Fail,
                Step::Again => self.advance(),
                Step::ParseError => {
                    if self.fail_parsing || self.num_retry == 0 {
                        Step::Fail
                    } else {
                        Step::Backtrack
                    }
                }
                Step::Backtrack => self.backtrack(input),
                Step::Fail => {
                    self.fail();
                    Step::Out
                }
                Step::Out => {
                    self.next_region = match self.cs {
                        Some(state) => self.tables.region_slot(state),
                        None => rewind_tables::RegionSlot::NONE,
                    };
                    return Pcr::Done;
                }
                Step::Done => return Pcr::Done,
                Step::Suspend(point) => return Pcr::Suspended(point),
            };
        }
    }

    /// One action on the head of the pending queue.
    fn advance(&mut self) -> Step {
        let Some(lel) = self.input1 else {
            return Step::Out;
        };
        let Some(cur) = self.cs else {
            return Step::Fail;
        };
        self.cur_state = Some(cur);

        let tables = Arc::clone(&self.tables);
        let symbol = self.arena[lel].id;
        let retry = self.arena[lel].retry_lower;
        let Some(transition) = tables.transition(cur, symbol) else {
            trace!(state = %cur, symbol = tables.symbol_name(symbol), "no transition");
            self.push_bt_point();
            return Step::ParseError;
        };
        let Some(action) = transition.action(retry) else {
            self.push_bt_point();
            return Step::ParseError;
        };
        let has_alt = transition.has_alternative_after(retry);
        trace!(
            state = %cur,
            symbol = tables.symbol_name(symbol),
            ?action,
            retry,
            "lookup"
        );
        self.cs = Some(transition.target());

        let shifted = action.shifts();
        if shifted {
            self.input1 = self.arena[lel].next.take();
            self.shift(lel, cur, has_alt);
        }
        if transition.commits() {
            self.commit_full();
        }
        match action {
            Action::Shift => Step::Again,
            Action::Reduce(prod) | Action::ShiftReduce(prod) => {
                self.reduce(prod, lel, cur, shifted, has_alt)
            }
        }
    }

    fn shift(&mut self, lel: NodeId, from: StateId, has_alt: bool) {
        let terminal = self.tables.is_terminal(self.arena[lel].id);
        self.arena[lel].state = Some(from);
        if terminal && self.arena[lel].cause_reduce == 0 {
            let top = self.stack_top;
            self.attach_right_ignore(top);
        }
        self.push_stack(lel);
        if terminal {
            self.attach_left_ignore(lel);
            self.token_list.push(lel);
        }

        let dup = self
            .tables
            .lang_el(self.arena[lel].id)
            .and_then(|el| el.term_dup);
        let node = &mut self.arena[lel];
        if let Some(dup) = dup {
            node.id = dup;
            node.flags |= NodeFlags::TERM_DUP;
        }
        if has_alt {
            node.retry_lower += 1;
            self.num_retry += 1;
        } else {
            node.retry_lower = 0;
        }
        self.shift_count += 1;
        debug!(
            symbol = self.symbol_name(lel),
            state = %from,
            shift_count = self.shift_count,
            "shift"
        );
    }

    fn reduce(
        &mut self,
        prod: ProdId,
        lel: NodeId,
        cur: StateId,
        shifted: bool,
        has_alt: bool,
    ) -> Step {
        let tables = Arc::clone(&self.tables);
        let Some(production) = tables.production(prod) else {
            self.push_bt_point();
            return Step::ParseError;
        };
        if !shifted && self.is_terminal_node(lel) {
            let top = self.stack_top;
            self.attach_right_ignore(top);
        }
        if let Some(lookahead) = self.input1 {
            self.arena[lookahead].cause_reduce += 1;
        }

        let mut red = StackNode::new(production.lhs, TreeNode::branch(production.lhs, Vec::new()));
        if !shifted {
            // The retry travels with the reduction and returns to the
            // lookahead when the reduction is undone.
            let lookahead = &mut self.arena[lel];
            let retry = std::mem::take(&mut lookahead.retry_lower);
            if has_alt {
                red.retry_upper = retry + 1;
                self.num_retry += 1;
            }
        }

        let mut children: SmallVec<[NodeId; 4]> = SmallVec::new();
        for _ in 0..production.rhs_len {
            match self.pop_stack() {
                Some(kid) => children.push(kid),
                None => break,
            }
        }
        children.reverse();
        red.tree.set_children(
            children
                .iter()
                .map(|&kid| Rc::clone(&self.arena[kid].tree))
                .collect(),
        );
        self.cs = match children.first() {
            Some(&first) => self.arena[first].state,
            None => Some(cur),
        };
        red.children = children;
        debug!(production = production.name.as_str(), rhs = production.rhs_len, "reduce");

        let red = self.alloc(red);
        self.red_lel = Some(red);
        self.reduction = Some(prod);
        if self.config.ctx_dep_parsing {
            if let Some(frame) = production.frame {
                self.frame = Some(frame);
                self.reject = false;
                return Step::Suspend(Suspend::Reduction);
            }
        }
        self.finish_reduction()
    }

    /// Package the action's reverse code and queue or reject the reduction.
    pub(super) fn finish_reduction(&mut self) -> Step {
        self.frame = None;
        self.reduction = None;
        let Some(red) = self.red_lel.take() else {
            return Step::Again;
        };
        self.make_reverse_code();
        self.transfer_reverse_code(red);

        if std::mem::take(&mut self.reject) {
            debug!(symbol = self.symbol_name(red), "reduction rejected");
            self.arena[red].state = self.cur_state;
            self.push_stack(red);
            self.shift_count += 1;
            self.push_bt_point();
            return Step::ParseError;
        }
        self.queue_front(red);
        Step::Again
    }

    /// Make everything on the stack permanent.
    pub(super) fn commit_full(&mut self) {
        let mut fresh = Vec::new();
        let mut cur = Some(self.stack_top);
        while let Some(id) = cur {
            let node = &self.arena[id];
            if node.is_sentinel() || node.flags.contains(NodeFlags::COMMITTED) {
                break;
            }
            fresh.push(id);
            cur = node.next;
        }
        for &id in &fresh {
            self.commit_kid(id);
        }
        self.num_retry = 0;
        self.commit_shift_count = self.shift_count;
        if !self.config.revert_on {
            self.reverse.clear();
            self.pending_units = 0;
        }
        self.committed
            .extend(fresh.iter().rev().map(|&id| Rc::clone(&self.arena[id].tree)));
        debug!(
            shift_count = self.shift_count,
            nodes = fresh.len(),
            "commit"
        );
    }

    fn commit_kid(&mut self, id: NodeId) {
        with_stack(|| {
            let node = &mut self.arena[id];
            node.flags |= NodeFlags::COMMITTED;
            node.retry_lower = 0;
            node.retry_upper = 0;
            let kids = node.children.clone();
            for kid in kids {
                self.commit_kid(kid);
            }
        });
    }

    /// Give up for good.
    pub(super) fn fail(&mut self) {
        self.cs = None;
        self.parse_error = true;
        let queue = self.input1.take();
        self.release_chain(queue);
        debug!(shift_count = self.shift_count, "parse failed");
    }
}
