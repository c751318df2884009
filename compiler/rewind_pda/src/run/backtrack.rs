//! Walking the parse history backward.
//!
//! Each call to [`PdaRun::backtrack`] performs exactly one undo step. The
//! order of the checks is significant: pending reverse code replays first,
//! then region retries and the stop check, then the head of the pending
//! queue, then accumulated ignores, and only then the stack itself.

use tracing::debug;

use super::engine::Step;
use super::{NodeFlags, PdaRun, Suspend};
use crate::arena::NodeId;
use crate::source::TokenSource;

impl PdaRun {
    pub(super) fn backtrack(&mut self, input: &mut dyn TokenSource) -> Step {
        if self.on_deck > 0 {
            self.on_deck -= 1;
            if let Some(unit) = self.reverse.pop_unit() {
                debug!(groups = unit.len(), "replaying reverse code");
                self.reverse_unit = Some(unit);
                return Step::Suspend(Suspend::Reverse);
            }
            return Step::Backtrack;
        }

        if std::mem::take(&mut self.check_next) {
            let next = self.retry_region;
            if let Some(region) = self.tables.region_at(next) {
                self.num_retry = self.num_retry.saturating_sub(1);
                // While undoing, the alternative is dropped rather than taken.
                if !self.trigger_undo {
                    self.cs = self.stack_top_target();
                    self.next_region = next;
                    debug!(
                        region = self.tables.region(region).map_or("?", |r| r.name.as_str()),
                        "retrying in next region"
                    );
                    return Step::Done;
                }
            }
        }

        if std::mem::take(&mut self.check_stop) && self.stop {
            self.cs = self.stack_top_target();
            debug!(steps = self.steps, "reached undo target");
            return Step::Out;
        }

        if let Some(head) = self.input1 {
            if self.is_atomic(head) {
                return self.undo_input(input, head);
            }
            let node = &mut self.arena[head];
            if node.flags.contains(NodeFlags::HAS_RCODE) {
                node.flags.remove(NodeFlags::HAS_RCODE);
                self.on_deck += std::mem::take(&mut node.rcode_units);
                return Step::Backtrack;
            }
            self.unreduce(head);
            return Step::Backtrack;
        }

        if let Some(ignore) = self.accum.pop() {
            self.retry_region = self.arena[ignore].region.next();
            self.check_next = true;
            self.check_stop = true;
            self.send_back_ignore(input, ignore);
            return Step::Backtrack;
        }

        self.unshift()
    }

    /// Head of the queue is a token or an external tree.
    fn undo_input(&mut self, input: &mut dyn TokenSource, head: NodeId) -> Step {
        let node = &mut self.arena[head];
        if node.retry_lower != 0 {
            self.num_retry = self.num_retry.saturating_sub(1);
            if self.trigger_undo {
                node.retry_lower = 0;
            } else {
                self.cs = node.state;
                debug!(
                    symbol = self.symbol_name(head),
                    alternative = self.arena[head].retry_lower,
                    "retrying alternative action"
                );
                return Step::Again;
            }
        }

        if self.arena[head].cause_reduce != 0 {
            // The reductions it caused sit on the stack above it.
            if self.shift_count == self.commit_shift_count {
                debug!("backtracking reached a commit point");
                return Step::Fail;
            }
            let Some(top) = self.pop_stack() else {
                return Step::Fail;
            };
            self.shift_count -= 1;
            self.queue_front(top);
            return Step::Backtrack;
        }

        let node = &mut self.arena[head];
        self.retry_region = node.region.next();
        self.input1 = node.next.take();
        self.check_next = true;
        self.check_stop = true;
        self.send_back(input, head);
        Step::Backtrack
    }

    /// Return a reduction's children to the stack.
    fn unreduce(&mut self, head: NodeId) {
        let node = &mut self.arena[head];
        self.input1 = node.next.take();
        let children = std::mem::take(&mut node.children);
        let retry_upper = node.retry_upper;
        node.tree.take_children();
        debug!(symbol = self.symbol_name(head), "unreduce");

        for kid in children {
            self.push_stack(kid);
        }
        if let Some(lookahead) = self.input1 {
            let target = self.stack_top_target();
            let next = &mut self.arena[lookahead];
            next.cause_reduce = next.cause_reduce.saturating_sub(1);
            if retry_upper != 0 {
                next.retry_lower = retry_upper;
                next.state = target;
            }
        }
        self.arena.release(head);

        let top = self.stack_top;
        self.detach_right_ignore(top);
    }

    /// Undo the most recent shift.
    fn unshift(&mut self) -> Step {
        if self.shift_count == self.commit_shift_count {
            debug!("backtracking reached a commit point");
            return Step::Fail;
        }
        let Some(top) = self.pop_stack() else {
            return Step::Fail;
        };
        self.shift_count -= 1;

        if self.is_terminal_node(top) {
            let node = &mut self.arena[top];
            if node.flags.contains(NodeFlags::TERM_DUP) {
                node.id = node.tree.id();
                node.flags.remove(NodeFlags::TERM_DUP);
            }
            self.token_list.pop();
            // Only a terminal shifted directly on `below` owns its right run.
            let below = self.stack_top;
            self.detach_right_ignore(below);
            self.detach_left_ignore(top);
        }
        debug!(
            symbol = self.symbol_name(top),
            shift_count = self.shift_count,
            "unshift"
        );
        self.queue_front(top);
        Step::Backtrack
    }

    /// Push a token back into the input.
    fn send_back(&mut self, input: &mut dyn TokenSource, id: NodeId) {
        let Some(node) = self.arena.release(id) else {
            return;
        };
        self.steps = self.steps.saturating_sub(1);
        if node.flags.contains(NodeFlags::HAS_RCODE) {
            self.on_deck += node.rcode_units;
        }
        debug!(
            symbol = self.tables.symbol_name(node.id),
            steps = self.steps,
            "send back"
        );
        if node.flags.contains(NodeFlags::ARTIFICIAL) {
            input.send_back_tree(node.tree);
        } else {
            if let Some(text) = node.tree.text() {
                input.send_back_text(text);
            }
            if node.id == self.eof {
                input.set_eof_sent(false);
            }
        }
        for ignore in node.left_ignore.into_iter().chain(node.right_ignore) {
            self.release_tree(ignore);
        }
        if self.target_steps == Some(self.steps) {
            self.stop = true;
        }
    }

    fn send_back_ignore(&mut self, input: &mut dyn TokenSource, id: NodeId) {
        let Some(node) = self.arena.release(id) else {
            return;
        };
        self.steps = self.steps.saturating_sub(1);
        if node.flags.contains(NodeFlags::HAS_RCODE) {
            self.on_deck += node.rcode_units;
        }
        debug!(
            symbol = self.tables.symbol_name(node.id),
            steps = self.steps,
            "send back ignore"
        );
        if node.flags.contains(NodeFlags::ARTIFICIAL) {
            if Some(node.id) != self.tables.no_token_id() {
                input.send_back_ignore_tree(node.tree);
            }
        } else if let Some(text) = node.tree.text() {
            input.send_back_text(text);
        }
        if self.target_steps == Some(self.steps) {
            self.stop = true;
        }
    }
}
