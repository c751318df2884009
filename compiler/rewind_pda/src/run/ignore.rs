//! Ignore-token accumulation and attachment.
//!
//! Ignore tokens never reach the automaton. They pile up in the
//! accumulator until the next real token is shifted. The leading run of
//! trailing ignores (those a pre-region scanned) becomes the right
//! decoration of the terminal on top of the stack; whatever remains becomes
//! the left decoration of the token being shifted. Detaching returns a run
//! to the accumulator in source order.

use std::rc::Rc;

use super::{NodeFlags, PdaRun};
use crate::arena::NodeId;
use crate::tree::IgnoreList;

impl PdaRun {
    /// Take ownership of an ignore node.
    pub(super) fn ignore(&mut self, id: NodeId) {
        self.transfer_reverse_code(id);
        self.steps += 1;
        self.set_region(id);
        self.accum.push(id);
    }

    /// Remember which region produced `id` if it starts a new run of input.
    pub(super) fn set_region(&mut self, id: NodeId) {
        if !self.accum.is_empty() {
            return;
        }
        self.arena[id].region = self.next_region;
        if self.tables.region_at(self.next_region.next()).is_some() {
            self.num_retry += 1;
        }
    }

    fn ignore_list(&self, run: &[NodeId]) -> IgnoreList {
        IgnoreList::new(run.iter().map(|&i| Rc::clone(&self.arena[i].tree)).collect())
    }

    pub(super) fn attach_right_ignore(&mut self, to: NodeId) {
        if self.accum.is_empty()
            || !self.is_terminal_node(to)
            || self.arena[to].flags.contains(NodeFlags::RIGHT_IGNORE)
        {
            return;
        }
        let trailing = self
            .accum
            .iter()
            .take_while(|&&id| self.arena[id].flags.contains(NodeFlags::TRAILING))
            .count();
        if trailing == 0 {
            return;
        }
        let run: Vec<NodeId> = self.accum.drain(..trailing).collect();
        let list = self.ignore_list(&run);
        let node = &mut self.arena[to];
        node.tree.set_right_ignore(Some(list));
        node.right_ignore = run;
        node.flags |= NodeFlags::RIGHT_IGNORE;
    }

    pub(super) fn attach_left_ignore(&mut self, to: NodeId) {
        if self.accum.is_empty() || self.arena[to].flags.contains(NodeFlags::LEFT_IGNORE) {
            return;
        }
        let run = std::mem::take(&mut self.accum);
        let list = self.ignore_list(&run);
        let node = &mut self.arena[to];
        node.tree.set_left_ignore(Some(list));
        node.left_ignore = run;
        node.flags |= NodeFlags::LEFT_IGNORE;
    }

    /// A right run precedes anything still accumulated.
    pub(super) fn detach_right_ignore(&mut self, from: NodeId) {
        let node = &mut self.arena[from];
        if !node.flags.contains(NodeFlags::RIGHT_IGNORE) {
            return;
        }
        node.flags.remove(NodeFlags::RIGHT_IGNORE);
        node.tree.set_right_ignore(None);
        let run = std::mem::take(&mut node.right_ignore);
        self.accum.splice(0..0, run);
    }

    /// A left run follows anything still accumulated.
    pub(super) fn detach_left_ignore(&mut self, from: NodeId) {
        let node = &mut self.arena[from];
        if !node.flags.contains(NodeFlags::LEFT_IGNORE) {
            return;
        }
        node.flags.remove(NodeFlags::LEFT_IGNORE);
        node.tree.set_left_ignore(None);
        let run = std::mem::take(&mut node.left_ignore);
        self.accum.extend(run);
    }
}
