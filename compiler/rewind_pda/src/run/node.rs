//! Parse-stack nodes.

use bitflags::bitflags;
use rewind_tables::{RegionSlot, StateId, SymbolId};
use smallvec::SmallVec;

use crate::arena::NodeId;
use crate::tree::Tree;

bitflags! {
    /// Per-node bookkeeping bits.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct NodeFlags: u8 {
        /// Came from a host-supplied tree, not from scanned text.
        const ARTIFICIAL = 1 << 0;
        /// Owns reverse-code units that must replay when it is undone.
        const HAS_RCODE = 1 << 1;
        /// Behind a commit point; never undone.
        const COMMITTED = 1 << 2;
        const LEFT_IGNORE = 1 << 3;
        const RIGHT_IGNORE = 1 << 4;
        /// Terminal renamed to its term-dup symbol when shifted.
        const TERM_DUP = 1 << 5;
        /// Ignore scanned by a pre-region; may decorate the token before it.
        const TRAILING = 1 << 6;
    }
}

/// Symbol carried by the stack sentinel.
pub(crate) const SENTINEL: SymbolId = SymbolId::new(u32::MAX);

#[derive(Debug)]
pub(crate) struct StackNode {
    pub id: SymbolId,
    /// State the node was shifted from; `None` only for the sentinel.
    pub state: Option<StateId>,
    pub tree: Tree,
    /// Stack link while shifted, queue link while pending.
    pub next: Option<NodeId>,
    pub children: SmallVec<[NodeId; 4]>,
    /// Ignore nodes in source order.
    pub left_ignore: Vec<NodeId>,
    pub right_ignore: Vec<NodeId>,
    pub flags: NodeFlags,
    /// Reductions this node has caused as lookahead.
    pub cause_reduce: u32,
    /// Region slot scanned to produce this node.
    pub region: RegionSlot,
    /// Next action alternative to try on this input.
    pub retry_lower: u32,
    /// Alternative to hand the lookahead when this reduction is undone.
    pub retry_upper: u32,
    pub rcode_units: u32,
}

impl StackNode {
    pub(crate) fn new(id: SymbolId, tree: Tree) -> Self {
        StackNode {
            id,
            state: None,
            tree,
            next: None,
            children: SmallVec::new(),
            left_ignore: Vec::new(),
            right_ignore: Vec::new(),
            flags: NodeFlags::empty(),
            cause_reduce: 0,
            region: RegionSlot::NONE,
            retry_lower: 0,
            retry_upper: 0,
            rcode_units: 0,
        }
    }

    pub(crate) fn artificial(id: SymbolId, tree: Tree) -> Self {
        let mut node = Self::new(id, tree);
        node.flags |= NodeFlags::ARTIFICIAL;
        node
    }

    #[inline]
    pub(crate) fn is_sentinel(&self) -> bool {
        self.state.is_none() && self.id == SENTINEL
    }
}
