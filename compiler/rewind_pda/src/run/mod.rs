//! The parse context and everything that mutates it.
//!
//! A [`PdaRun`] owns the parse stack, the pending-input queue, the ignore
//! accumulator and the undo bookkeeping for one parse. The work is split by
//! concern:
//!
//! - `engine`: table-driven shift, reduce and commit
//! - `backtrack`: walking the parse history backward after an error
//! - `ignore`: accumulating and attaching ignore tokens
//! - `controller`: the outer, resumable token-acquisition loop
//!
//! # Resumption
//!
//! Semantic actions belong to the host. Whenever one must run, the
//! operation returns [`Pcr::Suspended`] with a [`Suspend`] tag; the host
//! does its work through the context's action helpers and calls the same
//! operation again with [`Entry::Resume`] and that tag.

mod backtrack;
mod controller;
mod engine;
mod ignore;
mod node;

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use rewind_tables::{FrameId, ParserId, ProdId, RegionSlot, StateId, SymbolId, Tables};
use tracing::debug;

use crate::arena::{Arena, NodeId};
use crate::error::{ParseFailure, PdaError};
use crate::reverse::{ReverseCode, ReverseCollect, ReverseUnit};
use crate::stack::with_stack;
use crate::tree::{Location, Tree, TreeNode};
use crate::EngineConfig;

pub use node::NodeFlags;
pub(crate) use node::{StackNode, SENTINEL};

/// Why an operation stopped before finishing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Suspend {
    /// End-of-file was reached in a region with a pre-EOF action.
    PreEof,
    /// A token with a generation action was matched and left unconsumed.
    Generation,
    /// A production with a semantic action was reduced.
    Reduction,
    /// A unit of reverse code must be replayed.
    Reverse,
}

/// Result of one call into the context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pcr {
    Done,
    Suspended(Suspend),
}

/// How an operation is being entered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    Start,
    Resume(Suspend),
}

/// The resumable operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Run,
    Finish,
    Undo,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Run => "run",
            Operation::Finish => "finish",
            Operation::Undo => "undo_to_step",
        })
    }
}

/// What the parse has produced so far.
#[derive(Clone, Debug)]
pub enum ParseOutcome {
    /// More input is needed.
    Pending,
    Tree(Tree),
    Failed(ParseFailure),
}

/// The token a generation action was suspended for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GenerationMatch {
    pub token: SymbolId,
    /// Bytes of input the match covers; they are still unconsumed.
    pub len: usize,
}

/// Structural snapshot of a stack node, for tests and debugging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeShape {
    pub symbol: String,
    pub state: Option<StateId>,
    pub text: Option<String>,
    pub children: Vec<NodeShape>,
    pub left_ignore: Vec<String>,
    pub right_ignore: Vec<String>,
    pub committed: bool,
}

/// One parse in progress.
pub struct PdaRun {
    tables: Arc<Tables>,
    config: EngineConfig,
    start: StateId,
    eof: SymbolId,

    arena: Arena<StackNode>,
    stack_top: NodeId,
    input1: Option<NodeId>,
    /// Ignore nodes waiting for a real token, oldest first.
    accum: Vec<NodeId>,
    token_list: Vec<NodeId>,
    bt_points: Vec<Tree>,

    cs: Option<StateId>,
    cur_state: Option<StateId>,
    next_region: RegionSlot,
    retry_region: RegionSlot,
    num_retry: u32,
    steps: u64,
    target_steps: Option<u64>,
    shift_count: u64,
    commit_shift_count: u64,

    reverse: ReverseCode,
    collect: ReverseCollect,
    pending_units: u32,
    on_deck: u32,
    reverse_unit: Option<ReverseUnit>,

    red_lel: Option<NodeId>,
    reduction: Option<ProdId>,
    frame: Option<FrameId>,
    generation: Option<GenerationMatch>,

    committed: Vec<Tree>,
    failure: Option<ParseFailure>,
    pending: Option<(Operation, Suspend)>,
    cleared: bool,

    parse_error: bool,
    stop_parsing: bool,
    fail_parsing: bool,
    stop: bool,
    trigger_undo: bool,
    check_next: bool,
    check_stop: bool,
    reject: bool,
}

impl PdaRun {
    /// Create a context for `parser`.
    pub fn new(
        tables: Arc<Tables>,
        parser: ParserId,
        config: EngineConfig,
    ) -> Result<Self, PdaError> {
        let entry = tables.parser(parser).ok_or(PdaError::UnknownParser(parser))?;
        let mut arena = Arena::new();
        let stack_top = arena.alloc(StackNode::new(SENTINEL, TreeNode::marker(SENTINEL)));
        let next_region = tables.region_slot(entry.start);
        debug!(%parser, start = %entry.start, "new parse context");
        Ok(PdaRun {
            tables,
            config,
            start: entry.start,
            eof: entry.eof,
            arena,
            stack_top,
            input1: None,
            accum: Vec::new(),
            token_list: Vec::new(),
            bt_points: Vec::new(),
            cs: Some(entry.start),
            cur_state: None,
            next_region,
            retry_region: RegionSlot::NONE,
            num_retry: 0,
            steps: 0,
            target_steps: None,
            shift_count: 0,
            commit_shift_count: 0,
            reverse: ReverseCode::new(),
            collect: ReverseCollect::default(),
            pending_units: 0,
            on_deck: 0,
            reverse_unit: None,
            red_lel: None,
            reduction: None,
            frame: None,
            generation: None,
            committed: Vec::new(),
            failure: None,
            pending: None,
            cleared: false,
            parse_error: false,
            stop_parsing: false,
            fail_parsing: false,
            stop: false,
            trigger_undo: false,
            check_next: false,
            check_stop: false,
            reject: false,
        })
    }

    // ─── Inspection ───

    pub fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Current parser state; `None` once the parse has failed.
    pub fn state(&self) -> Option<StateId> {
        self.cs
    }

    /// Items sent to the parser so far, net of items sent back.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn shift_count(&self) -> u64 {
        self.shift_count
    }

    pub fn commit_shift_count(&self) -> u64 {
        self.commit_shift_count
    }

    /// Outstanding alternatives the backtracker may still try.
    pub fn num_retry(&self) -> u32 {
        self.num_retry
    }

    pub fn is_failed(&self) -> bool {
        self.parse_error
    }

    /// Whether a stop-target parse has completed.
    pub fn is_stopped(&self) -> bool {
        self.stop_parsing
    }

    pub fn reverse_code(&self) -> &ReverseCode {
        &self.reverse
    }

    /// Stack nodes currently allocated, sentinel included.
    pub fn live_nodes(&self) -> usize {
        self.arena.live()
    }

    /// Trees made permanent by commit points since the last call.
    pub fn take_committed(&mut self) -> Vec<Tree> {
        std::mem::take(&mut self.committed)
    }

    pub fn failure(&self) -> Option<ParseFailure> {
        self.failure
    }

    /// The finished tree: the node below end-of-file, or the stack top for
    /// a stop-target parse.
    pub fn parsed_root(&self) -> Option<Tree> {
        if self.parse_error || self.cleared {
            return None;
        }
        let top = self.arena.get(self.stack_top)?;
        if self.stop_parsing {
            return Some(Rc::clone(&top.tree));
        }
        if top.id != self.eof {
            return None;
        }
        let below = self.arena.get(top.next?)?;
        if below.is_sentinel() {
            None
        } else {
            Some(Rc::clone(&below.tree))
        }
    }

    pub fn outcome(&self) -> ParseOutcome {
        if self.parse_error {
            return ParseOutcome::Failed(self.failure.unwrap_or(ParseFailure {
                location: Location::START,
            }));
        }
        match self.parsed_root() {
            Some(tree) => ParseOutcome::Tree(tree),
            None => ParseOutcome::Pending,
        }
    }

    fn stack_bottom_up(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut cur = Some(self.stack_top);
        while let Some(id) = cur {
            let Some(node) = self.arena.get(id) else {
                break;
            };
            if node.is_sentinel() {
                break;
            }
            ids.push(id);
            cur = node.next;
        }
        ids.reverse();
        ids
    }

    /// Source text held by the stack and the ignore accumulator.
    ///
    /// After a successful finish this reproduces the input exactly.
    pub fn stack_text(&self) -> String {
        let mut out = String::new();
        for id in self.stack_bottom_up() {
            self.arena[id].tree.write_text(&mut out);
        }
        for &id in &self.accum {
            self.arena[id].tree.write_text(&mut out);
        }
        out
    }

    /// Stack contents bottom to top, sentinel excluded.
    pub fn stack_shape(&self) -> Vec<NodeShape> {
        self.stack_bottom_up()
            .into_iter()
            .map(|id| self.shape(id))
            .collect()
    }

    fn shape(&self, id: NodeId) -> NodeShape {
        with_stack(|| {
            let node = &self.arena[id];
            let ignore_text = |ids: &[NodeId]| -> Vec<String> {
                ids.iter().map(|&i| self.arena[i].tree.to_text()).collect()
            };
            NodeShape {
                symbol: self.tables.symbol_name(node.id).to_owned(),
                state: node.state,
                text: node.tree.text().map(|t| t.as_str().to_owned()),
                children: node.children.iter().map(|&kid| self.shape(kid)).collect(),
                left_ignore: ignore_text(&node.left_ignore),
                right_ignore: ignore_text(&node.right_ignore),
                committed: node.flags.contains(NodeFlags::COMMITTED),
            }
        })
    }

    // ─── Action helpers ───

    /// Action the current suspension is for.
    pub fn frame(&self) -> Option<FrameId> {
        self.frame
    }

    /// Tree built by the reduction being suspended on.
    pub fn reduction_tree(&self) -> Option<Tree> {
        self.red_lel.map(|id| Rc::clone(&self.arena[id].tree))
    }

    pub fn reduction_production(&self) -> Option<ProdId> {
        self.reduction
    }

    pub fn generation_match(&self) -> Option<GenerationMatch> {
        self.generation
    }

    /// Reject the reduction being suspended on.
    pub fn reject(&mut self) {
        self.reject = true;
    }

    /// Record one group of reverse code for the running action.
    pub fn record_reverse(&mut self, group: &[u8]) {
        self.collect.record(group);
    }

    /// Reverse-code unit the current [`Suspend::Reverse`] is for.
    pub fn take_reverse_unit(&mut self) -> Option<ReverseUnit> {
        self.reverse_unit.take()
    }

    /// Abandon the parse at the next opportunity, ignoring any retries.
    pub fn fail_parsing(&mut self) {
        self.fail_parsing = true;
    }

    // ─── Teardown ───

    /// Release every node, queue, ignore chain and reverse code.
    ///
    /// The context is unusable afterwards.
    pub fn clear(&mut self) {
        if self.cleared {
            return;
        }
        let top = self.stack_top;
        self.release_chain(Some(top));
        let queue = self.input1.take();
        self.release_chain(queue);
        for id in std::mem::take(&mut self.accum) {
            self.release_tree(id);
        }
        if let Some(red) = self.red_lel.take() {
            self.release_tree(red);
        }
        self.token_list.clear();
        self.bt_points.clear();
        self.reverse.clear();
        self.collect.clear();
        self.committed.clear();
        self.reverse_unit = None;
        self.pending = None;
        self.cleared = true;
        debug!(live = self.arena.live(), "parse context cleared");
    }

    // ─── Node plumbing ───

    fn alloc(&mut self, node: StackNode) -> NodeId {
        self.arena.alloc(node)
    }

    fn symbol_name(&self, id: NodeId) -> &str {
        self.tables.symbol_name(self.arena[id].id)
    }

    /// Terminal, including terminals renamed by term-dup.
    fn is_terminal_node(&self, id: NodeId) -> bool {
        let node = &self.arena[id];
        self.tables.is_terminal(node.id) || node.flags.contains(NodeFlags::TERM_DUP)
    }

    /// Input the backtracker sends back whole instead of un-reducing.
    fn is_atomic(&self, id: NodeId) -> bool {
        self.is_terminal_node(id) || self.arena[id].flags.contains(NodeFlags::ARTIFICIAL)
    }

    fn push_stack(&mut self, id: NodeId) {
        self.arena[id].next = Some(self.stack_top);
        self.stack_top = id;
    }

    /// Pop the stack top; `None` at the sentinel.
    fn pop_stack(&mut self) -> Option<NodeId> {
        let top = self.stack_top;
        let below = self.arena[top].next?;
        self.arena[top].next = None;
        self.stack_top = below;
        Some(top)
    }

    fn queue_front(&mut self, id: NodeId) {
        self.arena[id].next = self.input1;
        self.input1 = Some(id);
    }

    /// Goto target of the stack top, or the start state at the sentinel.
    fn stack_top_target(&self) -> Option<StateId> {
        let top = &self.arena[self.stack_top];
        match top.state {
            None => Some(self.start),
            Some(state) => self
                .tables
                .transition(state, top.id)
                .map(rewind_tables::Transition::target),
        }
    }

    fn release_tree(&mut self, id: NodeId) {
        with_stack(|| {
            let Some(node) = self.arena.release(id) else {
                return;
            };
            for kid in node.children {
                self.release_tree(kid);
            }
            for ignore in node.left_ignore.into_iter().chain(node.right_ignore) {
                self.release_tree(ignore);
            }
        });
    }

    fn release_chain(&mut self, head: Option<NodeId>) {
        let mut cur = head;
        while let Some(id) = cur {
            cur = self.arena.get(id).and_then(|n| n.next);
            self.release_tree(id);
        }
    }

    // ─── Reverse code ───

    fn make_reverse_code(&mut self) -> bool {
        let made = self.reverse.make_unit(&mut self.collect);
        if made {
            self.pending_units += 1;
        }
        made
    }

    fn transfer_reverse_code(&mut self, id: NodeId) {
        if self.pending_units > 0 {
            let node = &mut self.arena[id];
            node.flags |= NodeFlags::HAS_RCODE;
            node.rcode_units += std::mem::take(&mut self.pending_units);
        }
    }

    // ─── Diagnostics ───

    fn push_bt_point(&mut self) {
        let tree = match self.accum.last() {
            Some(&id) => Some(&self.arena[id].tree),
            None => self.token_list.last().map(|&id| &self.arena[id].tree),
        };
        if let Some(tree) = tree {
            let tree = Rc::clone(tree);
            self.bt_points.push(tree);
        }
    }

    fn report_parse_error(&mut self) {
        if self.failure.is_some() {
            return;
        }
        let location = self
            .bt_points
            .iter()
            .filter_map(|t| t.end_location())
            .max_by_key(|loc| loc.byte)
            .unwrap_or(Location::START);
        let failure = ParseFailure { location };
        debug!(%failure, "parse error");
        self.failure = Some(failure);
    }

    fn is_parser_stop_finished(&self) -> bool {
        let Some(target) = self.config.stop_target else {
            return false;
        };
        let top = &self.arena[self.stack_top];
        top.id == target
            && top
                .next
                .is_some_and(|below| self.arena[below].is_sentinel())
    }
}

impl fmt::Debug for PdaRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdaRun")
            .field("state", &self.cs)
            .field("steps", &self.steps)
            .field("shift_count", &self.shift_count)
            .field("commit_shift_count", &self.commit_shift_count)
            .field("num_retry", &self.num_retry)
            .field("parse_error", &self.parse_error)
            .field("stack", &self.stack_shape())
            .finish_non_exhaustive()
    }
}
