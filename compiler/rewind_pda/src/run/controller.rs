//! The outer token-acquisition loop and the public operations.

use tracing::{debug, trace};

use super::{Entry, GenerationMatch, NodeFlags, Operation, Pcr, PdaRun, StackNode, Suspend};
use crate::arena::NodeId;
use crate::error::PdaError;
use crate::source::{Lexeme, ScanRequest, Scanned, TokenSource};
use crate::tree::{TokenText, Tree, TreeNode};

/// Position inside [`PdaRun::parse_loop`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Stage {
    Scan,
    /// Hand `input1` to the engine.
    Send,
    Engine(Entry),
    /// Nothing to parse this round; check whether to keep going.
    SkipSend,
    Break,
    Suspend(Suspend),
}

impl PdaRun {
    /// Parse as much buffered input as possible.
    ///
    /// Returns [`Pcr::Done`] once the input runs dry, the parse stops or
    /// fails; returns [`Pcr::Suspended`] when a semantic action must run.
    pub fn run(&mut self, input: &mut dyn TokenSource, entry: Entry) -> Result<Pcr, PdaError> {
        self.enter(Operation::Run, entry)?;
        let pcr = self.parse_loop(input, entry);
        Ok(self.leave(Operation::Run, pcr))
    }

    /// Mark the input complete and parse through end-of-file.
    pub fn finish(&mut self, input: &mut dyn TokenSource, entry: Entry) -> Result<Pcr, PdaError> {
        self.enter(Operation::Finish, entry)?;
        if entry == Entry::Start {
            input.finish();
        }
        let pcr = self.parse_loop(input, entry);
        Ok(self.leave(Operation::Finish, pcr))
    }

    /// Roll the parse back until only `steps` input items remain sent.
    ///
    /// Everything after that point goes back into `input`, and reverse code
    /// recorded by the undone actions is replayed through
    /// [`Suspend::Reverse`]. A no-op when `steps` is not behind the
    /// current step count.
    pub fn undo_to_step(
        &mut self,
        input: &mut dyn TokenSource,
        steps: u64,
        entry: Entry,
    ) -> Result<Pcr, PdaError> {
        self.enter(Operation::Undo, entry)?;
        if entry == Entry::Start {
            if steps >= self.steps {
                return Ok(Pcr::Done);
            }
            debug!(from = self.steps, to = steps, "undo");
            self.num_retry += 1;
            self.target_steps = Some(steps);
            self.trigger_undo = true;
        }
        let pcr = self.parse_loop(input, entry);
        if pcr == Pcr::Done {
            self.trigger_undo = false;
            self.target_steps = None;
            self.num_retry = self.num_retry.saturating_sub(1);
        }
        Ok(self.leave(Operation::Undo, pcr))
    }

    fn enter(&mut self, op: Operation, entry: Entry) -> Result<(), PdaError> {
        if self.cleared {
            return Err(PdaError::Cleared);
        }
        match (self.pending, entry) {
            (None, Entry::Start) => Ok(()),
            (Some((suspended, _)), _) if suspended != op => Err(PdaError::WrongOperation {
                suspended,
                called: op,
            }),
            (Some((_, point)), Entry::Resume(found)) if point == found => {
                self.pending = None;
                Ok(())
            }
            (pending, found) => Err(PdaError::ResumeMismatch {
                expected: pending.map(|(_, point)| point),
                found,
            }),
        }
    }

    fn leave(&mut self, op: Operation, pcr: Pcr) -> Pcr {
        if let Pcr::Suspended(point) = pcr {
            self.pending = Some((op, point));
        }
        pcr
    }

    fn parse_loop(&mut self, input: &mut dyn TokenSource, entry: Entry) -> Pcr {
        let mut stage = match entry {
            Entry::Start => {
                if self.parse_error {
                    return Pcr::Done;
                }
                self.stop = false;
                Stage::Scan
            }
            Entry::Resume(Suspend::PreEof) => {
                self.frame = None;
                self.make_reverse_code();
                Stage::Send
            }
            Entry::Resume(Suspend::Generation) => self.finish_generation(),
            Entry::Resume(point @ (Suspend::Reduction | Suspend::Reverse)) => {
                Stage::Engine(Entry::Resume(point))
            }
        };

        loop {
            stage = match stage {
                Stage::Scan => self.acquire(input),
                Stage::Send => {
                    if let Some(head) = self.input1 {
                        self.transfer_reverse_code(head);
                    }
                    Stage::Engine(Entry::Start)
                }
                Stage::Engine(entry) => match self.parse_token(input, entry) {
                    Pcr::Suspended(point) => Stage::Suspend(point),
                    Pcr::Done => {
                        if self.parse_error {
                            self.report_parse_error();
                        } else if self.is_parser_stop_finished() {
                            debug!("stop target reached");
                            self.stop_parsing = true;
                        }
                        Stage::SkipSend
                    }
                },
                Stage::SkipSend => {
                    if self.fail_parsing && !self.parse_error {
                        self.fail();
                        self.report_parse_error();
                    }
                    if self.trigger_undo
                        || input.eof_sent()
                        || self.stop_parsing
                        || self.stop
                        || self.parse_error
                    {
                        Stage::Break
                    } else {
                        Stage::Scan
                    }
                }
                Stage::Break => return Pcr::Done,
                Stage::Suspend(point) => return Pcr::Suspended(point),
            };
        }
    }

    fn scan_request(&self) -> ScanRequest {
        ScanRequest {
            region: self.tables.region_at(self.next_region),
            pre_region: self.tables.pre_region_at(self.next_region),
        }
    }

    /// Fetch the next input item and route it.
    fn acquire(&mut self, input: &mut dyn TokenSource) -> Stage {
        let scanned = if self.trigger_undo {
            Scanned::Undo
        } else {
            let request = self.scan_request();
            input.next_token(&self.tables, request)
        };
        trace!(?scanned, "acquired");

        match scanned {
            Scanned::TryAgainLater | Scanned::EndOfStream => Stage::Break,
            Scanned::EndOfFile => {
                input.set_eof_sent(true);
                let eof = self.send_eof(input);
                self.input1 = Some(eof);
                let frame = self
                    .tables
                    .region_at(self.next_region)
                    .and_then(|r| self.tables.region(r))
                    .and_then(|r| r.eof_frame);
                match frame {
                    Some(frame) if self.config.ctx_dep_parsing => {
                        self.frame = Some(frame);
                        Stage::Suspend(Suspend::PreEof)
                    }
                    _ => Stage::Send,
                }
            }
            Scanned::Undo => {
                self.input1 = None;
                Stage::Send
            }
            Scanned::Error => self.scan_error(input),
            Scanned::Tree(tree) => {
                let id = self.send_tree(tree);
                self.input1 = Some(id);
                Stage::Send
            }
            Scanned::IgnoreTree(tree) => {
                let id = self.alloc(StackNode::artificial(tree.id(), tree));
                self.ignore(id);
                Stage::SkipSend
            }
            Scanned::Ignore { lexeme, trailing } => {
                let mut node = StackNode::new(lexeme.id, TreeNode::token(lexeme.id, lexeme.text));
                if trailing {
                    node.flags |= NodeFlags::TRAILING;
                }
                let id = self.alloc(node);
                self.ignore(id);
                Stage::SkipSend
            }
            Scanned::Token(lexeme) => {
                let generation = self
                    .tables
                    .lang_el(lexeme.id)
                    .and_then(|el| el.generation)
                    .filter(|_| self.config.ctx_dep_parsing);
                if let Some(frame) = generation {
                    // The action consumes the match itself.
                    input.send_back_text(&lexeme.text);
                    self.frame = Some(frame);
                    self.generation = Some(GenerationMatch {
                        token: lexeme.id,
                        len: lexeme.text.len(),
                    });
                    return Stage::Suspend(Suspend::Generation);
                }
                let id = self.send_token(lexeme);
                self.input1 = Some(id);
                Stage::Send
            }
        }
    }

    fn scan_error(&mut self, input: &mut dyn TokenSource) -> Stage {
        let collect = self
            .tables
            .region_at(self.next_region)
            .and_then(|r| self.tables.region(r))
            .and_then(|r| r.collect_ignore);
        if let Some(symbol) = collect {
            debug!(symbol = self.tables.symbol_name(symbol), "collect-ignore");
            // An empty token the grammar can shift in place of the gap.
            let id = self.send_token(Lexeme {
                id: symbol,
                text: TokenText::new("", Some(input.location())),
            });
            self.input1 = Some(id);
            return Stage::Send;
        }

        // Only backtracking can rescan pending ignores in another region.
        let next = self.next_region.next();
        if self.accum.is_empty() && self.tables.region_at(next).is_some() {
            debug!("scan error, trying next region");
            self.next_region = next;
            return Stage::SkipSend;
        }

        self.push_bt_point();
        if self.num_retry > 0 {
            self.input1 = None;
            Stage::Send
        } else {
            debug!(at = ?input.location(), "scan error");
            self.cs = None;
            self.parse_error = true;
            self.report_parse_error();
            Stage::SkipSend
        }
    }

    fn finish_generation(&mut self) -> Stage {
        self.frame = None;
        self.generation = None;
        if self.make_reverse_code() {
            if let Some(marker) = self.tables.no_token_id() {
                let id = self.alloc(StackNode::artificial(marker, TreeNode::marker(marker)));
                self.ignore(id);
            }
        }
        Stage::SkipSend
    }

    fn send_token(&mut self, lexeme: Lexeme) -> NodeId {
        let id = self.alloc(StackNode::new(
            lexeme.id,
            TreeNode::token(lexeme.id, lexeme.text),
        ));
        self.steps += 1;
        if self.cs.is_some() {
            self.set_region(id);
        }
        id
    }

    fn send_tree(&mut self, tree: Tree) -> NodeId {
        self.steps += 1;
        self.alloc(StackNode::artificial(tree.id(), tree))
    }

    fn send_eof(&mut self, input: &dyn TokenSource) -> NodeId {
        let eof = self.eof;
        self.steps += 1;
        self.alloc(StackNode::new(
            eof,
            TreeNode::token(eof, TokenText::new("", Some(input.location()))),
        ))
    }
}
