//! The immutable, shared grammar tables.

use rustc_hash::FxHashMap;

use crate::{FrameId, ProdId, RegionId, RegionSlot, StateId, SymbolId, Transition};

/// Per-symbol metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LangEl {
    pub name: String,
    /// Ignore tokens never reach the automaton; they decorate real tokens.
    pub ignore: bool,
    /// Non-terminal a shifted terminal is renamed to.
    pub term_dup: Option<SymbolId>,
    /// Host action run when this token is matched, before it is sent.
    pub generation: Option<FrameId>,
}

/// Per-production metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production {
    pub name: String,
    pub lhs: SymbolId,
    pub rhs_len: usize,
    /// Host action run after the reduction is built.
    pub frame: Option<FrameId>,
}

/// Per-region metadata.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Region {
    pub name: String,
    /// Token produced, with empty text, when nothing in the region matches.
    pub default_token: Option<SymbolId>,
    /// Ignore token that swallows one unmatched character.
    pub collect_ignore: Option<SymbolId>,
    /// Host action run before end-of-file is delivered in this region.
    pub eof_frame: Option<FrameId>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct State {
    pub(crate) transitions: FxHashMap<SymbolId, Transition>,
    pub(crate) regions: RegionSlot,
}

/// Entry point into the automaton.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParserEntry {
    pub start: StateId,
    pub eof: SymbolId,
}

/// Complete grammar tables.
///
/// Built once through [`TablesBuilder`](crate::TablesBuilder) and shared
/// read-only between any number of parse contexts.
#[derive(Clone, Debug)]
pub struct Tables {
    pub(crate) lang_els: Vec<LangEl>,
    pub(crate) productions: Vec<Production>,
    pub(crate) regions: Vec<Region>,
    pub(crate) states: Vec<State>,
    pub(crate) region_list: Vec<Option<RegionId>>,
    pub(crate) pre_region_list: Vec<Option<RegionId>>,
    pub(crate) parsers: Vec<ParserEntry>,
    pub(crate) first_non_term: SymbolId,
    pub(crate) no_token: Option<SymbolId>,
}

impl Tables {
    #[inline]
    pub fn lang_el(&self, id: SymbolId) -> Option<&LangEl> {
        self.lang_els.get(id.index())
    }

    /// Symbol name for diagnostics, `"?"` when the id is foreign.
    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.lang_el(id).map_or("?", |el| el.name.as_str())
    }

    #[inline]
    pub fn first_non_term_id(&self) -> SymbolId {
        self.first_non_term
    }

    #[inline]
    pub fn is_terminal(&self, id: SymbolId) -> bool {
        id < self.first_non_term
    }

    #[inline]
    pub fn is_ignore(&self, id: SymbolId) -> bool {
        self.lang_el(id).is_some_and(|el| el.ignore)
    }

    /// Marker symbol for reverse code that produced no token.
    #[inline]
    pub fn no_token_id(&self) -> Option<SymbolId> {
        self.no_token
    }

    #[inline]
    pub fn production(&self, id: ProdId) -> Option<&Production> {
        self.productions.get(id.index())
    }

    #[inline]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    #[inline]
    pub fn parser(&self, id: crate::ParserId) -> Option<ParserEntry> {
        self.parsers.get(id.index()).copied()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Action-table lookup.
    #[inline]
    pub fn transition(&self, state: StateId, symbol: SymbolId) -> Option<&Transition> {
        self.states.get(state.index())?.transitions.get(&symbol)
    }

    /// First slot of the region list scanned in `state`.
    #[inline]
    pub fn region_slot(&self, state: StateId) -> RegionSlot {
        self.states
            .get(state.index())
            .map_or(RegionSlot::NONE, |s| s.regions)
    }

    /// Region stored at `slot`; `None` terminates a state's list.
    #[inline]
    pub fn region_at(&self, slot: RegionSlot) -> Option<RegionId> {
        self.region_list.get(slot.index()).copied().flatten()
    }

    /// Pre-region paired with the region at `slot`.
    #[inline]
    pub fn pre_region_at(&self, slot: RegionSlot) -> Option<RegionId> {
        self.pre_region_list.get(slot.index()).copied().flatten()
    }
}
