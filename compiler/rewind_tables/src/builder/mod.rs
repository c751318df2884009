//! Incremental construction of [`Tables`].
//!
//! Table compilers (and tests) declare symbols, productions, regions and
//! states one at a time, then call [`TablesBuilder::build`], which lays out
//! the flattened region lists and validates every cross-reference.

use rustc_hash::FxHashMap;

use crate::tables::State;
use crate::{
    FrameId, LangEl, ParserEntry, ParserId, ProdId, Production, Region, RegionId, RegionSlot,
    StateId, SymbolId, TableError, Tables, Transition,
};

#[derive(Default)]
struct StateDecl {
    transitions: Vec<(SymbolId, Transition)>,
    regions: Vec<(RegionId, Option<RegionId>)>,
}

/// Builder for [`Tables`].
#[derive(Default)]
pub struct TablesBuilder {
    lang_els: Vec<LangEl>,
    first_non_term: Option<SymbolId>,
    late_terminal: Option<String>,
    productions: Vec<Production>,
    regions: Vec<Region>,
    states: Vec<StateDecl>,
    parsers: Vec<ParserEntry>,
    no_token: Option<SymbolId>,
}

impl TablesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_symbol(&mut self, name: &str, ignore: bool, terminal: bool) -> SymbolId {
        let id = SymbolId::from_index(self.lang_els.len());
        if terminal {
            if self.first_non_term.is_some() && self.late_terminal.is_none() {
                self.late_terminal = Some(name.to_owned());
            }
        } else if self.first_non_term.is_none() {
            self.first_non_term = Some(id);
        }
        self.lang_els.push(LangEl {
            name: name.to_owned(),
            ignore,
            term_dup: None,
            generation: None,
        });
        id
    }

    /// Declare a terminal. All terminals precede the first non-terminal.
    pub fn terminal(&mut self, name: &str) -> SymbolId {
        self.push_symbol(name, false, true)
    }

    /// Declare an ignore token (whitespace, comments).
    pub fn ignore(&mut self, name: &str) -> SymbolId {
        self.push_symbol(name, true, true)
    }

    /// Declare the marker ignore symbol used for reverse code that
    /// produced no token.
    pub fn no_token(&mut self, name: &str) -> SymbolId {
        let id = self.push_symbol(name, true, true);
        self.no_token = Some(id);
        id
    }

    pub fn non_terminal(&mut self, name: &str) -> SymbolId {
        self.push_symbol(name, false, false)
    }

    /// Rename `terminal` to `dup` whenever it is shifted.
    pub fn term_dup(&mut self, terminal: SymbolId, dup: SymbolId) -> Result<(), TableError> {
        self.lang_el_mut(terminal)?.term_dup = Some(dup);
        Ok(())
    }

    /// Run `frame` whenever `terminal` is matched.
    pub fn generation(&mut self, terminal: SymbolId, frame: FrameId) -> Result<(), TableError> {
        self.lang_el_mut(terminal)?.generation = Some(frame);
        Ok(())
    }

    fn lang_el_mut(&mut self, id: SymbolId) -> Result<&mut LangEl, TableError> {
        self.lang_els
            .get_mut(id.index())
            .ok_or(TableError::UnknownSymbol(id))
    }

    pub fn production(&mut self, name: &str, lhs: SymbolId, rhs_len: usize) -> ProdId {
        let id = ProdId::from_index(self.productions.len());
        self.productions.push(Production {
            name: name.to_owned(),
            lhs,
            rhs_len,
            frame: None,
        });
        id
    }

    /// Attach a semantic action to a production.
    pub fn production_frame(&mut self, prod: ProdId, frame: FrameId) -> Result<(), TableError> {
        self.productions
            .get_mut(prod.index())
            .ok_or(TableError::UnknownProduction(prod))?
            .frame = Some(frame);
        Ok(())
    }

    pub fn region(&mut self, name: &str) -> RegionId {
        let id = RegionId::from_index(self.regions.len());
        self.regions.push(Region {
            name: name.to_owned(),
            ..Region::default()
        });
        id
    }

    pub fn region_mut(&mut self, region: RegionId) -> Result<&mut Region, TableError> {
        self.regions
            .get_mut(region.index())
            .ok_or(TableError::UnknownRegion(region))
    }

    pub fn state(&mut self) -> StateId {
        let id = StateId::from_index(self.states.len());
        self.states.push(StateDecl::default());
        id
    }

    fn state_mut(&mut self, state: StateId) -> Result<&mut StateDecl, TableError> {
        self.states
            .get_mut(state.index())
            .ok_or(TableError::UnknownState(state))
    }

    /// Regions scanned in `state`, in fallback order.
    pub fn state_regions(&mut self, state: StateId, regions: &[RegionId]) -> Result<(), TableError> {
        let decl = self.state_mut(state)?;
        decl.regions = regions.iter().map(|&r| (r, None)).collect();
        Ok(())
    }

    /// Regions scanned in `state`, each with an optional pre-region that is
    /// tried first.
    pub fn state_regions_with_pre(
        &mut self,
        state: StateId,
        regions: &[(RegionId, Option<RegionId>)],
    ) -> Result<(), TableError> {
        self.state_mut(state)?.regions = regions.to_vec();
        Ok(())
    }

    pub fn transition(
        &mut self,
        state: StateId,
        symbol: SymbolId,
        transition: Transition,
    ) -> Result<(), TableError> {
        self.state_mut(state)?.transitions.push((symbol, transition));
        Ok(())
    }

    pub fn parser(&mut self, start: StateId, eof: SymbolId) -> ParserId {
        let id = ParserId::from_index(self.parsers.len());
        self.parsers.push(ParserEntry { start, eof });
        id
    }

    fn check_symbol(&self, id: SymbolId) -> Result<(), TableError> {
        if id.index() < self.lang_els.len() {
            Ok(())
        } else {
            Err(TableError::UnknownSymbol(id))
        }
    }

    fn check_state(&self, id: StateId) -> Result<(), TableError> {
        if id.index() < self.states.len() {
            Ok(())
        } else {
            Err(TableError::UnknownState(id))
        }
    }

    fn check_region(&self, id: RegionId) -> Result<(), TableError> {
        if id.index() < self.regions.len() {
            Ok(())
        } else {
            Err(TableError::UnknownRegion(id))
        }
    }

    /// Validate and freeze the tables.
    pub fn build(self) -> Result<Tables, TableError> {
        if let Some(name) = self.late_terminal.clone() {
            return Err(TableError::TerminalAfterNonTerminal { name });
        }
        if self.parsers.is_empty() {
            return Err(TableError::NoParser);
        }
        let first_non_term = self
            .first_non_term
            .unwrap_or(SymbolId::from_index(self.lang_els.len()));

        for el in &self.lang_els {
            if let Some(dup) = el.term_dup {
                if dup < first_non_term {
                    return Err(TableError::TermDupNotNonTerminal {
                        name: el.name.clone(),
                    });
                }
                self.check_symbol(dup)?;
            }
        }
        for prod in &self.productions {
            self.check_symbol(prod.lhs)?;
            if prod.lhs < first_non_term {
                return Err(TableError::TerminalLhs {
                    name: prod.name.clone(),
                });
            }
        }
        for region in &self.regions {
            for sym in [region.default_token, region.collect_ignore]
                .into_iter()
                .flatten()
            {
                self.check_symbol(sym)?;
            }
        }
        for entry in &self.parsers {
            self.check_state(entry.start)?;
            self.check_symbol(entry.eof)?;
        }

        // Slot 0 stays empty so that "no region" terminates every list.
        let mut region_list = vec![None];
        let mut pre_region_list = vec![None];
        let mut states = Vec::with_capacity(self.states.len());
        for (index, decl) in self.states.iter().enumerate() {
            let state_id = StateId::from_index(index);
            let mut transitions = FxHashMap::default();
            for (symbol, transition) in &decl.transitions {
                self.check_symbol(*symbol)?;
                self.check_state(transition.target())?;
                if transition.actions().is_empty() {
                    return Err(TableError::EmptyActions {
                        state: state_id,
                        symbol: *symbol,
                    });
                }
                for prod in transition.actions().iter().filter_map(|a| a.reduction()) {
                    if prod.index() >= self.productions.len() {
                        return Err(TableError::UnknownProduction(prod));
                    }
                }
                transitions.insert(*symbol, transition.clone());
            }

            let regions = if decl.regions.is_empty() {
                RegionSlot::NONE
            } else {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "region list length is bounded by u32 ids"
                )]
                let slot = RegionSlot::new(region_list.len() as u32);
                for &(region, pre) in &decl.regions {
                    self.check_region(region)?;
                    if let Some(pre) = pre {
                        self.check_region(pre)?;
                    }
                    region_list.push(Some(region));
                    pre_region_list.push(pre);
                }
                region_list.push(None);
                pre_region_list.push(None);
                slot
            };
            states.push(State {
                transitions,
                regions,
            });
        }

        Ok(Tables {
            lang_els: self.lang_els,
            productions: self.productions,
            regions: self.regions,
            states,
            region_list,
            pre_region_list,
            parsers: self.parsers,
            first_non_term,
            no_token: self.no_token,
        })
    }
}
