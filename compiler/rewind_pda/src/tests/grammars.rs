//! Hand-compiled LR tables for the test grammars.

use std::sync::Arc;

use rewind_tables::{
    Action, FrameId, ParserId, ProdId, RegionId, StateId, SymbolId, Tables, TablesBuilder,
    Transition,
};

use crate::{EngineConfig, LiteralLexer, PdaRun, StreamSource};

fn is_ws(c: char) -> bool {
    c == ' ' || c == '\n' || c == '\t'
}

/// A grammar plus everything a test needs to drive it.
pub(crate) struct Fixture {
    pub tables: Arc<Tables>,
    pub parser: ParserId,
    pub lexer: LiteralLexer,
}

impl Fixture {
    pub fn pda(&self, config: EngineConfig) -> PdaRun {
        PdaRun::new(Arc::clone(&self.tables), self.parser, config).unwrap()
    }

    pub fn source(&self, text: &str) -> StreamSource<LiteralLexer> {
        StreamSource::from_text(self.lexer.clone(), text)
    }

    pub fn open_source(&self) -> StreamSource<LiteralLexer> {
        StreamSource::new(self.lexer.clone())
    }

    pub fn symbol(&self, name: &str) -> SymbolId {
        (0..)
            .map(SymbolId::new)
            .take_while(|&id| self.tables.lang_el(id).is_some())
            .find(|&id| self.tables.symbol_name(id) == name)
            .unwrap()
    }
}

/// Handles [`pair_with`] passes to its `configure` hook.
pub(crate) struct PairParts {
    pub main: RegionId,
    /// Ignore symbol no lexer rule produces.
    pub junk: SymbolId,
    /// States that scan input.
    pub states: [StateId; 3],
    /// `A -> a` and `S -> A A`.
    pub productions: [ProdId; 2],
}

/// `S' -> S eof`, `S -> A A`, `A -> a`, whitespace ignored.
///
/// `configure` may adjust regions before the tables are frozen.
pub(crate) fn pair_with(configure: impl FnOnce(&mut TablesBuilder, &PairParts)) -> Fixture {
    let mut b = TablesBuilder::new();
    let a = b.terminal("a");
    let eof = b.terminal("_eof");
    let ws = b.ignore("ws");
    let junk = b.ignore("junk");
    let s = b.non_terminal("S");
    let big_a = b.non_terminal("A");
    let p_a = b.production("A -> a", big_a, 1);
    let p_s = b.production("S -> A A", s, 2);
    let main = b.region("main");

    let s0 = b.state();
    let s1 = b.state();
    let s2 = b.state();
    let _s3 = b.state();
    for state in [s0, s1, s2] {
        b.state_regions(state, &[main]).unwrap();
    }
    b.transition(s0, a, Transition::new(s0, &[Action::ShiftReduce(p_a)]))
        .unwrap();
    b.transition(s0, big_a, Transition::shift(s1)).unwrap();
    b.transition(s0, s, Transition::shift(s2)).unwrap();
    b.transition(s1, a, Transition::new(s1, &[Action::ShiftReduce(p_a)]))
        .unwrap();
    b.transition(s1, big_a, Transition::new(s1, &[Action::ShiftReduce(p_s)]))
        .unwrap();
    b.transition(s2, eof, Transition::shift(StateId::new(3)))
        .unwrap();
    let parts = PairParts {
        main,
        junk,
        states: [s0, s1, s2],
        productions: [p_a, p_s],
    };
    configure(&mut b, &parts);
    let parser = b.parser(s0, eof);

    Fixture {
        tables: Arc::new(b.build().unwrap()),
        parser,
        lexer: LiteralLexer::new()
            .literal(main, "a", a)
            .repeat(main, is_ws, ws),
    }
}

pub(crate) fn pair() -> Fixture {
    pair_with(|_, _| {})
}

/// Options for [`conflict`].
#[derive(Copy, Clone, Default)]
pub(crate) struct ConflictOpts {
    /// Try `X -> a` before shifting `b`.
    pub reduce_first: bool,
    /// Attach an action to `X -> a`.
    pub x_action: bool,
    /// Make shifting `c` after `a b` a commit point.
    pub commit_at_c: bool,
}

pub(crate) const X_ACTION: FrameId = FrameId::new(7);

/// `S -> a b c d | X b c e`, `X -> a`.
///
/// After `a`, lookahead `b` is a shift/reduce conflict that can only be
/// resolved three tokens later.
pub(crate) fn conflict(opts: ConflictOpts) -> Fixture {
    let mut b = TablesBuilder::new();
    let ta = b.terminal("a");
    let tb = b.terminal("b");
    let tc = b.terminal("c");
    let td = b.terminal("d");
    let te = b.terminal("e");
    let eof = b.terminal("_eof");
    let ws = b.ignore("ws");
    let s = b.non_terminal("S");
    let x = b.non_terminal("X");
    let p_abcd = b.production("S -> a b c d", s, 4);
    let p_xbce = b.production("S -> X b c e", s, 4);
    let p_x = b.production("X -> a", x, 1);
    if opts.x_action {
        b.production_frame(p_x, X_ACTION).unwrap();
    }
    let main = b.region("main");

    let states: Vec<StateId> = (0..9).map(|_| b.state()).collect();
    for &state in &states[..8] {
        b.state_regions(state, &[main]).unwrap();
    }
    let st = |i: usize| states[i];

    b.transition(st(0), ta, Transition::shift(st(1))).unwrap();
    b.transition(st(0), x, Transition::shift(st(4))).unwrap();
    b.transition(st(0), s, Transition::shift(st(7))).unwrap();
    let on_b = if opts.reduce_first {
        [Action::Reduce(p_x), Action::Shift]
    } else {
        [Action::Shift, Action::Reduce(p_x)]
    };
    b.transition(st(1), tb, Transition::new(st(2), &on_b)).unwrap();
    let shift_c = Transition::shift(st(3));
    let shift_c = if opts.commit_at_c {
        shift_c.with_commit()
    } else {
        shift_c
    };
    b.transition(st(2), tc, shift_c).unwrap();
    b.transition(st(3), td, Transition::new(st(3), &[Action::ShiftReduce(p_abcd)]))
        .unwrap();
    b.transition(st(4), tb, Transition::shift(st(5))).unwrap();
    b.transition(st(5), tc, Transition::shift(st(6))).unwrap();
    b.transition(st(6), te, Transition::new(st(6), &[Action::ShiftReduce(p_xbce)]))
        .unwrap();
    b.transition(st(7), eof, Transition::shift(st(8))).unwrap();
    let parser = b.parser(st(0), eof);

    let mut lexer = LiteralLexer::new().repeat(main, is_ws, ws);
    for (text, sym) in [("a", ta), ("b", tb), ("c", tc), ("d", td), ("e", te)] {
        lexer = lexer.literal(main, text, sym);
    }
    Fixture {
        tables: Arc::new(b.build().unwrap()),
        parser,
        lexer,
    }
}

/// `L -> L a | a`, whitespace ignored.
pub(crate) fn list() -> Fixture {
    let mut b = TablesBuilder::new();
    let a = b.terminal("a");
    let eof = b.terminal("_eof");
    let ws = b.ignore("ws");
    let l = b.non_terminal("L");
    let p_one = b.production("L -> a", l, 1);
    let p_more = b.production("L -> L a", l, 2);
    let main = b.region("main");
    let s0 = b.state();
    let s1 = b.state();
    let s2 = b.state();
    b.state_regions(s0, &[main]).unwrap();
    b.state_regions(s1, &[main]).unwrap();
    b.transition(s0, a, Transition::new(s0, &[Action::ShiftReduce(p_one)]))
        .unwrap();
    b.transition(s0, l, Transition::shift(s1)).unwrap();
    b.transition(s1, a, Transition::new(s1, &[Action::ShiftReduce(p_more)]))
        .unwrap();
    b.transition(s1, eof, Transition::shift(s2)).unwrap();
    let parser = b.parser(s0, eof);
    Fixture {
        tables: Arc::new(b.build().unwrap()),
        parser,
        lexer: LiteralLexer::new()
            .literal(main, "a", a)
            .repeat(main, is_ws, ws),
    }
}

/// Two regions in the start state: `wide` scans `ab` as one token, `narrow`
/// scans `a` and `b` separately. Only `S -> y z` is valid.
pub(crate) struct RegionFixture {
    pub fixture: Fixture,
    pub wide: RegionId,
    pub narrow: RegionId,
}

pub(crate) fn regions() -> RegionFixture {
    let mut b = TablesBuilder::new();
    let x = b.terminal("x");
    let y = b.terminal("y");
    let z = b.terminal("z");
    let eof = b.terminal("_eof");
    let s = b.non_terminal("S");
    let p_s = b.production("S -> y z", s, 2);
    let wide = b.region("wide");
    let narrow = b.region("narrow");
    let s0 = b.state();
    let s1 = b.state();
    let s2 = b.state();
    let s3 = b.state();
    b.state_regions(s0, &[wide, narrow]).unwrap();
    b.state_regions(s1, &[narrow]).unwrap();
    b.state_regions(s2, &[narrow]).unwrap();
    b.transition(s0, y, Transition::shift(s1)).unwrap();
    b.transition(s0, s, Transition::shift(s2)).unwrap();
    b.transition(s1, z, Transition::new(s1, &[Action::ShiftReduce(p_s)]))
        .unwrap();
    b.transition(s2, eof, Transition::shift(s3)).unwrap();
    let parser = b.parser(s0, eof);
    RegionFixture {
        fixture: Fixture {
            tables: Arc::new(b.build().unwrap()),
            parser,
            lexer: LiteralLexer::new()
                .literal(wide, "ab", x)
                .literal(narrow, "a", y)
                .literal(narrow, "b", z),
        },
        wide,
        narrow,
    }
}

/// `S -> a k` where `k` is the collect-ignore token of `gap`, a region
/// with no scanner rules.
pub(crate) fn collect_ignore() -> Fixture {
    let mut b = TablesBuilder::new();
    let a = b.terminal("a");
    let k = b.terminal("k");
    let eof = b.terminal("_eof");
    let ws = b.ignore("ws");
    let s = b.non_terminal("S");
    let p_s = b.production("S -> a k", s, 2);
    let main = b.region("main");
    let gap = b.region("gap");
    b.region_mut(gap).unwrap().collect_ignore = Some(k);
    let s0 = b.state();
    let s1 = b.state();
    let s2 = b.state();
    let s3 = b.state();
    b.state_regions(s0, &[main]).unwrap();
    b.state_regions(s1, &[gap]).unwrap();
    b.state_regions(s2, &[main]).unwrap();
    b.transition(s0, a, Transition::shift(s1)).unwrap();
    b.transition(s0, s, Transition::shift(s2)).unwrap();
    b.transition(s1, k, Transition::new(s1, &[Action::ShiftReduce(p_s)]))
        .unwrap();
    b.transition(s2, eof, Transition::shift(s3)).unwrap();
    let parser = b.parser(s0, eof);
    Fixture {
        tables: Arc::new(b.build().unwrap()),
        parser,
        lexer: LiteralLexer::new()
            .literal(main, "a", a)
            .repeat(main, is_ws, ws),
    }
}

/// `S -> x | y` with two regions in the start state: `spaced` scans only
/// whitespace and `a`, `joined` scans ` b` as `x` and `b` as `y`.
pub(crate) fn joined_regions() -> Fixture {
    let mut b = TablesBuilder::new();
    let a = b.terminal("a");
    let x = b.terminal("x");
    let y = b.terminal("y");
    let eof = b.terminal("_eof");
    let ws = b.ignore("ws");
    let s = b.non_terminal("S");
    let p_x = b.production("S -> x", s, 1);
    let p_y = b.production("S -> y", s, 1);
    let spaced = b.region("spaced");
    let joined = b.region("joined");
    let s0 = b.state();
    let s1 = b.state();
    let s2 = b.state();
    b.state_regions(s0, &[spaced, joined]).unwrap();
    b.state_regions(s1, &[spaced]).unwrap();
    b.transition(s0, x, Transition::new(s0, &[Action::ShiftReduce(p_x)]))
        .unwrap();
    b.transition(s0, y, Transition::new(s0, &[Action::ShiftReduce(p_y)]))
        .unwrap();
    b.transition(s0, s, Transition::shift(s1)).unwrap();
    b.transition(s1, eof, Transition::shift(s2)).unwrap();
    let parser = b.parser(s0, eof);
    Fixture {
        tables: Arc::new(b.build().unwrap()),
        parser,
        lexer: LiteralLexer::new()
            .repeat(spaced, is_ws, ws)
            .literal(spaced, "a", a)
            .literal(joined, " b", x)
            .literal(joined, "b", y),
    }
}

/// `S -> a B`, `B -> b`, where whitespace is only scanned by the pre-region
/// `trail`. `S` is reduced on the end-of-file lookahead.
pub(crate) fn trailing() -> Fixture {
    let mut b = TablesBuilder::new();
    let a = b.terminal("a");
    let tb = b.terminal("b");
    let eof = b.terminal("_eof");
    let ws = b.ignore("ws");
    let s = b.non_terminal("S");
    let big_b = b.non_terminal("B");
    let p_b = b.production("B -> b", big_b, 1);
    let p_s = b.production("S -> a B", s, 2);
    let main = b.region("main");
    let trail = b.region("trail");
    let states: Vec<StateId> = (0..5).map(|_| b.state()).collect();
    for &state in &states[..4] {
        b.state_regions_with_pre(state, &[(main, Some(trail))]).unwrap();
    }
    b.transition(states[0], a, Transition::shift(states[1])).unwrap();
    b.transition(states[0], s, Transition::shift(states[3])).unwrap();
    b.transition(states[1], tb, Transition::new(states[1], &[Action::ShiftReduce(p_b)]))
        .unwrap();
    b.transition(states[1], big_b, Transition::shift(states[2])).unwrap();
    b.transition(states[2], eof, Transition::new(states[2], &[Action::Reduce(p_s)]))
        .unwrap();
    b.transition(states[3], eof, Transition::shift(states[4])).unwrap();
    let parser = b.parser(states[0], eof);
    Fixture {
        tables: Arc::new(b.build().unwrap()),
        parser,
        lexer: LiteralLexer::new()
            .literal(main, "a", a)
            .literal(main, "b", tb)
            .repeat(trail, is_ws, ws),
    }
}

/// `S -> a m c` where `m` is the default token of the region scanned after
/// `a`.
pub(crate) fn default_token() -> Fixture {
    let mut b = TablesBuilder::new();
    let a = b.terminal("a");
    let m = b.terminal("m");
    let c = b.terminal("c");
    let eof = b.terminal("_eof");
    let s = b.non_terminal("S");
    let p_s = b.production("S -> a m c", s, 3);
    let main = b.region("main");
    let marker = b.region("marker");
    b.region_mut(marker).unwrap().default_token = Some(m);
    let states: Vec<StateId> = (0..5).map(|_| b.state()).collect();
    b.state_regions(states[0], &[main]).unwrap();
    b.state_regions(states[1], &[marker]).unwrap();
    b.state_regions(states[2], &[main]).unwrap();
    b.state_regions(states[3], &[main]).unwrap();
    b.transition(states[0], a, Transition::shift(states[1])).unwrap();
    b.transition(states[0], s, Transition::shift(states[3])).unwrap();
    b.transition(states[1], m, Transition::shift(states[2])).unwrap();
    b.transition(states[2], c, Transition::new(states[2], &[Action::ShiftReduce(p_s)]))
        .unwrap();
    b.transition(states[3], eof, Transition::shift(states[4])).unwrap();
    let parser = b.parser(states[0], eof);
    Fixture {
        tables: Arc::new(b.build().unwrap()),
        parser,
        lexer: LiteralLexer::new()
            .literal(main, "a", a)
            .literal(main, "c", c)
            .literal(marker, "m", m),
    }
}

/// `S -> t u` where `t` is renamed to the non-terminal `T` once shifted.
pub(crate) fn term_dup() -> Fixture {
    let mut b = TablesBuilder::new();
    let t = b.terminal("t");
    let u = b.terminal("u");
    let eof = b.terminal("_eof");
    let ws = b.ignore("ws");
    let big_t = b.non_terminal("T");
    let s = b.non_terminal("S");
    b.term_dup(t, big_t).unwrap();
    let p_s = b.production("S -> t u", s, 2);
    let main = b.region("main");
    let s0 = b.state();
    let s1 = b.state();
    let s2 = b.state();
    let s3 = b.state();
    for state in [s0, s1, s2] {
        b.state_regions(state, &[main]).unwrap();
    }
    b.transition(s0, t, Transition::shift(s1)).unwrap();
    b.transition(s0, big_t, Transition::shift(s1)).unwrap();
    b.transition(s0, s, Transition::shift(s2)).unwrap();
    b.transition(s1, u, Transition::new(s1, &[Action::ShiftReduce(p_s)]))
        .unwrap();
    b.transition(s2, eof, Transition::shift(s3)).unwrap();
    let parser = b.parser(s0, eof);
    Fixture {
        tables: Arc::new(b.build().unwrap()),
        parser,
        lexer: LiteralLexer::new()
            .literal(main, "t", t)
            .literal(main, "u", u)
            .repeat(main, is_ws, ws),
    }
}

pub(crate) const GEN_ACTION: FrameId = FrameId::new(1);
pub(crate) const EOF_ACTION: FrameId = FrameId::new(2);

/// `S -> a` where the scanner sees `x`, whose generation action rewrites
/// it to `a`. The main region runs a pre-EOF action.
///
/// With `commit`, shifting `a` is a commit point.
pub(crate) fn generation(commit: bool) -> Fixture {
    let mut b = TablesBuilder::new();
    let a = b.terminal("a");
    let g = b.terminal("x");
    let eof = b.terminal("_eof");
    b.no_token("_notoken");
    let s = b.non_terminal("S");
    b.generation(g, GEN_ACTION).unwrap();
    let p_s = b.production("S -> a", s, 1);
    let main = b.region("main");
    b.region_mut(main).unwrap().eof_frame = Some(EOF_ACTION);
    let s0 = b.state();
    let s1 = b.state();
    let s2 = b.state();
    b.state_regions(s0, &[main]).unwrap();
    b.state_regions(s1, &[main]).unwrap();
    let on_a = Transition::new(s0, &[Action::ShiftReduce(p_s)]);
    let on_a = if commit { on_a.with_commit() } else { on_a };
    b.transition(s0, a, on_a).unwrap();
    b.transition(s0, s, Transition::shift(s1)).unwrap();
    b.transition(s1, eof, Transition::shift(s2)).unwrap();
    let parser = b.parser(s0, eof);
    Fixture {
        tables: Arc::new(b.build().unwrap()),
        parser,
        lexer: LiteralLexer::new()
            .literal(main, "a", a)
            .literal(main, "x", g),
    }
}
