//! The scanner seam.
//!
//! Table-driven scanner execution belongs to the host. The engine only
//! needs to ask "what token starts here, in this region?", which is the
//! [`Lexer`] trait. [`LiteralLexer`] is a small rule-based implementation
//! good enough for tests and simple hosts.

use rustc_hash::FxHashMap;
use rewind_tables::{RegionId, SymbolId};

/// Result of scanning the front of the input in one region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LexOutcome {
    /// `len` bytes (non-zero) form `token`.
    Match { token: SymbolId, len: usize },
    /// The text so far could still grow into a longer match.
    Partial,
    /// Nothing in the region matches.
    Error,
}

/// Tokenizer for scanning regions.
pub trait Lexer {
    /// Scan the start of `text` in `region`. When `bounded` is set no more
    /// text will follow, so the lexer must decide instead of returning
    /// [`LexOutcome::Partial`].
    fn scan(&self, region: RegionId, text: &str, bounded: bool) -> LexOutcome;
}

#[derive(Clone, Debug)]
enum Pattern {
    Literal(String),
    /// One or more characters satisfying the predicate.
    Repeat(fn(char) -> bool),
}

#[derive(Clone, Debug)]
struct Rule {
    pattern: Pattern,
    token: SymbolId,
}

/// Longest-match lexer over literal strings and character classes.
///
/// Ties on length go to the rule added first.
#[derive(Clone, Debug, Default)]
pub struct LiteralLexer {
    regions: FxHashMap<RegionId, Vec<Rule>>,
}

impl LiteralLexer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn literal(mut self, region: RegionId, text: &str, token: SymbolId) -> Self {
        self.regions.entry(region).or_default().push(Rule {
            pattern: Pattern::Literal(text.to_owned()),
            token,
        });
        self
    }

    #[must_use]
    pub fn repeat(mut self, region: RegionId, class: fn(char) -> bool, token: SymbolId) -> Self {
        self.regions.entry(region).or_default().push(Rule {
            pattern: Pattern::Repeat(class),
            token,
        });
        self
    }
}

impl Lexer for LiteralLexer {
    fn scan(&self, region: RegionId, text: &str, bounded: bool) -> LexOutcome {
        let Some(rules) = self.regions.get(&region) else {
            return LexOutcome::Error;
        };
        if text.is_empty() {
            return if bounded {
                LexOutcome::Error
            } else {
                LexOutcome::Partial
            };
        }

        let mut best: Option<(SymbolId, usize)> = None;
        let mut may_grow = false;
        for rule in rules {
            let len = match &rule.pattern {
                Pattern::Literal(lit) => {
                    if text.starts_with(lit.as_str()) {
                        lit.len()
                    } else {
                        may_grow |= lit.starts_with(text);
                        0
                    }
                }
                Pattern::Repeat(class) => {
                    let len: usize = text
                        .chars()
                        .take_while(|&c| class(c))
                        .map(char::len_utf8)
                        .sum();
                    may_grow |= len == text.len();
                    len
                }
            };
            let longer = match best {
                Some((_, best_len)) => len > best_len,
                None => len > 0,
            };
            if longer {
                best = Some((rule.token, len));
            }
        }

        if may_grow && !bounded {
            return LexOutcome::Partial;
        }
        match best {
            Some((token, len)) => LexOutcome::Match { token, len },
            None => LexOutcome::Error,
        }
    }
}
