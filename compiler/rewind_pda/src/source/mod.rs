//! Token acquisition for the controller.
//!
//! [`TokenSource`] is everything the engine needs from the input side:
//! produce the next item for a scanning region, and take consumed items
//! back while backtracking. [`StreamSource`] implements it over an
//! [`InputStream`] and a [`Lexer`].

use rewind_tables::{RegionId, SymbolId, Tables};
use tracing::trace;

use crate::input::{Front, InputStream};
use crate::lexer::{LexOutcome, Lexer};
use crate::tree::{Location, TokenText, Tree};

/// Where to scan: the current region and the pre-region tried before it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScanRequest {
    pub region: Option<RegionId>,
    pub pre_region: Option<RegionId>,
}

/// A scanned token with its consumed text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexeme {
    pub id: SymbolId,
    pub text: TokenText,
}

/// One step of token acquisition.
#[derive(Debug)]
pub enum Scanned {
    Token(Lexeme),
    /// Ignored text. `trailing` is set when the pre-region scanned it, which
    /// lets it decorate the token before it.
    Ignore { lexeme: Lexeme, trailing: bool },
    /// Pre-built tree supplied by the host.
    Tree(Tree),
    /// Pre-built tree to be treated as ignored input.
    IgnoreTree(Tree),
    /// Request to start undoing; produced by the controller itself.
    Undo,
    /// Everything, including end-of-file, has been delivered.
    EndOfStream,
    EndOfFile,
    /// No complete token is buffered yet.
    TryAgainLater,
    /// Nothing in the region matches.
    Error,
}

/// Input side of a parse.
pub trait TokenSource {
    fn next_token(&mut self, tables: &Tables, request: ScanRequest) -> Scanned;

    /// Put consumed text back at the front.
    fn send_back_text(&mut self, text: &TokenText);
    fn send_back_tree(&mut self, tree: Tree);
    fn send_back_ignore_tree(&mut self, tree: Tree);

    /// Consume `len` bytes without lexing them.
    fn pull_text(&mut self, len: usize) -> Option<TokenText>;
    /// Consume one character without lexing it.
    fn pull_char(&mut self) -> Option<TokenText>;
    /// Insert host-produced text at the front.
    fn push_text(&mut self, text: &str);
    /// Insert a host-produced tree at the front.
    fn push_tree(&mut self, tree: Tree);

    fn location(&self) -> Location;
    fn eof_sent(&self) -> bool;
    fn set_eof_sent(&mut self, sent: bool);
    /// Mark the input as complete.
    fn finish(&mut self);
}

/// [`TokenSource`] over a buffered stream and a lexer.
#[derive(Debug)]
pub struct StreamSource<L> {
    input: InputStream,
    lexer: L,
}

impl<L: Lexer> StreamSource<L> {
    pub fn new(lexer: L) -> Self {
        StreamSource {
            input: InputStream::new(),
            lexer,
        }
    }

    /// Convenience constructor for a complete, finished input.
    pub fn from_text(lexer: L, text: &str) -> Self {
        let mut source = Self::new(lexer);
        source.input.append_text(text);
        source.input.finish();
        source
    }

    pub fn input(&self) -> &InputStream {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputStream {
        &mut self.input
    }

    pub fn append_text(&mut self, text: &str) {
        self.input.append_text(text);
    }

    /// Scan in the pre-region, falling through to the main region. Also
    /// reports whether the pre-region produced the outcome.
    fn lex(
        &self,
        request: ScanRequest,
        text: &str,
        bounded: bool,
    ) -> (LexOutcome, Option<RegionId>, bool) {
        let Some(region) = request.region else {
            return (LexOutcome::Error, None, false);
        };
        if let Some(pre) = request.pre_region {
            let outcome = self.lexer.scan(pre, text, bounded);
            if outcome != LexOutcome::Error {
                return (outcome, Some(region), true);
            }
        }
        (self.lexer.scan(region, text, bounded), Some(region), false)
    }
}

impl<L: Lexer> TokenSource for StreamSource<L> {
    fn next_token(&mut self, tables: &Tables, request: ScanRequest) -> Scanned {
        let (outcome, region, from_pre) = match self.input.front() {
            None => {
                return if !self.input.is_finished() {
                    Scanned::TryAgainLater
                } else if self.input.eof_sent() {
                    Scanned::EndOfStream
                } else {
                    Scanned::EndOfFile
                };
            }
            Some(Front::Tree(_)) => {
                return self.input.pull_tree().map_or(Scanned::Error, Scanned::Tree);
            }
            Some(Front::IgnoreTree(_)) => {
                return self
                    .input
                    .pull_tree()
                    .map_or(Scanned::Error, Scanned::IgnoreTree);
            }
            Some(Front::Text { text, bounded }) => self.lex(request, text, bounded),
        };
        trace!(?request, ?outcome, from_pre, "scan");

        match outcome {
            LexOutcome::Match { token, len } if len > 0 => {
                let Some(text) = self.input.consume(len) else {
                    return Scanned::Error;
                };
                let lexeme = Lexeme { id: token, text };
                if tables.is_ignore(token) {
                    Scanned::Ignore {
                        lexeme,
                        trailing: from_pre,
                    }
                } else {
                    Scanned::Token(lexeme)
                }
            }
            LexOutcome::Partial => Scanned::TryAgainLater,
            LexOutcome::Match { .. } | LexOutcome::Error => {
                let default = region
                    .and_then(|r| tables.region(r))
                    .and_then(|r| r.default_token);
                match default {
                    Some(id) => Scanned::Token(Lexeme {
                        id,
                        text: TokenText::new("", Some(self.input.position())),
                    }),
                    None => Scanned::Error,
                }
            }
        }
    }

    fn send_back_text(&mut self, text: &TokenText) {
        self.input.prepend_text(text.as_str(), text.location());
    }

    fn send_back_tree(&mut self, tree: Tree) {
        self.input.prepend_tree(tree);
    }

    fn send_back_ignore_tree(&mut self, tree: Tree) {
        self.input.prepend_ignore_tree(tree);
    }

    fn pull_text(&mut self, len: usize) -> Option<TokenText> {
        self.input.consume(len)
    }

    fn pull_char(&mut self) -> Option<TokenText> {
        let len = self.input.first_char_len()?;
        self.input.consume(len)
    }

    fn push_text(&mut self, text: &str) {
        self.input.prepend_text(text, None);
    }

    fn push_tree(&mut self, tree: Tree) {
        self.input.prepend_tree(tree);
    }

    fn location(&self) -> Location {
        self.input.position()
    }

    fn eof_sent(&self) -> bool {
        self.input.eof_sent()
    }

    fn set_eof_sent(&mut self, sent: bool) {
        self.input.set_eof_sent(sent);
    }

    fn finish(&mut self) {
        self.input.finish();
    }
}
