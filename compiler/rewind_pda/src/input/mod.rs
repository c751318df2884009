//! Buffered input: text chunks interleaved with pre-built trees.
//!
//! The host appends data as it arrives; the engine consumes from the front
//! and, when backtracking, pushes consumed text and trees back onto the
//! front in reverse order. Position tracking follows consumption, and a
//! send-back restores the position recorded on the token.

use std::collections::VecDeque;

use crate::tree::{Location, TokenText, Tree};

#[derive(Debug)]
enum Item {
    Text(String),
    Tree(Tree),
    IgnoreTree(Tree),
}

/// What the front of the input currently holds.
#[derive(Debug)]
pub enum Front<'a> {
    /// Contiguous text. `bounded` is set when nothing can ever be appended
    /// to this text: the stream is finished or a tree follows it.
    Text { text: &'a str, bounded: bool },
    Tree(&'a Tree),
    IgnoreTree(&'a Tree),
}

/// Input queue with position tracking and end-of-file state.
#[derive(Debug, Default)]
pub struct InputStream {
    items: VecDeque<Item>,
    position: Location,
    finished: bool,
    eof_sent: bool,
}

impl InputStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Item::Text(last)) = self.items.back_mut() {
            last.push_str(text);
        } else {
            self.items.push_back(Item::Text(text.to_owned()));
        }
    }

    pub fn append_tree(&mut self, tree: Tree) {
        self.items.push_back(Item::Tree(tree));
    }

    pub fn append_ignore_tree(&mut self, tree: Tree) {
        self.items.push_back(Item::IgnoreTree(tree));
    }

    /// Put `text` back at the front. The position rewinds to `location`
    /// when one is known.
    pub fn prepend_text(&mut self, text: &str, location: Option<Location>) {
        if let Some(loc) = location {
            self.position = loc;
        }
        if text.is_empty() {
            return;
        }
        if let Some(Item::Text(first)) = self.items.front_mut() {
            first.insert_str(0, text);
        } else {
            self.items.push_front(Item::Text(text.to_owned()));
        }
    }

    pub fn prepend_tree(&mut self, tree: Tree) {
        self.items.push_front(Item::Tree(tree));
    }

    pub fn prepend_ignore_tree(&mut self, tree: Tree) {
        self.items.push_front(Item::IgnoreTree(tree));
    }

    /// No more data will be appended.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn eof_sent(&self) -> bool {
        self.eof_sent
    }

    pub fn set_eof_sent(&mut self, sent: bool) {
        self.eof_sent = sent;
    }

    pub fn position(&self) -> Location {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn front(&self) -> Option<Front<'_>> {
        Some(match self.items.front()? {
            Item::Text(text) => Front::Text {
                text,
                bounded: self.finished || self.items.len() > 1,
            },
            Item::Tree(tree) => Front::Tree(tree),
            Item::IgnoreTree(tree) => Front::IgnoreTree(tree),
        })
    }

    /// Consume `len` bytes of text from the front.
    ///
    /// Returns `None` when the front is not text or is shorter than `len`.
    pub fn consume(&mut self, len: usize) -> Option<TokenText> {
        let Some(Item::Text(front)) = self.items.front_mut() else {
            return None;
        };
        if len > front.len() || !front.is_char_boundary(len) {
            return None;
        }
        let rest = front.split_off(len);
        let matched = std::mem::replace(front, rest);
        if front.is_empty() {
            self.items.pop_front();
        }
        let text = TokenText::new(&matched, Some(self.position));
        self.position.advance(&matched);
        Some(text)
    }

    /// Length in bytes of the first character of text at the front.
    pub fn first_char_len(&self) -> Option<usize> {
        match self.items.front()? {
            Item::Text(text) => text.chars().next().map(char::len_utf8),
            Item::Tree(_) | Item::IgnoreTree(_) => None,
        }
    }

    /// Remove a tree from the front.
    pub fn pull_tree(&mut self) -> Option<Tree> {
        match self.items.front()? {
            Item::Tree(_) | Item::IgnoreTree(_) => match self.items.pop_front()? {
                Item::Tree(tree) | Item::IgnoreTree(tree) => Some(tree),
                Item::Text(_) => None,
            },
            Item::Text(_) => None,
        }
    }

    /// Remaining buffered text, trees skipped. Mostly for tests.
    pub fn remaining_text(&self) -> String {
        self.items
            .iter()
            .filter_map(|item| match item {
                Item::Text(text) => Some(text.as_str()),
                Item::Tree(_) | Item::IgnoreTree(_) => None,
            })
            .collect()
    }
}
