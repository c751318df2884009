//! Reference-counted parse-tree payloads.
//!
//! Stack nodes are short-lived bookkeeping; the trees they point at are what
//! the host keeps. A tree may be referenced by its stack node, by a parent
//! tree and by the host at the same time, so payloads are shared through
//! [`Rc`] and dropped when the last holder lets go.
//!
//! Children and ignore decorations change while the engine reduces and
//! un-reduces, hence the interior mutability.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rewind_tables::SymbolId;

use crate::stack::with_stack;

/// Shared handle to a payload.
pub type Tree = Rc<TreeNode>;

/// Source position of the first byte of a token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub byte: usize,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub const START: Location = Location {
        byte: 0,
        line: 1,
        column: 1,
    };

    /// Move past `text`.
    pub fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.byte += text.len();
    }

    /// The position just past `text` starting here.
    #[must_use]
    pub fn after(mut self, text: &str) -> Location {
        self.advance(text);
        self
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::START
    }
}

/// Matched text of a token plus where it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenText {
    data: Rc<str>,
    location: Option<Location>,
}

impl TokenText {
    pub fn new(data: &str, location: Option<Location>) -> Self {
        TokenText {
            data: Rc::from(data),
            location,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn location(&self) -> Option<Location> {
        self.location
    }
}

impl fmt::Debug for TokenText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.data)?;
        if let Some(loc) = self.location {
            write!(f, "@{}:{}", loc.line, loc.column)?;
        }
        Ok(())
    }
}

/// A run of ignore tokens decorating one side of a token.
#[derive(Clone, Debug)]
pub struct IgnoreList(Rc<[Tree]>);

impl IgnoreList {
    pub(crate) fn new(items: Vec<Tree>) -> Self {
        IgnoreList(items.into())
    }

    /// Ignore tokens in source order.
    pub fn items(&self) -> &[Tree] {
        &self.0
    }
}

/// Payload of a parse-tree node.
#[derive(Debug)]
pub struct TreeNode {
    id: SymbolId,
    text: Option<TokenText>,
    children: RefCell<Vec<Tree>>,
    left_ignore: RefCell<Option<IgnoreList>>,
    right_ignore: RefCell<Option<IgnoreList>>,
}

impl TreeNode {
    fn build(id: SymbolId, text: Option<TokenText>, children: Vec<Tree>) -> Tree {
        Rc::new(TreeNode {
            id,
            text,
            children: RefCell::new(children),
            left_ignore: RefCell::new(None),
            right_ignore: RefCell::new(None),
        })
    }

    /// Leaf carrying matched text.
    pub fn token(id: SymbolId, text: TokenText) -> Tree {
        Self::build(id, Some(text), Vec::new())
    }

    /// Leaf with no text at all.
    pub fn marker(id: SymbolId) -> Tree {
        Self::build(id, None, Vec::new())
    }

    /// Interior node; also how hosts build external trees to feed in.
    pub fn branch(id: SymbolId, children: Vec<Tree>) -> Tree {
        Self::build(id, None, children)
    }

    #[inline]
    pub fn id(&self) -> SymbolId {
        self.id
    }

    #[inline]
    pub fn text(&self) -> Option<&TokenText> {
        self.text.as_ref()
    }

    pub fn children(&self) -> Vec<Tree> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn left_ignore(&self) -> Option<IgnoreList> {
        self.left_ignore.borrow().clone()
    }

    pub fn right_ignore(&self) -> Option<IgnoreList> {
        self.right_ignore.borrow().clone()
    }

    pub(crate) fn set_children(&self, children: Vec<Tree>) {
        *self.children.borrow_mut() = children;
    }

    pub(crate) fn take_children(&self) -> Vec<Tree> {
        std::mem::take(&mut *self.children.borrow_mut())
    }

    pub(crate) fn set_left_ignore(&self, list: Option<IgnoreList>) {
        *self.left_ignore.borrow_mut() = list;
    }

    pub(crate) fn set_right_ignore(&self, list: Option<IgnoreList>) {
        *self.right_ignore.borrow_mut() = list;
    }

    /// Source text covered by this tree, ignore decorations included.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    pub(crate) fn write_text(&self, out: &mut String) {
        with_stack(|| {
            if let Some(left) = &*self.left_ignore.borrow() {
                for item in left.items() {
                    item.write_text(out);
                }
            }
            if let Some(text) = &self.text {
                out.push_str(text.as_str());
            }
            for child in self.children.borrow().iter() {
                child.write_text(out);
            }
            if let Some(right) = &*self.right_ignore.borrow() {
                for item in right.items() {
                    item.write_text(out);
                }
            }
        });
    }

    /// Source position just past the last byte of text in this tree.
    pub fn end_location(&self) -> Option<Location> {
        with_stack(|| {
            if let Some(right) = &*self.right_ignore.borrow() {
                if let Some(loc) = right.items().iter().rev().find_map(|t| t.end_location()) {
                    return Some(loc);
                }
            }
            if let Some(loc) = self
                .children
                .borrow()
                .iter()
                .rev()
                .find_map(|t| t.end_location())
            {
                return Some(loc);
            }
            self.text
                .as_ref()
                .and_then(|t| t.location().map(|loc| loc.after(t.as_str())))
        })
    }
}

impl Drop for TreeNode {
    /// Unlinks uniquely owned descendants one level at a time, so a spine of
    /// any depth is freed without recursion.
    fn drop(&mut self) {
        let mut pending = std::mem::take(self.children.get_mut());
        while let Some(tree) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(tree) {
                pending.append(node.children.get_mut());
            }
        }
    }
}

/// Number of live handles to `tree`.
pub fn ref_count(tree: &Tree) -> usize {
    Rc::strong_count(tree)
}
