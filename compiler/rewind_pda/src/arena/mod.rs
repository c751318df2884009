//! Block arena for parse-stack nodes.
//!
//! Stack nodes are allocated and released at a very high rate while the
//! engine shifts, reduces and backtracks. They live in fixed-size blocks
//! that are never returned to the allocator; released slots go on a free
//! list and are handed out again first.
//!
//! Handles are generational: releasing a slot bumps its generation, so a
//! handle kept past its node's release no longer resolves.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Slots per block.
pub(crate) const BLOCK_SIZE: usize = 256;

/// Handle to a node in an [`Arena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    const fn slot(self) -> (usize, usize) {
        let index = self.index as usize;
        (index / BLOCK_SIZE, index % BLOCK_SIZE)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Pool of `T` values addressed by [`NodeId`].
pub struct Arena<T> {
    blocks: Vec<Vec<Slot<T>>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            blocks: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store `value`, reusing a released slot when one exists.
    pub fn alloc(&mut self, value: T) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let id = NodeId {
                index,
                generation: 0,
            };
            let (block, offset) = id.slot();
            let slot = &mut self.blocks[block][offset];
            slot.value = Some(value);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let full = match self.blocks.last() {
            Some(block) => block.len() == BLOCK_SIZE,
            None => true,
        };
        if full {
            self.blocks.push(Vec::with_capacity(BLOCK_SIZE));
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "node count is bounded far below u32::MAX"
        )]
        let index = ((self.blocks.len() - 1) * BLOCK_SIZE + self.last_block_len()) as u32;
        if let Some(block) = self.blocks.last_mut() {
            block.push(Slot {
                generation: 0,
                value: Some(value),
            });
        }
        NodeId {
            index,
            generation: 0,
        }
    }

    fn last_block_len(&self) -> usize {
        self.blocks.last().map_or(0, Vec::len)
    }

    /// Take the value out and recycle its slot.
    ///
    /// Returns `None` for a handle that was already released.
    pub fn release(&mut self, id: NodeId) -> Option<T> {
        let (block, offset) = id.slot();
        let slot = self.blocks.get_mut(block)?.get_mut(offset)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(value)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        let (block, offset) = id.slot();
        let slot = self.blocks.get(block)?.get(offset)?;
        if slot.generation == id.generation {
            slot.value.as_ref()
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let (block, offset) = id.slot();
        let slot = self.blocks.get_mut(block)?.get_mut(offset)?;
        if slot.generation == id.generation {
            slot.value.as_mut()
        } else {
            None
        }
    }

    /// Number of values currently stored.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of blocks ever allocated.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("stale arena handle {id:?}"),
        }
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("stale arena handle {id:?}"),
        }
    }
}
