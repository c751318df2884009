//! Compact IDs for everything a grammar table names.
//!
//! Every ID is a `u32` newtype indexing a dense vector inside [`Tables`].
//! Equality and hashing are plain integer operations, so IDs are used as
//! map keys on the hot lookup path without any indirection.
//!
//! [`Tables`]: crate::Tables

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an ID from its raw value.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                $name(raw)
            }

            /// Create an ID from a vector index.
            #[inline]
            #[expect(
                clippy::cast_possible_truncation,
                reason = "table vectors are bounded by u32 ids at build time"
            )]
            pub const fn from_index(index: usize) -> Self {
                $name(index as u32)
            }

            /// Index into the owning table vector.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Language element: a terminal, an ignore token, or a non-terminal.
    ///
    /// Terminals always sort below [`Tables::first_non_term_id`](crate::Tables::first_non_term_id).
    SymbolId,
    "SymbolId"
);

define_id!(
    /// Parser automaton state.
    StateId,
    "StateId"
);

define_id!(
    /// Grammar production.
    ProdId,
    "ProdId"
);

define_id!(
    /// Scanning region (a lexical mode).
    RegionId,
    "RegionId"
);

define_id!(
    /// Handle of a host-side semantic action.
    ///
    /// The runtime never interprets frames; it only suspends with the frame
    /// so the host can run whatever code it associates with it.
    FrameId,
    "FrameId"
);

define_id!(
    /// One of several entry points compiled into the same tables.
    ParserId,
    "ParserId"
);

/// Position in the flattened, zero-terminated region list.
///
/// Each state owns a run of consecutive slots followed by an empty slot.
/// Slot 0 is always empty, so "no region" and "end of this state's list"
/// read the same way.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(transparent)]
pub struct RegionSlot(u32);

impl RegionSlot {
    /// The reserved empty slot.
    pub const NONE: RegionSlot = RegionSlot(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        RegionSlot(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// The slot after this one, or [`RegionSlot::NONE`] when this slot is
    /// itself empty.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        if self.0 == 0 {
            RegionSlot::NONE
        } else {
            RegionSlot(self.0 + 1)
        }
    }
}

impl fmt::Debug for RegionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "RegionSlot::NONE")
        } else {
            write!(f, "RegionSlot({})", self.0)
        }
    }
}
