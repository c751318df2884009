//! On-demand stack growth for recursive tree walks.
//!
//! Parse trees have no depth limit: a right-recursive grammar fed a long
//! list produces a spine as deep as the list. Text flattening, commit
//! marking and node release all recurse over that spine.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 64 * 1024;

/// Size of each freshly allocated stack segment.
const SEGMENT: usize = 1024 * 1024;

/// Run `f`, first switching to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
pub(crate) fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}
