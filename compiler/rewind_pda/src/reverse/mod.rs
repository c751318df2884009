//! Recorded reverse code.
//!
//! While a semantic action runs, the host records opaque byte groups that
//! describe how to undo what the action did. When the action returns, the
//! groups collected so far are packaged into one unit and appended to a
//! single LIFO byte buffer:
//!
//! ```text
//! [group_n][len_n] ... [group_1][len_1][unit_len]
//! ```
//!
//! Groups are stored newest first so that replaying a unit front to back
//! undoes the action's effects in reverse order. Every length is a
//! little-endian `u32` following the bytes it measures, which lets the
//! buffer be popped from the end without any side index.

use std::fmt;

const WORD: usize = 4;

/// Groups recorded by the currently running action.
#[derive(Debug, Default)]
pub(crate) struct ReverseCollect {
    groups: Vec<Vec<u8>>,
}

impl ReverseCollect {
    pub(crate) fn record(&mut self, group: &[u8]) {
        self.groups.push(group.to_vec());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.groups.clear();
    }

    fn take(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.groups)
    }
}

/// One action's worth of reverse code, in replay order.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ReverseUnit {
    groups: Vec<Vec<u8>>,
}

impl ReverseUnit {
    /// Groups in the order they must be replayed: newest recording first.
    pub fn groups(&self) -> impl Iterator<Item = &[u8]> {
        self.groups.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl fmt::Debug for ReverseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.groups()).finish()
    }
}

/// LIFO buffer of reverse-code units.
#[derive(Debug, Default)]
pub struct ReverseCode {
    data: Vec<u8>,
    units: usize,
}

fn put_word(data: &mut Vec<u8>, len: usize) {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "a single action records far less than 4 GiB"
    )]
    data.extend_from_slice(&(len as u32).to_le_bytes());
}

fn read_word(data: &[u8], end: usize) -> Option<usize> {
    let start = end.checked_sub(WORD)?;
    let mut word = [0u8; WORD];
    word.copy_from_slice(data.get(start..end)?);
    Some(u32::from_le_bytes(word) as usize)
}

impl ReverseCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Package everything collected into a unit.
    ///
    /// Returns `false`, and appends nothing, when no groups were recorded.
    pub(crate) fn make_unit(&mut self, collect: &mut ReverseCollect) -> bool {
        if collect.is_empty() {
            return false;
        }
        let start = self.data.len();
        for group in collect.take().iter().rev() {
            self.data.extend_from_slice(group);
            put_word(&mut self.data, group.len());
        }
        let body = self.data.len() - start;
        put_word(&mut self.data, body);
        self.units += 1;
        true
    }

    /// Remove the most recently made unit.
    pub fn pop_unit(&mut self) -> Option<ReverseUnit> {
        let end = self.data.len();
        let body = read_word(&self.data, end)?;
        let body_end = end - WORD;
        let body_start = body_end.checked_sub(body)?;

        // Walk the body backwards; the last group stored is the oldest.
        let mut groups = Vec::new();
        let mut cursor = body_end;
        while cursor > body_start {
            let len = read_word(&self.data, cursor)?;
            let group_end = cursor - WORD;
            let group_start = group_end.checked_sub(len)?;
            groups.push(self.data[group_start..group_end].to_vec());
            cursor = group_start;
        }
        groups.reverse();

        self.data.truncate(body_start);
        self.units -= 1;
        Some(ReverseUnit { groups })
    }

    /// Number of units held.
    pub fn len(&self) -> usize {
        self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units == 0
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.units = 0;
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
