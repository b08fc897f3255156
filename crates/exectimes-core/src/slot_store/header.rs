//! Header layout and slot offsets
//!
//! The first `HEADER_WIDTH` bytes of the lock file hold one native-endian
//! machine word: the highest byte offset ever used as a slot. Slots follow
//! at `HEADER_WIDTH`, `HEADER_WIDTH + 1`, ... and carry no data; a slot is
//! occupied while some process holds an exclusive lock on its byte.

use std::fmt;

/// Width of the header word, also the width used for offset arithmetic
pub const HEADER_WIDTH: usize = std::mem::size_of::<usize>();

/// Byte offset of a slot within the lock file.
///
/// Always at least `HEADER_WIDTH`, so no slot can alias the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotOffset(usize);

impl SlotOffset {
    /// The first slot, also the header value of a store nobody has grown
    pub const FIRST: Self = Self(HEADER_WIDTH);

    /// Offset `offset`, if it lies past the header
    pub const fn new(offset: usize) -> Option<Self> {
        if offset >= HEADER_WIDTH {
            Some(Self(offset))
        } else {
            None
        }
    }

    /// Offset for the 1-based slot `index`
    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| i.checked_add(HEADER_WIDTH))
            .map(Self)
    }

    pub const fn get(self) -> usize {
        self.0
    }

    /// Offset as a file position
    pub const fn position(self) -> u64 {
        self.0 as u64
    }

    /// 1-based slot number shown to users
    pub const fn index(self) -> usize {
        self.0 - HEADER_WIDTH + 1
    }
}

impl fmt::Display for SlotOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {} (offset {})", self.index(), self.0)
    }
}

/// Encode a header value
pub fn encode(max_idx: SlotOffset) -> [u8; HEADER_WIDTH] {
    max_idx.get().to_ne_bytes()
}

/// Decode a header value.
///
/// A value below `HEADER_WIDTH` cannot have been written by a cooperating
/// process; it is clamped to [`SlotOffset::FIRST`].
pub fn decode(bytes: [u8; HEADER_WIDTH]) -> SlotOffset {
    let raw = usize::from_ne_bytes(bytes);
    match SlotOffset::new(raw) {
        Some(offset) => offset,
        None => {
            tracing::warn!(raw, "header value below header width, treating as empty store");
            SlotOffset::FIRST
        }
    }
}
