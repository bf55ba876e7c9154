//! # Root Page Table
//!
//! Size of the top-level translation table for one
//! [`PagingGeometry`]. The model is purely computed; it owns no memory.

use crate::geometry::PagingGeometry;

/// Bytes per word of a page-table entry.
pub const WORD_SIZE: u64 = 4;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RootPageTable {
    geometry: PagingGeometry,
}

impl RootPageTable {
    #[must_use]
    pub const fn new(geometry: PagingGeometry) -> Self {
        Self { geometry }
    }

    /// `2^index_bits`.
    #[must_use]
    pub const fn entry_count(&self) -> u64 {
        1 << self.geometry.index_bits
    }

    #[must_use]
    pub const fn entry_size_bytes(&self) -> u64 {
        self.geometry.entry_size_in_words as u64 * WORD_SIZE
    }

    #[must_use]
    pub const fn table_size_bytes(&self) -> u64 {
        self.entry_count() * self.entry_size_bytes()
    }
}
