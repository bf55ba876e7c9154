//! # Root Page Table Placement
//!
//! Paging helpers for the generator's RISC-V address-translation setup.
//!
//! ## What you get
//! - A closed [`PagingMode`] choice between the two supported translation
//!   layouts and their [`PagingGeometry`] descriptors.
//! - A [`RootPageTable`] model that derives the byte size of the root table.
//! - A [`PageTableAllocator`] capability and its [`MemoryManager`]
//!   implementation, which carves the table out of a memory bank and programs
//!   `satp.PPN`.
//! - A tiny [`PhysicalAddress`] newtype to keep allocated bases apart from
//!   plain integers.
//!
//! ## RISC-V Virtual Address → Root Table Index
//!
//! The root table is indexed by the top `index_bits` of the virtual address:
//!
//! ```text
//! Sv32:  | 31‒22 | 21‒12 | 11‒0   |
//!        |  VPN1 |  VPN0 | Offset |     root index = VA[31:22], 1024 entries
//!
//! Sv48:  | 47‒39 | 38‒30 | 29‒21 | 20‒12 | 11‒0   |
//!        |  VPN3 |  VPN2 |  VPN1 |  VPN0 | Offset | root index = VA[47:39], 512 entries
//! ```
//!
//! The physical base of the root table is always 4 KiB-aligned because
//! `satp` stores it as a page number.

pub mod allocator;
pub mod geometry;
pub mod root_table;

use std::fmt;

pub use crate::allocator::{AllocationError, MemoryBank, MemoryManager, PageTableAllocator};
pub use crate::geometry::{PagingGeometry, PagingMode};
pub use crate::root_table::RootPageTable;

/// Smallest translation granule and root-table alignment.
pub const PAGE_SIZE: u64 = 4096;

/// A physical byte address.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Physical page number (`address >> 12`).
    #[inline]
    #[must_use]
    pub const fn page_number(self) -> u64 {
        self.0 / PAGE_SIZE
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalAddress(0x{:016X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}
