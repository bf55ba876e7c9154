//! `satp` — Supervisor Address Translation and Protection.
//!
//! Holds the physical page number of the root page table, the address-space
//! identifier and the translation mode. The layout differs between RV32 and
//! RV64, hence two views over the same register.

use crate::TypedRegister;
use bitfield_struct::bitfield;

/// Name of the address translation register.
pub const NAME: &str = "satp";

/// Page offset bits of a root table address.
pub const PAGE_SHIFT: u32 = 12;

/// RV64 layout.
#[bitfield(u64)]
#[derive(Eq, PartialEq)]
pub struct Satp64 {
    /// Bits 0–43 — PPN: root page table physical address >> 12.
    #[bits(44)]
    pub ppn: u64,

    /// Bits 44–59 — ASID.
    #[bits(16)]
    pub asid: u16,

    /// Bits 60–63 — MODE.
    #[bits(4)]
    pub mode: u8,
}

impl Satp64 {
    /// Physical address of the root page table.
    #[must_use]
    pub const fn root_table_phys(&self) -> u64 {
        self.ppn() << PAGE_SHIFT
    }
}

impl TypedRegister for Satp64 {
    const NAME: &'static str = NAME;

    fn from_register_value(value: u64) -> Self {
        Self::from_bits(value)
    }

    fn into_register_value(self) -> u64 {
        self.into_bits()
    }
}

/// RV32 layout.
#[bitfield(u32)]
#[derive(Eq, PartialEq)]
pub struct Satp32 {
    /// Bits 0–21 — PPN: root page table physical address >> 12.
    #[bits(22)]
    pub ppn: u32,

    /// Bits 22–30 — ASID.
    #[bits(9)]
    pub asid: u16,

    /// Bit 31 — MODE.
    #[bits(1)]
    pub mode: u8,
}

impl Satp32 {
    /// Physical address of the root page table (up to 34 bits).
    #[must_use]
    pub fn root_table_phys(&self) -> u64 {
        u64::from(self.ppn()) << PAGE_SHIFT
    }
}

impl TypedRegister for Satp32 {
    const NAME: &'static str = NAME;

    #[allow(clippy::cast_possible_truncation)]
    fn from_register_value(value: u64) -> Self {
        Self::from_bits(value as u32)
    }

    fn into_register_value(self) -> u64 {
        u64::from(self.into_bits())
    }
}
