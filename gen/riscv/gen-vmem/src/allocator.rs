//! # Page Table Allocation
//!
//! The [`PageTableAllocator`] capability reserves physical memory for a
//! translation table and programs the table's page number into a register.
//! [`MemoryManager`] implements it on top of per-bank free ranges.
//!
//! A reservation either succeeds completely (free ranges shrink, the register
//! field is written) or fails without any visible change.

use crate::{PAGE_SIZE, PhysicalAddress};
use gen_constraint::ConstraintSet;
use gen_registers::{RegisterError, RegisterFile};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt;

/// Field that receives the root table page number.
pub const PPN_FIELD: &str = "PPN";

/// Physical memory banks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum MemoryBank {
    Default,
}

impl MemoryBank {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "Default",
        }
    }
}

impl fmt::Display for MemoryBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    /// No 4 KiB-aligned free range of the requested size lies inside the
    /// usable constraint.
    #[error("no free {size:#x}-byte range in the {bank} bank within the usable constraint")]
    Exhausted { size: u64, bank: MemoryBank },
    #[error("memory bank {0} is not managed")]
    UnknownBank(MemoryBank),
    #[error(transparent)]
    Register(#[from] RegisterError),
}

/// Reserve memory for a page table and publish its base in a register.
pub trait PageTableAllocator {
    /// Reserve `size` bytes, 4 KiB-aligned, from `bank`, restricted to
    /// `usable`, and write the page number of the base into the `PPN` field
    /// of `register`.
    ///
    /// # Errors
    /// - [`AllocationError::Exhausted`] if no suitable range exists.
    /// - [`AllocationError::UnknownBank`] if `bank` is not managed.
    /// - [`AllocationError::Register`] if `register` has no `PPN` field or the
    ///   page number does not fit.
    fn reserve(
        &mut self,
        size: u64,
        bank: MemoryBank,
        register: &str,
        usable: ConstraintSet,
        registers: &mut RegisterFile,
    ) -> Result<PhysicalAddress, AllocationError>;
}

/// Free-range bookkeeping for the physical memory banks.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryManager {
    banks: BTreeMap<MemoryBank, ConstraintSet>,
}

impl MemoryManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Manage `bank` with the given free ranges, replacing earlier ones.
    #[must_use]
    pub fn with_bank(mut self, bank: MemoryBank, free: ConstraintSet) -> Self {
        self.banks.insert(bank, free);
        self
    }

    /// Ranges of `bank` that are still free.
    #[must_use]
    pub fn free_ranges(&self, bank: MemoryBank) -> Option<&ConstraintSet> {
        self.banks.get(&bank)
    }
}

impl PageTableAllocator for MemoryManager {
    fn reserve(
        &mut self,
        size: u64,
        bank: MemoryBank,
        register: &str,
        mut usable: ConstraintSet,
        registers: &mut RegisterFile,
    ) -> Result<PhysicalAddress, AllocationError> {
        let free = self
            .banks
            .get_mut(&bank)
            .ok_or(AllocationError::UnknownBank(bank))?;

        usable.apply(free);
        let Some(base) = usable.find_aligned(size, PAGE_SIZE) else {
            warn!("{bank} bank: no {size:#x}-byte page table range in [{usable}]");
            return Err(AllocationError::Exhausted { size, bank });
        };
        let base = PhysicalAddress::new(base);

        // Publish first so a rejected write leaves the free ranges untouched.
        registers.set_field_value(register, PPN_FIELD, base.page_number())?;
        free.subtract_range(base.as_u64(), base.as_u64() + (size - 1));

        debug!("{bank} bank: {size:#x}-byte page table at {base} -> {register}.{PPN_FIELD}");
        Ok(base)
    }
}
