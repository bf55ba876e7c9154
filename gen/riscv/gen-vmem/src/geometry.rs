//! # Paging Geometry
//!
//! Descriptors of the two address-translation layouts the generator places
//! root tables for. The choice is closed: RV32 harts use [`PagingMode::Sv32`],
//! everything else uses [`PagingMode::Sv48`].

/// Shape of one translation mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PagingGeometry {
    /// Virtual-address bits consumed per table level.
    pub index_bits: u32,
    /// Width of a physical address, in bits.
    pub physical_address_width: u32,
    /// Width of a virtual address, in bits.
    pub virtual_address_width: u32,
    /// Optional ISA extension the mode depends on.
    pub extension_label: Option<&'static str>,
    /// Number of table levels walked.
    pub level_count: u32,
    /// Size of one page-table entry, in 32-bit words.
    pub entry_size_in_words: u32,
}

impl PagingGeometry {
    /// Panics (at compile time when used in a `const`) if `level_count == 0`
    /// or `index_bits == 0`.
    #[must_use]
    pub const fn new(
        index_bits: u32,
        physical_address_width: u32,
        virtual_address_width: u32,
        extension_label: Option<&'static str>,
        level_count: u32,
        entry_size_in_words: u32,
    ) -> Self {
        assert!(level_count >= 1, "paging needs at least one level");
        assert!(index_bits > 0, "table index must be at least one bit wide");
        assert!(index_bits < virtual_address_width);
        Self {
            index_bits,
            physical_address_width,
            virtual_address_width,
            extension_label,
            level_count,
            entry_size_in_words,
        }
    }

    /// Highest physical address reachable in this mode.
    #[must_use]
    pub const fn max_physical_address(&self) -> u64 {
        if self.physical_address_width >= u64::BITS {
            u64::MAX
        } else {
            (1 << self.physical_address_width) - 1
        }
    }
}

/// Sv32: two levels of 1024 four-byte entries, 34-bit physical addresses.
pub const SV32: PagingGeometry = PagingGeometry::new(10, 34, 32, None, 2, 1);

/// Sv48-style layout used on 64-bit harts: 512-entry root table.
pub const SV48: PagingGeometry = PagingGeometry::new(9, 56, 48, None, 3, 3);

/// The supported translation layouts.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PagingMode {
    Sv32,
    Sv48,
}

impl PagingMode {
    /// Select the mode for the current addressing width.
    #[must_use]
    pub const fn for_rv32(rv32: bool) -> Self {
        if rv32 { Self::Sv32 } else { Self::Sv48 }
    }

    #[must_use]
    pub const fn geometry(self) -> &'static PagingGeometry {
        match self {
            Self::Sv32 => &SV32,
            Self::Sv48 => &SV48,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sv32 => "Sv32",
            Self::Sv48 => "Sv48",
        }
    }
}

impl core::fmt::Display for PagingMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
