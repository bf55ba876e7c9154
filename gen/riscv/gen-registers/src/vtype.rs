use crate::TypedRegister;
use bitfield_struct::bitfield;

/// Name of the vector type register.
pub const NAME: &str = "vtype";

/// `vtype` — Vector Type Register.
///
/// Holds the configuration that subsequent vector instructions operate
/// under. Only the low byte carries configuration; `vill` lives in bit
/// `XLEN-1` and is reached through the by-name register file instead.
#[bitfield(u64)]
#[derive(Eq, PartialEq)]
pub struct Vtype {
    /// Bits 0–1 — VLMUL: vector register group multiplier, `LMUL = 2^vlmul`.
    ///
    /// Only whole multipliers (1, 2, 4, 8) are encoded here.
    #[bits(2)]
    pub vlmul: u8,

    /// Bits 2–4 — VSEW: selected element width, `SEW = 8 · 2^vsew` bits.
    #[bits(3)]
    pub vsew: u8,

    /// Bit 5 — Reserved.
    #[bits(1)]
    __reserved0: u8,

    /// Bit 6 — VTA: tail agnostic.
    pub vta: bool,

    /// Bit 7 — VMA: mask agnostic.
    pub vma: bool,

    /// Bits 8–63 — Reserved (and `vill` at `XLEN-1`).
    #[bits(56)]
    __reserved1: u64,
}

impl Vtype {
    /// Selected element width in bits.
    #[must_use]
    pub const fn sew_bits(&self) -> u64 {
        8 << self.vsew()
    }

    /// Whole register group multiplier.
    #[must_use]
    pub const fn lmul(&self) -> u64 {
        1 << self.vlmul()
    }
}

impl TypedRegister for Vtype {
    const NAME: &'static str = NAME;

    fn from_register_value(value: u64) -> Self {
        Self::from_bits(value)
    }

    fn into_register_value(self) -> u64 {
        self.into_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoadRegister, RegisterFile, StoreRegister, Xlen};

    #[test]
    fn decodes_sew_and_lmul() {
        let v = Vtype::new().with_vsew(1).with_vlmul(1);
        assert_eq!(v.sew_bits(), 16);
        assert_eq!(v.lmul(), 2);
        assert_eq!(v.into_bits(), 0b00_0101);
    }

    #[test]
    fn typed_view_matches_named_fields() {
        let mut file = RegisterFile::riscv(Xlen::Rv32);
        Vtype::new()
            .with_vsew(3)
            .with_vlmul(2)
            .with_vta(true)
            .store(&mut file)
            .unwrap();

        assert_eq!(file.field_value(NAME, "VSEW").unwrap(), 3);
        assert_eq!(file.field_value(NAME, "VLMUL").unwrap(), 2);
        assert_eq!(file.field_value(NAME, "VTA").unwrap(), 1);
        assert_eq!(file.field_value(NAME, "VMA").unwrap(), 0);

        let back = Vtype::load(&file).unwrap();
        assert_eq!(back.sew_bits(), 64);
        assert_eq!(back.lmul(), 4);
    }
}
