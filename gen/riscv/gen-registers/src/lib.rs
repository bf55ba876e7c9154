//! # Generator Register File
//!
//! The generator's model of architectural register state. Registers are
//! looked up by name and carry named bit fields; every write is checked
//! against the register or field width.
//!
//! Two access styles exist side by side:
//!
//! - **By name** through [`RegisterFile`], [`Register`] and
//!   [`RegisterFieldRef`], for code that is driven by register names.
//! - **Typed** through `bitfield-struct` views such as [`vtype::Vtype`] and
//!   [`satp::Satp64`], loaded with [`LoadRegister`] and written back with
//!   [`StoreRegister`].
//!
//! ```rust
//! # use gen_registers::*;
//! # use gen_registers::vtype::Vtype;
//! let mut file = RegisterFile::riscv(Xlen::Rv64);
//! file.set_field_value("vtype", "VSEW", 2).unwrap();
//!
//! let vtype = Vtype::load(&file).unwrap();
//! assert_eq!(vtype.sew_bits(), 32);
//! ```

pub mod satp;
pub mod vtype;

use log::trace;
use std::collections::BTreeMap;

/// Native register width of the modeled hart.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Xlen {
    Rv32,
    Rv64,
}

impl Xlen {
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Rv32 => 32,
            Self::Rv64 => 64,
        }
    }
}

/// Register lookup or write failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("unknown register \"{0}\"")]
    UnknownRegister(String),
    #[error("register \"{register}\" has no field \"{field}\"")]
    UnknownField { register: String, field: String },
    #[error("value {value:#x} does not fit into {width} bits of {target}")]
    ValueTooWide {
        target: String,
        value: u64,
        width: u32,
    },
    #[error("register \"{0}\" is already defined")]
    DuplicateRegister(String),
}

#[inline]
const fn width_mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// Layout of one named bit field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegisterField {
    name: String,
    lsb: u32,
    width: u32,
}

impl RegisterField {
    #[must_use]
    pub fn new(name: impl Into<String>, lsb: u32, width: u32) -> Self {
        debug_assert!(width > 0 && lsb + width <= u64::BITS, "field out of range");
        Self {
            name: name.into(),
            lsb,
            width,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn lsb(&self) -> u32 {
        self.lsb
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Field mask, in register bit positions.
    #[must_use]
    pub const fn mask(&self) -> u64 {
        width_mask(self.width) << self.lsb
    }

    const fn extract(&self, register_value: u64) -> u64 {
        (register_value >> self.lsb) & width_mask(self.width)
    }
}

/// One architectural register and its field layout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Register {
    name: String,
    physical_name: String,
    width: u32,
    value: u64,
    /// Bits that have been written since creation.
    initialized: u64,
    fields: Vec<RegisterField>,
}

impl Register {
    /// A register whose physical register name equals its name.
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        let name = name.into();
        Self {
            physical_name: name.clone(),
            name,
            width,
            value: 0,
            initialized: 0,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_physical_name(mut self, physical_name: impl Into<String>) -> Self {
        self.physical_name = physical_name.into();
        self
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, lsb: u32, width: u32) -> Self {
        debug_assert!(lsb + width <= self.width, "field exceeds register width");
        self.fields.push(RegisterField::new(name, lsb, width));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the physical register backing this one.
    #[must_use]
    pub fn physical_name(&self) -> &str {
        &self.physical_name
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Whether every bit of the register has been written.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized == width_mask(self.width)
    }

    pub fn fields(&self) -> impl Iterator<Item = RegisterFieldRef<'_>> {
        self.fields.iter().map(|field| RegisterFieldRef {
            register: self,
            field,
        })
    }

    /// Look up a field by name.
    ///
    /// # Errors
    /// [`RegisterError::UnknownField`] if the register has no such field.
    pub fn field(&self, name: &str) -> Result<RegisterFieldRef<'_>, RegisterError> {
        let field = self.field_layout(name)?;
        Ok(RegisterFieldRef {
            register: self,
            field,
        })
    }

    fn field_layout(&self, name: &str) -> Result<&RegisterField, RegisterError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| RegisterError::UnknownField {
                register: self.name.clone(),
                field: name.into(),
            })
    }

    /// Current value of the named field.
    ///
    /// # Errors
    /// [`RegisterError::UnknownField`] if the register has no such field.
    pub fn field_value(&self, name: &str) -> Result<u64, RegisterError> {
        Ok(self.field(name)?.value())
    }

    /// Overwrite the whole register.
    ///
    /// # Errors
    /// [`RegisterError::ValueTooWide`] if `value` exceeds the register width.
    pub fn set_value(&mut self, value: u64) -> Result<(), RegisterError> {
        let mask = width_mask(self.width);
        if value & !mask != 0 {
            return Err(RegisterError::ValueTooWide {
                target: self.name.clone(),
                value,
                width: self.width,
            });
        }
        trace!("{} <- {value:#x}", self.name);
        self.value = value;
        self.initialized = mask;
        Ok(())
    }

    /// Overwrite one field, leaving the other bits untouched.
    ///
    /// # Errors
    /// - [`RegisterError::UnknownField`] if the register has no such field.
    /// - [`RegisterError::ValueTooWide`] if `value` exceeds the field width.
    pub fn set_field_value(&mut self, name: &str, value: u64) -> Result<(), RegisterError> {
        let field = self.field_layout(name)?;
        if value & !width_mask(field.width) != 0 {
            return Err(RegisterError::ValueTooWide {
                target: format!("{}.{}", self.name, field.name),
                value,
                width: field.width,
            });
        }
        let mask = field.mask();
        let lsb = field.lsb;
        trace!("{}.{name} <- {value:#x}", self.name);
        self.value = (self.value & !mask) | (value << lsb);
        self.initialized |= mask;
        Ok(())
    }

    /// Whether every bit of the named field has been written.
    ///
    /// # Errors
    /// [`RegisterError::UnknownField`] if the register has no such field.
    pub fn is_field_initialized(&self, name: &str) -> Result<bool, RegisterError> {
        let mask = self.field_layout(name)?.mask();
        Ok(self.initialized & mask == mask)
    }
}

/// Borrowed view of one field of a register.
#[derive(Copy, Clone, Debug)]
pub struct RegisterFieldRef<'r> {
    register: &'r Register,
    field: &'r RegisterField,
}

impl<'r> RegisterFieldRef<'r> {
    #[must_use]
    pub fn name(&self) -> &'r str {
        &self.field.name
    }

    #[must_use]
    pub fn register_name(&self) -> &'r str {
        &self.register.name
    }

    /// Name of the physical register that holds this field.
    #[must_use]
    pub fn physical_register_name(&self) -> &'r str {
        &self.register.physical_name
    }

    #[must_use]
    pub const fn layout(&self) -> &'r RegisterField {
        self.field
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.field.extract(self.register.value)
    }
}

/// Name-keyed collection of registers.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegisterFile {
    registers: BTreeMap<String, Register>,
}

impl RegisterFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The vector and address-translation registers of a RISC-V hart.
    ///
    /// | Register | Fields |
    /// |:---------|:-------|
    /// | `vtype`  | `VLMUL[1:0]`, `VSEW[4:2]`, `VTA[6]`, `VMA[7]`, `VILL[XLEN-1]` |
    /// | `vl`     | – |
    /// | `vstart` | – |
    /// | `satp`   | RV64: `PPN[43:0]`, `ASID[59:44]`, `MODE[63:60]`; RV32: `PPN[21:0]`, `ASID[30:22]`, `MODE[31]` |
    #[must_use]
    pub fn riscv(xlen: Xlen) -> Self {
        let bits = xlen.bits();
        let satp = match xlen {
            Xlen::Rv32 => Register::new(satp::NAME, bits)
                .with_field("PPN", 0, 22)
                .with_field("ASID", 22, 9)
                .with_field("MODE", 31, 1),
            Xlen::Rv64 => Register::new(satp::NAME, bits)
                .with_field("PPN", 0, 44)
                .with_field("ASID", 44, 16)
                .with_field("MODE", 60, 4),
        };

        let mut file = Self::new();
        for register in [
            Register::new(vtype::NAME, bits)
                .with_field("VLMUL", 0, 2)
                .with_field("VSEW", 2, 3)
                .with_field("VTA", 6, 1)
                .with_field("VMA", 7, 1)
                .with_field("VILL", bits - 1, 1),
            Register::new("vl", bits),
            Register::new("vstart", bits),
            satp,
        ] {
            file.registers.insert(register.name.clone(), register);
        }
        file
    }

    /// Add a register.
    ///
    /// # Errors
    /// [`RegisterError::DuplicateRegister`] if the name is taken.
    pub fn insert(&mut self, register: Register) -> Result<(), RegisterError> {
        if self.registers.contains_key(&register.name) {
            return Err(RegisterError::DuplicateRegister(register.name));
        }
        self.registers.insert(register.name.clone(), register);
        Ok(())
    }

    /// Look up a register by name.
    ///
    /// # Errors
    /// [`RegisterError::UnknownRegister`] if there is no such register.
    pub fn register(&self, name: &str) -> Result<&Register, RegisterError> {
        self.registers
            .get(name)
            .ok_or_else(|| RegisterError::UnknownRegister(name.into()))
    }

    /// Look up a register by name for writing.
    ///
    /// # Errors
    /// [`RegisterError::UnknownRegister`] if there is no such register.
    pub fn register_mut(&mut self, name: &str) -> Result<&mut Register, RegisterError> {
        self.registers
            .get_mut(name)
            .ok_or_else(|| RegisterError::UnknownRegister(name.into()))
    }

    /// # Errors
    /// Unknown register, or a value wider than the register.
    pub fn set_value(&mut self, register: &str, value: u64) -> Result<(), RegisterError> {
        self.register_mut(register)?.set_value(value)
    }

    /// # Errors
    /// Unknown register or field.
    pub fn field_value(&self, register: &str, field: &str) -> Result<u64, RegisterError> {
        self.register(register)?.field_value(field)
    }

    /// # Errors
    /// Unknown register or field, or a value wider than the field.
    pub fn set_field_value(
        &mut self,
        register: &str,
        field: &str,
        value: u64,
    ) -> Result<(), RegisterError> {
        self.register_mut(register)?.set_field_value(field, value)
    }
}

/// A typed `bitfield-struct` view over one register of the file.
pub trait TypedRegister: Sized {
    /// Name of the register in the [`RegisterFile`].
    const NAME: &'static str;

    fn from_register_value(value: u64) -> Self;

    fn into_register_value(self) -> u64;
}

pub trait LoadRegister: Sized {
    /// Read the current value from the register file.
    ///
    /// # Errors
    /// The register is not part of the file.
    fn load(file: &RegisterFile) -> Result<Self, RegisterError>;
}

pub trait StoreRegister {
    /// Write this value into the register file.
    ///
    /// # Errors
    /// The register is not part of the file, or the value is too wide for it.
    fn store(self, file: &mut RegisterFile) -> Result<(), RegisterError>;
}

impl<T> LoadRegister for T
where
    T: TypedRegister,
{
    #[inline]
    fn load(file: &RegisterFile) -> Result<Self, RegisterError> {
        Ok(Self::from_register_value(file.register(Self::NAME)?.value()))
    }
}

impl<T> StoreRegister for T
where
    T: TypedRegister,
{
    #[inline]
    fn store(self, file: &mut RegisterFile) -> Result<(), RegisterError> {
        file.set_value(Self::NAME, self.into_register_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_write_preserves_other_bits() {
        let mut reg = Register::new("r", 16)
            .with_field("LO", 0, 4)
            .with_field("HI", 12, 4);
        reg.set_value(0x0FF0).unwrap();
        reg.set_field_value("HI", 0xA).unwrap();
        assert_eq!(reg.value(), 0xAFF0);
        assert_eq!(reg.field_value("LO").unwrap(), 0);
        assert_eq!(reg.field_value("HI").unwrap(), 0xA);
    }

    #[test]
    fn writes_are_width_checked() {
        let mut reg = Register::new("r", 8).with_field("F", 0, 2);
        assert_eq!(
            reg.set_value(0x100),
            Err(RegisterError::ValueTooWide {
                target: "r".into(),
                value: 0x100,
                width: 8
            })
        );
        assert_eq!(
            reg.set_field_value("F", 4),
            Err(RegisterError::ValueTooWide {
                target: "r.F".into(),
                value: 4,
                width: 2
            })
        );
        assert_eq!(reg.value(), 0);
    }

    #[test]
    fn initialization_is_tracked_per_field() {
        let mut reg = Register::new("r", 8)
            .with_field("A", 0, 4)
            .with_field("B", 4, 4);
        assert!(!reg.is_initialized());
        reg.set_field_value("A", 1).unwrap();
        assert!(reg.is_field_initialized("A").unwrap());
        assert!(!reg.is_field_initialized("B").unwrap());
        assert!(!reg.is_initialized());
        reg.set_field_value("B", 0).unwrap();
        assert!(reg.is_initialized());
    }

    #[test]
    fn field_ref_reports_physical_register() {
        let reg = Register::new("satp_alias", 64)
            .with_physical_name("satp")
            .with_field("PPN", 0, 44);
        let field = reg.field("PPN").unwrap();
        assert_eq!(field.name(), "PPN");
        assert_eq!(field.register_name(), "satp_alias");
        assert_eq!(field.physical_register_name(), "satp");
    }

    #[test]
    fn unknown_names_are_errors() {
        let file = RegisterFile::riscv(Xlen::Rv64);
        assert_eq!(
            file.register("x99").unwrap_err(),
            RegisterError::UnknownRegister("x99".into())
        );
        assert_eq!(
            file.field_value("vtype", "NOPE"),
            Err(RegisterError::UnknownField {
                register: "vtype".into(),
                field: "NOPE".into()
            })
        );
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut file = RegisterFile::riscv(Xlen::Rv32);
        assert_eq!(
            file.insert(Register::new("vl", 32)),
            Err(RegisterError::DuplicateRegister("vl".into()))
        );
    }

    #[test]
    fn riscv_preset_layouts() {
        let rv32 = RegisterFile::riscv(Xlen::Rv32);
        let rv64 = RegisterFile::riscv(Xlen::Rv64);
        assert_eq!(rv32.register("vtype").unwrap().field("VILL").unwrap().layout().lsb(), 31);
        assert_eq!(rv64.register("vtype").unwrap().field("VILL").unwrap().layout().lsb(), 63);
        assert_eq!(rv32.register("satp").unwrap().field("PPN").unwrap().layout().width(), 22);
        assert_eq!(rv64.register("satp").unwrap().field("PPN").unwrap().layout().width(), 44);
    }
}
