//! # Register Initialization Policies
//!
//! Most architectural registers can start from any value the generator's
//! random choices produce. A few cannot: their legal values follow from other
//! register state, from the active translation mode, or from where memory is
//! still free. This crate supplies the policies for those registers and the
//! name-keyed driver that invokes them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              InitPolicyRegistry (driver)            │
//! │    • name-keyed bindings, kept in setup order       │
//! │    • initialize_all / initialize / reload           │
//! └─────────────────┬───────────────────────────────────┘
//!                   │ InitPolicy::{Register, Field}
//! ┌─────────────────▼───────────────────────────────────┐
//! │                    Policies                         │
//! │    • vtype.*  → 0            (VtypeInitPolicy)      │
//! │    • vstart   → 0            (VstartInitPolicy)     │
//! │    • vl       → VLMAX        (VlInitPolicy)         │
//! │    • satp.PPN → root table   (PpnInitPolicy)        │
//! └─────────────────┬───────────────────────────────────┘
//!                   │ InitContext
//! ┌─────────────────▼───────────────────────────────────┐
//! │  Config  │  RegisterFile  │  PageTableAllocator     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Every call receives an explicit [`InitContext`]: the read-only
//! configuration, the register file, and the page table allocator. Policies
//! hold no state of their own.
//!
//! ## Ordering
//!
//! `vl` is derived from `vtype`, so `vtype` must hold its final value before
//! the `vl` policy runs. [`InitPolicyRegistry::riscv`] binds the policies in
//! that order and [`InitPolicyRegistry::initialize_all`] runs them in binding
//! order; the policies themselves do not check it.
//!
//! ## Reload
//!
//! On reload the driver asks the policy for a value. Policies whose value is
//! computed from readable state ([`ReloadSource::Computed`]) have it written
//! back. Policies whose value was assigned by an allocator
//! ([`ReloadSource::LiveRegister`]) report a placeholder; the driver keeps and
//! returns the live register value instead.
//!
//! ## Usage
//!
//! ```rust
//! use gen_config::{Config, GlobalStateType, LimitType, VariableType};
//! use gen_init_policy::{InitContext, InitPolicyRegistry, InitTarget};
//! use gen_registers::{RegisterFile, Xlen};
//! use gen_vmem::{MemoryBank, MemoryManager};
//!
//! let config = Config::new()
//!     .with_limit(LimitType::PhysicalAddressLimit, 0xFFFF_FFFF)
//!     .with_limit(LimitType::MaxPhysicalVectorLen, 256)
//!     .with_global_state(GlobalStateType::Rv32, 0)
//!     .with_variable(
//!         "Default page table physical memory range",
//!         VariableType::String,
//!         "0x8000_0000-0x8fff_ffff",
//!     );
//! let mut registers = RegisterFile::riscv(Xlen::Rv64);
//! let mut memory = MemoryManager::new()
//!     .with_bank(MemoryBank::Default, "0x0-0xffff_ffff".parse().unwrap());
//!
//! let registry = InitPolicyRegistry::riscv(&registers).unwrap();
//! let mut ctx = InitContext::new(&config, &mut registers, &mut memory);
//! registry.initialize_all(&mut ctx).unwrap();
//!
//! assert_eq!(ctx.registers.register("vl").unwrap().value(), 32);
//! assert_eq!(ctx.registers.field_value("satp", "PPN").unwrap(), 0x80000);
//! assert_eq!(registry.reload(&mut ctx, &InitTarget::register("vl")).unwrap(), 32);
//! ```

pub mod ppn;
pub mod registry;
pub mod vector;
pub mod zero;

use gen_config::{Config, ConfigurationError};
use gen_registers::{RegisterError, RegisterFile};
use gen_vmem::{AllocationError, PageTableAllocator};

pub use crate::ppn::PpnInitPolicy;
pub use crate::registry::{InitPolicy, InitPolicyRegistry, InitTarget, RegistryError};
pub use crate::vector::{VlInitPolicy, compute_vlmax, vlmax};
pub use crate::zero::{VstartInitPolicy, VtypeInitPolicy};

/// Everything a policy may read or write during one call.
pub struct InitContext<'a> {
    pub config: &'a Config,
    pub registers: &'a mut RegisterFile,
    pub allocator: &'a mut dyn PageTableAllocator,
}

impl<'a> InitContext<'a> {
    #[must_use]
    pub fn new(
        config: &'a Config,
        registers: &'a mut RegisterFile,
        allocator: &'a mut dyn PageTableAllocator,
    ) -> Self {
        Self {
            config,
            registers,
            allocator,
        }
    }
}

/// Failure of a policy call. Nothing is ever replaced by a default value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Where the driver takes a register's value from on reload.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ReloadSource {
    /// The policy recomputes the value; the driver writes it back.
    #[default]
    Computed,
    /// The value was assigned elsewhere; the driver keeps the live value.
    LiveRegister,
}

/// Policy bound to a whole register.
pub trait RegisterInitPolicy {
    /// Write the initial value of `register`.
    ///
    /// # Errors
    /// Any lookup or write the policy performs may fail.
    fn initialize_register(&self, ctx: &mut InitContext<'_>, register: &str)
    -> Result<(), InitError>;

    /// Value `register` should hold after a resynchronization.
    ///
    /// # Errors
    /// Any lookup the policy performs may fail.
    fn reload_value(&self, ctx: &InitContext<'_>, register: &str) -> Result<u64, InitError>;

    fn reload_source(&self) -> ReloadSource {
        ReloadSource::Computed
    }
}

/// Policy bound to one field of a register.
pub trait FieldInitPolicy {
    /// Write the initial value of `register.field`.
    ///
    /// # Errors
    /// Any lookup, allocation or write the policy performs may fail.
    fn initialize_field(
        &self,
        ctx: &mut InitContext<'_>,
        register: &str,
        field: &str,
    ) -> Result<(), InitError>;

    /// Value `register.field` should hold after a resynchronization.
    ///
    /// # Errors
    /// Any lookup the policy performs may fail.
    fn reload_value(
        &self,
        ctx: &InitContext<'_>,
        register: &str,
        field: &str,
    ) -> Result<u64, InitError>;

    fn reload_source(&self) -> ReloadSource {
        ReloadSource::Computed
    }
}
