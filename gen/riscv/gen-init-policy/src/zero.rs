//! Registers that start at zero regardless of random choices elsewhere.
//!
//! `vstart` must be zero so no vector instruction resumes mid-way, and `vtype`
//! models "no vector configuration executed yet". Both are undefined at reset;
//! the generator pins them to zero.

use crate::{FieldInitPolicy, InitContext, InitError, RegisterInitPolicy};
use log::info;

/// `vstart` — always zero.
#[derive(Copy, Clone, Debug, Default)]
pub struct VstartInitPolicy;

impl RegisterInitPolicy for VstartInitPolicy {
    fn initialize_register(
        &self,
        ctx: &mut InitContext<'_>,
        register: &str,
    ) -> Result<(), InitError> {
        Ok(ctx.registers.set_value(register, 0)?)
    }

    fn reload_value(&self, _ctx: &InitContext<'_>, register: &str) -> Result<u64, InitError> {
        info!("reloading {register}");
        Ok(0)
    }
}

/// Every field of `vtype` — always zero.
#[derive(Copy, Clone, Debug, Default)]
pub struct VtypeInitPolicy;

impl FieldInitPolicy for VtypeInitPolicy {
    fn initialize_field(
        &self,
        ctx: &mut InitContext<'_>,
        register: &str,
        field: &str,
    ) -> Result<(), InitError> {
        Ok(ctx.registers.set_field_value(register, field, 0)?)
    }

    fn reload_value(
        &self,
        _ctx: &InitContext<'_>,
        register: &str,
        field: &str,
    ) -> Result<u64, InitError> {
        info!("reloading {field} of {register}");
        Ok(0)
    }
}
