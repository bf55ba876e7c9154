//! # Root Page Table Pointer
//!
//! `satp.PPN` cannot be chosen freely: it must name a page-aligned block of
//! physical memory large enough for the root translation table, inside the
//! platform's page-table window and below the physical-address ceiling. The
//! policy sizes the table for the active translation mode and lets the page
//! table allocator place it and program the register.

use crate::{FieldInitPolicy, InitContext, InitError, ReloadSource};
use gen_config::{ConfigurationError, GlobalStateType, LimitType, VariableType};
use gen_constraint::ConstraintSet;
use gen_vmem::{MemoryBank, PagingMode, RootPageTable};
use log::{debug, info};

/// Name of the variable holding the usable page-table range of `bank`.
#[must_use]
pub fn page_table_range_variable(bank: MemoryBank) -> String {
    format!("{bank} page table physical memory range")
}

/// `satp.PPN` — root page table placed by the allocator.
#[derive(Copy, Clone, Debug, Default)]
pub struct PpnInitPolicy;

impl PpnInitPolicy {
    /// Page-table window of the default bank, clipped to the physical
    /// address limit and to what `mode` can address.
    fn usable_constraint(
        ctx: &InitContext<'_>,
        mode: PagingMode,
    ) -> Result<ConstraintSet, InitError> {
        let name = page_table_range_variable(MemoryBank::Default);
        let text = ctx.config.variable(&name, VariableType::String)?;
        let mut usable = text.parse::<ConstraintSet>().map_err(|e| {
            ConfigurationError::MalformedVariable {
                name: name.clone(),
                reason: e.to_string(),
            }
        })?;

        let max_phys = ctx.config.limit(LimitType::PhysicalAddressLimit)?;
        let ceiling = max_phys.min(mode.geometry().max_physical_address());
        usable.apply(&ConstraintSet::new(0, ceiling));
        Ok(usable)
    }

    fn paging_mode(ctx: &InitContext<'_>) -> Result<PagingMode, InitError> {
        let rv32 = ctx.config.global_state(GlobalStateType::Rv32)? != 0;
        Ok(PagingMode::for_rv32(rv32))
    }
}

impl FieldInitPolicy for PpnInitPolicy {
    fn initialize_field(
        &self,
        ctx: &mut InitContext<'_>,
        register: &str,
        field: &str,
    ) -> Result<(), InitError> {
        let mode = Self::paging_mode(ctx)?;
        let usable = Self::usable_constraint(ctx, mode)?;
        let size = RootPageTable::new(*mode.geometry()).table_size_bytes();

        let physical = ctx
            .registers
            .register(register)?
            .field(field)?
            .physical_register_name()
            .to_owned();

        debug!("{mode} root table: {size:#x} bytes for {physical} within [{usable}]");
        ctx.allocator
            .reserve(size, MemoryBank::Default, &physical, usable, ctx.registers)?;
        Ok(())
    }

    /// Always `0`: the value is allocator-assigned and is not recomputed.
    fn reload_value(
        &self,
        ctx: &InitContext<'_>,
        register: &str,
        field: &str,
    ) -> Result<u64, InitError> {
        let physical = ctx
            .registers
            .register(register)?
            .physical_name()
            .to_owned();
        info!("reloading {field} of {physical}");
        Ok(0)
    }

    fn reload_source(&self) -> ReloadSource {
        ReloadSource::LiveRegister
    }
}
