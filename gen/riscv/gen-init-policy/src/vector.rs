//! # Vector Length
//!
//! `vl` starts at `VLMAX`, the largest element count one vector instruction
//! can process under the current `vtype`:
//!
//! ```text
//! SEW   = 8 · 2^VSEW          (bits)
//! LMUL  = 2^VLMUL
//! VLMAX = ⌊LMUL · VLEN / SEW⌋  (VLEN = MaxPhysicalVectorLen limit, bits)
//! ```
//!
//! Only whole multipliers are modeled; fractional LMUL encodings are not
//! part of the `VLMUL` field read here.

use crate::{InitContext, InitError, RegisterInitPolicy};
use gen_config::{Config, LimitType};
use gen_registers::vtype::Vtype;
use gen_registers::{LoadRegister, RegisterFile};
use log::{debug, info};

/// `⌊2^vlmul · vlen / (8 · 2^vsew)⌋`.
///
/// `vsew` and `vlmul` are the raw `VSEW` (3-bit) and `VLMUL` (2-bit) field
/// encodings.
///
/// # Panics
/// If `vsew >= 8` or `vlmul >= 4`.
#[must_use]
pub const fn vlmax(vsew: u8, vlmul: u8, vlen: u64) -> u64 {
    assert!(vsew < 8, "VSEW encoding out of range");
    assert!(vlmul < 4, "VLMUL encoding out of range");
    let sew = 8u128 << vsew;
    let scaled = (vlen as u128) << vlmul;
    // LMUL ≤ 8 and SEW ≥ 8, so the quotient never exceeds `vlen`.
    (scaled / sew) as u64
}

/// VLMAX for the `vtype` currently held in `registers`.
///
/// # Errors
/// - `vtype` is missing from the register file.
/// - `MaxPhysicalVectorLen` is not configured.
pub fn compute_vlmax(config: &Config, registers: &RegisterFile) -> Result<u64, InitError> {
    let vtype = Vtype::load(registers)?;
    let vlen = config.limit(LimitType::MaxPhysicalVectorLen)?;
    let value = vlmax(vtype.vsew(), vtype.vlmul(), vlen);
    debug!(
        "VLMAX = {value} (SEW {}, LMUL {}, VLEN {vlen})",
        vtype.sew_bits(),
        vtype.lmul()
    );
    Ok(value)
}

/// `vl` — initialized to, and reloaded as, VLMAX.
///
/// Must run after `vtype` has its final value.
#[derive(Copy, Clone, Debug, Default)]
pub struct VlInitPolicy;

impl RegisterInitPolicy for VlInitPolicy {
    fn initialize_register(
        &self,
        ctx: &mut InitContext<'_>,
        register: &str,
    ) -> Result<(), InitError> {
        let value = compute_vlmax(ctx.config, ctx.registers)?;
        Ok(ctx.registers.set_value(register, value)?)
    }

    fn reload_value(&self, ctx: &InitContext<'_>, register: &str) -> Result<u64, InitError> {
        info!("reloading {register}");
        compute_vlmax(ctx.config, ctx.registers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gen_config::ConfigurationError;
    use gen_registers::{StoreRegister, Xlen};
    use gen_vmem::MemoryManager;

    #[test]
    fn sew16_lmul2_vlen256_is_32() {
        assert_eq!(vlmax(1, 1, 256), 32);
    }

    #[test]
    fn extremes() {
        assert_eq!(vlmax(0, 3, 128), 128);
        assert_eq!(vlmax(3, 0, 128), 2);
        assert_eq!(vlmax(3, 0, 32), 0);
        assert_eq!(vlmax(0, 3, u64::MAX), u64::MAX);
        assert_eq!(vlmax(7, 3, 1024), 8);
    }

    #[test]
    #[should_panic(expected = "VSEW encoding out of range")]
    fn oversized_vsew_rejected() {
        let _ = vlmax(125, 0, 256);
    }

    #[test]
    #[should_panic(expected = "VLMUL encoding out of range")]
    fn oversized_vlmul_rejected() {
        let _ = vlmax(0, 128, 256);
    }

    #[test]
    fn initialize_and_reload_agree() {
        let config = Config::new().with_limit(LimitType::MaxPhysicalVectorLen, 512);
        let mut regs = RegisterFile::riscv(Xlen::Rv64);
        Vtype::new()
            .with_vsew(2)
            .with_vlmul(2)
            .store(&mut regs)
            .unwrap();
        let mut mm = MemoryManager::new();
        let mut ctx = InitContext::new(&config, &mut regs, &mut mm);

        VlInitPolicy.initialize_register(&mut ctx, "vl").unwrap();
        let initialized = ctx.registers.register("vl").unwrap().value();
        assert_eq!(initialized, 64);

        let first = VlInitPolicy.reload_value(&ctx, "vl").unwrap();
        let second = VlInitPolicy.reload_value(&ctx, "vl").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, initialized);
    }

    #[test]
    fn missing_vlen_limit_is_configuration_error() {
        let config = Config::new();
        let mut regs = RegisterFile::riscv(Xlen::Rv32);
        let mut mm = MemoryManager::new();
        let mut ctx = InitContext::new(&config, &mut regs, &mut mm);
        assert_eq!(
            VlInitPolicy.initialize_register(&mut ctx, "vl"),
            Err(InitError::Configuration(ConfigurationError::UnknownLimit(
                LimitType::MaxPhysicalVectorLen
            )))
        );
        assert_eq!(ctx.registers.register("vl").unwrap().value(), 0);
        assert!(!ctx.registers.register("vl").unwrap().is_initialized());
    }
}
