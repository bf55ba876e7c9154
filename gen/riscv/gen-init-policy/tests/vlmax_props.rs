use gen_config::{Config, LimitType};
use gen_init_policy::{InitContext, InitPolicyRegistry, InitTarget, compute_vlmax, vlmax};
use gen_registers::vtype::Vtype;
use gen_registers::{RegisterFile, StoreRegister, Xlen};
use gen_vmem::MemoryManager;
use proptest::prelude::*;

fn arb_vlen() -> impl Strategy<Value = u64> {
    prop_oneof![
        (5u32..17).prop_map(|shift| 1u64 << shift),
        1u64..=65_536,
        any::<u64>(),
    ]
}

proptest! {
    #[test]
    fn matches_formula(vsew in 0u8..4, vlmul in 0u8..4, vlen in 32u64..=65_536) {
        let sew = 8u64 << vsew;
        let lmul = 1u64 << vlmul;
        prop_assert_eq!(vlmax(vsew, vlmul, vlen), lmul * vlen / sew);
    }

    #[test]
    fn grows_with_lmul(vsew in 0u8..4, vlmul in 0u8..3, vlen in arb_vlen()) {
        prop_assert!(vlmax(vsew, vlmul, vlen) <= vlmax(vsew, vlmul + 1, vlen));
    }

    #[test]
    fn shrinks_with_sew(vsew in 0u8..3, vlmul in 0u8..4, vlen in arb_vlen()) {
        prop_assert!(vlmax(vsew + 1, vlmul, vlen) <= vlmax(vsew, vlmul, vlen));
    }

    #[test]
    fn reload_is_idempotent(vsew in 0u8..4, vlmul in 0u8..4, vlen in arb_vlen()) {
        let config = Config::new().with_limit(LimitType::MaxPhysicalVectorLen, vlen);
        let mut regs = RegisterFile::riscv(Xlen::Rv64);
        Vtype::new().with_vsew(vsew).with_vlmul(vlmul).store(&mut regs).unwrap();
        let mut mm = MemoryManager::new();

        let mut registry = InitPolicyRegistry::new();
        registry.bind_register("vl", gen_init_policy::VlInitPolicy).unwrap();

        let mut ctx = InitContext::new(&config, &mut regs, &mut mm);
        let target = InitTarget::register("vl");
        registry.initialize(&mut ctx, &target).unwrap();
        let initialized = ctx.registers.register("vl").unwrap().value();

        prop_assert_eq!(initialized, compute_vlmax(ctx.config, ctx.registers).unwrap());
        prop_assert_eq!(registry.reload(&mut ctx, &target).unwrap(), initialized);
        prop_assert_eq!(registry.reload(&mut ctx, &target).unwrap(), initialized);
    }
}
