//! # Policy Registry
//!
//! Name-keyed table binding registers and register fields to their
//! initialization policies. Bindings keep their insertion order, which is the
//! order [`InitPolicyRegistry::initialize_all`] runs them in.

use crate::ppn::PpnInitPolicy;
use crate::vector::VlInitPolicy;
use crate::zero::{VstartInitPolicy, VtypeInitPolicy};
use crate::{FieldInitPolicy, InitContext, InitError, RegisterInitPolicy, ReloadSource};
use gen_registers::RegisterFile;
use gen_registers::vtype;
use log::debug;
use std::collections::BTreeMap;
use std::fmt;

/// What a policy is bound to.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum InitTarget {
    Register(String),
    Field { register: String, field: String },
}

impl InitTarget {
    #[must_use]
    pub fn register(name: impl Into<String>) -> Self {
        Self::Register(name.into())
    }

    #[must_use]
    pub fn field(register: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Field {
            register: register.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for InitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(register) => f.write_str(register),
            Self::Field { register, field } => write!(f, "{register}.{field}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{0} already has an initialization policy")]
    Duplicate(InitTarget),
    #[error("{0} has no initialization policy")]
    Unbound(InitTarget),
}

/// A policy for either a whole register or a single field.
pub enum InitPolicy {
    Register(Box<dyn RegisterInitPolicy>),
    Field(Box<dyn FieldInitPolicy>),
}

impl fmt::Debug for InitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(_) => f.write_str("InitPolicy::Register"),
            Self::Field(_) => f.write_str("InitPolicy::Field"),
        }
    }
}

#[derive(Debug, Default)]
pub struct InitPolicyRegistry {
    bindings: Vec<(InitTarget, InitPolicy)>,
    index: BTreeMap<InitTarget, usize>,
}

impl InitPolicyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The RISC-V bindings, in dependency order: every `vtype` field,
    /// `vstart`, `vl`, then `satp.PPN`.
    ///
    /// # Errors
    /// `vtype` is missing from `registers`.
    pub fn riscv(registers: &RegisterFile) -> Result<Self, InitError> {
        let mut registry = Self::new();
        for field in registers.register(vtype::NAME)?.fields() {
            registry.bind_field(vtype::NAME, field.name(), VtypeInitPolicy)?;
        }
        registry
            .bind_register("vstart", VstartInitPolicy)?
            .bind_register("vl", VlInitPolicy)?
            .bind_field("satp", "PPN", PpnInitPolicy)?;
        Ok(registry)
    }

    /// # Errors
    /// [`RegistryError::Duplicate`] if `register` is already bound.
    pub fn bind_register(
        &mut self,
        register: impl Into<String>,
        policy: impl RegisterInitPolicy + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.bind(
            InitTarget::register(register),
            InitPolicy::Register(Box::new(policy)),
        )
    }

    /// # Errors
    /// [`RegistryError::Duplicate`] if `register.field` is already bound.
    pub fn bind_field(
        &mut self,
        register: impl Into<String>,
        field: impl Into<String>,
        policy: impl FieldInitPolicy + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.bind(
            InitTarget::field(register, field),
            InitPolicy::Field(Box::new(policy)),
        )
    }

    fn bind(&mut self, target: InitTarget, policy: InitPolicy) -> Result<&mut Self, RegistryError> {
        if self.index.contains_key(&target) {
            return Err(RegistryError::Duplicate(target));
        }
        self.index.insert(target.clone(), self.bindings.len());
        self.bindings.push((target, policy));
        Ok(self)
    }

    #[must_use]
    pub fn policy(&self, target: &InitTarget) -> Option<&InitPolicy> {
        self.index.get(target).map(|&i| &self.bindings[i].1)
    }

    /// Bound targets in setup order.
    pub fn targets(&self) -> impl Iterator<Item = &InitTarget> {
        self.bindings.iter().map(|(target, _)| target)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn lookup(&self, target: &InitTarget) -> Result<&InitPolicy, RegistryError> {
        self.policy(target).ok_or_else(|| RegistryError::Unbound(target.clone()))
    }

    /// Run the policy bound to `target`.
    ///
    /// # Errors
    /// [`RegistryError::Unbound`], or whatever the policy reports.
    pub fn initialize(
        &self,
        ctx: &mut InitContext<'_>,
        target: &InitTarget,
    ) -> Result<(), InitError> {
        Self::run_initialize(ctx, target, self.lookup(target)?)
    }

    /// Run every bound policy in setup order, stopping at the first failure.
    ///
    /// # Errors
    /// The first error any policy reports.
    pub fn initialize_all(&self, ctx: &mut InitContext<'_>) -> Result<(), InitError> {
        for (target, policy) in &self.bindings {
            Self::run_initialize(ctx, target, policy)?;
        }
        Ok(())
    }

    fn run_initialize(
        ctx: &mut InitContext<'_>,
        target: &InitTarget,
        policy: &InitPolicy,
    ) -> Result<(), InitError> {
        debug!("initializing {target}");
        match (target, policy) {
            (InitTarget::Register(register), InitPolicy::Register(p)) => {
                p.initialize_register(ctx, register)
            }
            (InitTarget::Field { register, field }, InitPolicy::Field(p)) => {
                p.initialize_field(ctx, register, field)
            }
            _ => unreachable!("bind() pairs register targets with register policies"),
        }
    }

    /// Resynchronize `target` and return the value it now holds.
    ///
    /// Computed policies have their value written back. Live-register
    /// policies leave the register untouched and the current value is
    /// returned.
    ///
    /// # Errors
    /// [`RegistryError::Unbound`], or whatever the policy reports.
    pub fn reload(&self, ctx: &mut InitContext<'_>, target: &InitTarget) -> Result<u64, InitError> {
        match (target, self.lookup(target)?) {
            (InitTarget::Register(register), InitPolicy::Register(p)) => {
                let value = p.reload_value(ctx, register)?;
                match p.reload_source() {
                    ReloadSource::Computed => {
                        ctx.registers.set_value(register, value)?;
                        Ok(value)
                    }
                    ReloadSource::LiveRegister => Ok(ctx.registers.register(register)?.value()),
                }
            }
            (InitTarget::Field { register, field }, InitPolicy::Field(p)) => {
                let value = p.reload_value(ctx, register, field)?;
                match p.reload_source() {
                    ReloadSource::Computed => {
                        ctx.registers.set_field_value(register, field, value)?;
                        Ok(value)
                    }
                    ReloadSource::LiveRegister => Ok(ctx.registers.field_value(register, field)?),
                }
            }
            _ => unreachable!("bind() pairs field targets with field policies"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gen_config::Config;
    use gen_registers::Xlen;
    use gen_vmem::MemoryManager;

    #[test]
    fn riscv_bindings_in_dependency_order() {
        let regs = RegisterFile::riscv(Xlen::Rv64);
        let registry = InitPolicyRegistry::riscv(&regs).unwrap();
        let order: Vec<String> = registry.targets().map(ToString::to_string).collect();
        assert_eq!(
            order,
            [
                "vtype.VLMUL",
                "vtype.VSEW",
                "vtype.VTA",
                "vtype.VMA",
                "vtype.VILL",
                "vstart",
                "vl",
                "satp.PPN"
            ]
        );
        assert!(matches!(
            registry.policy(&InitTarget::register("vl")),
            Some(InitPolicy::Register(_))
        ));
        assert!(matches!(
            registry.policy(&InitTarget::field("satp", "PPN")),
            Some(InitPolicy::Field(_))
        ));
    }

    #[test]
    fn duplicate_binding_rejected() {
        let mut registry = InitPolicyRegistry::new();
        registry.bind_register("vl", VlInitPolicy).unwrap();
        assert_eq!(
            registry.bind_register("vl", VstartInitPolicy).unwrap_err(),
            RegistryError::Duplicate(InitTarget::register("vl"))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unbound_target_is_error() {
        let registry = InitPolicyRegistry::new();
        let config = Config::new();
        let mut regs = RegisterFile::riscv(Xlen::Rv64);
        let mut mm = MemoryManager::new();
        let mut ctx = InitContext::new(&config, &mut regs, &mut mm);
        assert_eq!(
            registry.initialize(&mut ctx, &InitTarget::register("x1")),
            Err(InitError::Registry(RegistryError::Unbound(
                InitTarget::register("x1")
            )))
        );
    }

    #[test]
    fn field_and_register_targets_are_distinct() {
        let mut registry = InitPolicyRegistry::new();
        registry
            .bind_register("vtype", VstartInitPolicy)
            .unwrap()
            .bind_field("vtype", "VSEW", VtypeInitPolicy)
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(InitTarget::field("vtype", "VSEW").to_string(), "vtype.VSEW");
    }

    #[test]
    fn computed_reload_writes_back() {
        let config = Config::new();
        let mut regs = RegisterFile::riscv(Xlen::Rv64);
        regs.set_value("vstart", 7).unwrap();
        let mut mm = MemoryManager::new();
        let mut ctx = InitContext::new(&config, &mut regs, &mut mm);

        let mut registry = InitPolicyRegistry::new();
        registry.bind_register("vstart", VstartInitPolicy).unwrap();
        assert_eq!(registry.reload(&mut ctx, &InitTarget::register("vstart")), Ok(0));
        assert_eq!(ctx.registers.register("vstart").unwrap().value(), 0);
    }
}
