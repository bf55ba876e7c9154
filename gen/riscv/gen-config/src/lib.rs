//! # Generator Configuration
//!
//! Read-only configuration context handed to every register initialization
//! policy. It replaces process-wide lookups with an explicit value so policies
//! can be exercised against synthetic configurations.
//!
//! The context answers three kinds of questions:
//!
//! | Lookup | Key | Result |
//! |:-------|:----|:-------|
//! | [`Config::limit`] | [`LimitType`] | Platform limit, e.g. the physical-address ceiling. |
//! | [`Config::global_state`] | [`GlobalStateType`] | Processor-wide state flag, e.g. RV32 mode. |
//! | [`Config::variable`] | name + [`VariableType`] | Named, typed variable text. |
//!
//! Every lookup fails with a [`ConfigurationError`] when the key is unknown or
//! the stored kind does not match the requested one.
//!
//! ```rust
//! # use gen_config::*;
//! let config = Config::new()
//!     .with_limit(LimitType::MaxPhysicalVectorLen, 256)
//!     .with_global_state(GlobalStateType::Rv32, 0)
//!     .with_variable(
//!         "Default page table physical memory range",
//!         VariableType::String,
//!         "0x0-0xffff",
//!     );
//!
//! assert_eq!(config.limit(LimitType::MaxPhysicalVectorLen), Ok(256));
//! assert!(config.variable("missing", VariableType::String).is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Platform limits known to the generator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum LimitType {
    /// Highest usable physical address (inclusive).
    PhysicalAddressLimit,
    /// Maximum physical vector register length, in bits (`VLEN`).
    MaxPhysicalVectorLen,
}

impl LimitType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PhysicalAddressLimit => "PhysicalAddressLimit",
            Self::MaxPhysicalVectorLen => "MaxPhysicalVectorLen",
        }
    }
}

impl fmt::Display for LimitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processor-wide state values.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum GlobalStateType {
    /// Non-zero when the processor runs with 32-bit addressing.
    Rv32,
}

impl GlobalStateType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rv32 => "RV32",
        }
    }
}

impl fmt::Display for GlobalStateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a named variable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VariableType {
    /// Free-form text, e.g. an address range list.
    String,
    /// A single numeric value stored as text.
    Value,
}

impl VariableType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Value => "Value",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A required configuration entry is missing or has the wrong kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("limit {0} is not configured")]
    UnknownLimit(LimitType),
    #[error("global state {0} is not configured")]
    UnknownGlobalState(GlobalStateType),
    #[error("variable \"{0}\" is not configured")]
    UnknownVariable(String),
    #[error("variable \"{name}\" has type {found}, expected {expected}")]
    VariableKindMismatch {
        name: String,
        expected: VariableType,
        found: VariableType,
    },
    #[error("variable \"{name}\" is malformed: {reason}")]
    MalformedVariable { name: String, reason: String },
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Variable {
    kind: VariableType,
    value: String,
}

/// Explicit, read-only configuration context.
///
/// Built once by the driver (or a test) and then only borrowed immutably.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    limits: BTreeMap<LimitType, u64>,
    global_states: BTreeMap<GlobalStateType, u64>,
    variables: BTreeMap<String, Variable>,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set_limit(&mut self, limit: LimitType, value: u64) -> &mut Self {
        self.limits.insert(limit, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: LimitType, value: u64) -> Self {
        self.set_limit(limit, value);
        self
    }

    #[inline]
    pub fn set_global_state(&mut self, state: GlobalStateType, value: u64) -> &mut Self {
        self.global_states.insert(state, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_global_state(mut self, state: GlobalStateType, value: u64) -> Self {
        self.set_global_state(state, value);
        self
    }

    #[inline]
    pub fn set_variable(
        &mut self,
        name: impl Into<String>,
        kind: VariableType,
        value: impl Into<String>,
    ) -> &mut Self {
        self.variables.insert(
            name.into(),
            Variable {
                kind,
                value: value.into(),
            },
        );
        self
    }

    #[inline]
    #[must_use]
    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        kind: VariableType,
        value: impl Into<String>,
    ) -> Self {
        self.set_variable(name, kind, value);
        self
    }

    /// Look up a platform limit.
    ///
    /// # Errors
    /// [`ConfigurationError::UnknownLimit`] if the limit was never set.
    pub fn limit(&self, limit: LimitType) -> Result<u64, ConfigurationError> {
        self.limits
            .get(&limit)
            .copied()
            .ok_or(ConfigurationError::UnknownLimit(limit))
    }

    /// Look up a processor-wide state value.
    ///
    /// # Errors
    /// [`ConfigurationError::UnknownGlobalState`] if the state was never set.
    pub fn global_state(&self, state: GlobalStateType) -> Result<u64, ConfigurationError> {
        self.global_states
            .get(&state)
            .copied()
            .ok_or(ConfigurationError::UnknownGlobalState(state))
    }

    /// Look up the text of a named variable of the given kind.
    ///
    /// # Errors
    /// - [`ConfigurationError::UnknownVariable`] if no variable has that name.
    /// - [`ConfigurationError::VariableKindMismatch`] if it has another kind.
    pub fn variable(&self, name: &str, kind: VariableType) -> Result<&str, ConfigurationError> {
        let var = self
            .variables
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownVariable(name.into()))?;
        if var.kind != kind {
            return Err(ConfigurationError::VariableKindMismatch {
                name: name.into(),
                expected: kind,
                found: var.kind,
            });
        }
        Ok(var.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_and_states_resolve() {
        let config = Config::new()
            .with_limit(LimitType::PhysicalAddressLimit, 0xFFFF_FFFF)
            .with_global_state(GlobalStateType::Rv32, 1);
        assert_eq!(config.limit(LimitType::PhysicalAddressLimit), Ok(0xFFFF_FFFF));
        assert_eq!(config.global_state(GlobalStateType::Rv32), Ok(1));
    }

    #[test]
    fn missing_keys_are_errors() {
        let config = Config::new();
        assert_eq!(
            config.limit(LimitType::MaxPhysicalVectorLen),
            Err(ConfigurationError::UnknownLimit(LimitType::MaxPhysicalVectorLen))
        );
        assert_eq!(
            config.global_state(GlobalStateType::Rv32),
            Err(ConfigurationError::UnknownGlobalState(GlobalStateType::Rv32))
        );
        assert_eq!(
            config.variable("nope", VariableType::String),
            Err(ConfigurationError::UnknownVariable("nope".into()))
        );
    }

    #[test]
    fn variable_kind_must_match() {
        let config = Config::new().with_variable("x", VariableType::Value, "0x10");
        assert_eq!(config.variable("x", VariableType::Value), Ok("0x10"));
        assert_eq!(
            config.variable("x", VariableType::String),
            Err(ConfigurationError::VariableKindMismatch {
                name: "x".into(),
                expected: VariableType::String,
                found: VariableType::Value,
            })
        );
    }

    #[test]
    fn setters_overwrite() {
        let mut config = Config::new();
        config
            .set_limit(LimitType::MaxPhysicalVectorLen, 128)
            .set_limit(LimitType::MaxPhysicalVectorLen, 512);
        assert_eq!(config.limit(LimitType::MaxPhysicalVectorLen), Ok(512));
    }
}
