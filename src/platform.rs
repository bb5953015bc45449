//! Per-architecture defaults for platform-dependent flags.

use crate::{
    flags::{FlagValue, WORD_SIZE},
    jvmci::MAX_VECTOR_SIZE,
};

/// Supplies the default of every platform-dependent flag on one target.
pub trait PlatformDefaults {
    fn name(&self) -> &'static str;

    fn word_size(&self) -> i64 {
        WORD_SIZE
    }

    /// `None` when this platform has no opinion about `flag`.
    fn default_value(&self, flag: &str) -> Option<FlagValue>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct X86;

#[derive(Debug, Clone, Copy, Default)]
pub struct Sparc;

#[derive(Debug, Clone, Copy, Default)]
pub struct Arm;

#[derive(Debug, Clone, Copy, Default)]
pub struct Ppc;

impl PlatformDefaults for X86 {
    fn name(&self) -> &'static str {
        "x86"
    }

    fn default_value(&self, flag: &str) -> Option<FlagValue> {
        match flag {
            MAX_VECTOR_SIZE => Some(FlagValue::Intx(64)),
            _ => None,
        }
    }
}

impl PlatformDefaults for Sparc {
    fn name(&self) -> &'static str {
        "sparc"
    }

    fn default_value(&self, flag: &str) -> Option<FlagValue> {
        match flag {
            MAX_VECTOR_SIZE => Some(FlagValue::Intx(8)),
            _ => None,
        }
    }
}

impl PlatformDefaults for Arm {
    fn name(&self) -> &'static str {
        "arm"
    }

    fn default_value(&self, flag: &str) -> Option<FlagValue> {
        match flag {
            MAX_VECTOR_SIZE => Some(FlagValue::Intx(16)),
            _ => None,
        }
    }
}

impl PlatformDefaults for Ppc {
    fn name(&self) -> &'static str {
        "ppc"
    }

    fn default_value(&self, flag: &str) -> Option<FlagValue> {
        match flag {
            MAX_VECTOR_SIZE => Some(FlagValue::Intx(8)),
            _ => None,
        }
    }
}

/// The provider for the architecture this crate was compiled for.
pub fn host() -> &'static dyn PlatformDefaults {
    if cfg!(any(target_arch = "sparc", target_arch = "sparc64")) {
        &Sparc
    } else if cfg!(any(target_arch = "arm", target_arch = "aarch64")) {
        &Arm
    } else if cfg!(any(target_arch = "powerpc", target_arch = "powerpc64")) {
        &Ppc
    } else {
        &X86
    }
}

pub fn by_name(name: &str) -> Option<&'static dyn PlatformDefaults> {
    match name {
        "host" => Some(host()),
        "x86" | "x86_64" | "amd64" => Some(&X86),
        "sparc" | "sparcv9" => Some(&Sparc),
        "arm" | "aarch64" => Some(&Arm),
        "ppc" | "ppc64" => Some(&Ppc),
        _ => None,
    }
}
