//! Error types for flag registration, overrides and startup.

use std::{fmt, path::PathBuf};

use crate::{
    arguments::OverrideSource,
    flags::{BuildKind, Category, FlagType},
    validator::Violation,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlagError {
    #[error("duplicate flag name '{name}'")]
    DuplicateFlagName { name: String },

    #[error("unrecognized VM option '{name}'")]
    UnknownFlag { name: String },

    #[error("improperly specified VM option '{name}': '{value}' is not a valid {expected} value")]
    TypeMismatch {
        name: String,
        expected: FlagType,
        value: String,
    },

    #[error("VM option '{name}' is {category} and is not available in a {build} build")]
    NotAvailable {
        name: String,
        category: Category,
        build: BuildKind,
    },

    #[error("VM option '{name}' is declared by the C2 compiler in this build")]
    DeclaredByCompiler2 { name: String },

    #[error("flag defaults have not been resolved yet")]
    DefaultsNotResolved,

    #[error("flag defaults were already resolved")]
    DefaultsAlreadyResolved,

    #[error("platform '{platform}' supplies no default for '{name}'")]
    MissingPlatformDefault { name: String, platform: String },

    #[error("cannot register '{name}' once defaults are resolved")]
    RegistrationClosed { name: String },

    #[error("VM option '{name}' cannot be changed after the flag table was validated")]
    Frozen { name: String },
}

/// Every rule the validator found broken, in rule order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inconsistent JVMCI option(s)",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConsistencyError {}

#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    #[error("{source_kind}: {error}")]
    Flag {
        source_kind: OverrideSource,
        #[source]
        error: FlagError,
    },

    #[error("{source_kind}: malformed option '{token}'")]
    Malformed {
        source_kind: OverrideSource,
        token: String,
    },

    #[error("could not read {path}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Flag(#[from] FlagError),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error("unknown platform '{0}'")]
    UnknownPlatform(String),

    #[error("a flag table is already installed")]
    AlreadyInstalled,

    #[error("only a validated flag table can be installed")]
    NotValidated,
}
