//! Flag values the VM picks by itself from the rest of the configuration.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::{
    arguments::SystemProperties,
    error::FlagError,
    flags::{FlagOrigin, FlagTable, FlagValue},
    jvmci::{ENABLE_JVMCI, USE_JVMCI_COMPILER},
};

/// System property naming the JVMCI compiler to select.
pub const JVMCI_COMPILER_PROPERTY: &str = "jvmci.compiler";

pub fn compiler_name_file(java_home: &Path) -> PathBuf {
    java_home.join("lib").join("jvmci").join("compiler-name")
}

/// The compiler selected by the `jvmci.compiler` property, or failing that
/// by the first line of `<java.home>/lib/jvmci/compiler-name`.
pub fn selected_compiler(properties: &SystemProperties, java_home: Option<&Path>) -> Option<String> {
    if let Some(name) = properties.get(JVMCI_COMPILER_PROPERTY) {
        return Some(name.clone()).filter(|name| !name.is_empty());
    }

    let path = compiler_name_file(java_home?);
    match fs::read_to_string(&path) {
        Ok(contents) => contents
            .lines()
            .next()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned),
        Err(error) if error.kind() == io::ErrorKind::NotFound => None,
        Err(error) => {
            warn!("Could not read {}: {error}", path.display());
            None
        }
    }
}

/// Turns on `UseJVMCICompiler` when a compiler was selected, unless the user
/// already decided either way or JVMCI is off.
pub fn set_jvmci_specific_flags(
    flags: &mut FlagTable,
    compiler: Option<&str>,
) -> Result<(), FlagError> {
    let Some(compiler) = compiler else {
        return Ok(());
    };
    if !flags.get_bool(ENABLE_JVMCI)? {
        info!("JVMCI is disabled, not selecting compiler '{compiler}'");
        return Ok(());
    }
    if flags.is_default(USE_JVMCI_COMPILER)? {
        info!("Selecting JVMCI compiler '{compiler}'");
        flags.set_value(USE_JVMCI_COMPILER, FlagValue::Bool(true), FlagOrigin::Ergonomic)?;
    }
    Ok(())
}
