//! Builds the validated flag table the VM starts with.

use std::{env, path::PathBuf};

use log::info;

use crate::{
    arguments::{self, OverrideSource, SystemProperties, JAVA_TOOL_OPTIONS},
    ergonomics,
    error::StartupError,
    flags::{BuildKind, FlagTable},
    jvmci::{JVMCI_FLAGS, JVMCI_PRINT_PROPERTIES},
    platform,
    validator::{Validator, Warning},
};

#[derive(Debug, Clone)]
pub struct StartupOptions {
    /// Platform provider name, see [`platform::by_name`].
    pub platform: String,
    pub build: BuildKind,
    /// Whether the VM includes the C2 compiler.
    pub compiler2: bool,
    pub flags_file: Option<PathBuf>,
    /// Contents of `JAVA_TOOL_OPTIONS`.
    pub env_options: Option<String>,
    pub command_line: Vec<String>,
    pub java_home: Option<PathBuf>,
}

impl Default for StartupOptions {
    fn default() -> Self {
        StartupOptions {
            platform: "host".to_owned(),
            build: BuildKind::current(),
            compiler2: false,
            flags_file: None,
            env_options: None,
            command_line: Vec::new(),
            java_home: None,
        }
    }
}

impl StartupOptions {
    /// Picks up `JAVA_TOOL_OPTIONS` from the process environment.
    pub fn with_environment(mut self) -> Self {
        self.env_options = env::var(JAVA_TOOL_OPTIONS).ok();
        self
    }
}

#[derive(Debug)]
pub struct Startup {
    pub flags: FlagTable,
    pub warnings: Vec<Warning>,
    pub properties: SystemProperties,
    pub compiler: Option<String>,
}

impl Startup {
    pub fn print_properties_requested(&self) -> bool {
        self.flags.get_bool(JVMCI_PRINT_PROPERTIES).unwrap_or(false)
    }
}

pub fn initialize(options: &StartupOptions) -> Result<Startup, StartupError> {
    initialize_with(options, &Validator::jvmci())
}

/// Declarations, platform defaults, flags file, environment, command line,
/// ergonomics, then `validator`.
pub fn initialize_with(
    options: &StartupOptions,
    validator: &Validator,
) -> Result<Startup, StartupError> {
    let platform = platform::by_name(&options.platform)
        .ok_or_else(|| StartupError::UnknownPlatform(options.platform.clone()))?;

    let mut flags = FlagTable::with_configuration(JVMCI_FLAGS, options.build, options.compiler2)?;
    flags.resolve_defaults(platform)?;

    let mut properties = SystemProperties::new();
    if let Some(path) = &options.flags_file {
        arguments::apply_flags_file(&mut flags, path)?;
    }
    if let Some(env_options) = &options.env_options {
        info!("Picked up {JAVA_TOOL_OPTIONS}: {env_options}");
        arguments::apply_tokens(
            &mut flags,
            &mut properties,
            arguments::split_options(env_options),
            OverrideSource::EnvironmentVariable,
        )?;
    }
    arguments::apply_tokens(
        &mut flags,
        &mut properties,
        &options.command_line,
        OverrideSource::CommandLine,
    )?;

    let compiler = ergonomics::selected_compiler(&properties, options.java_home.as_deref());
    ergonomics::set_jvmci_specific_flags(&mut flags, compiler.as_deref())?;

    let warnings = flags.validate(validator)?;
    info!(
        "JVMCI flags are consistent ({} flags, {} warnings)",
        flags.entries().count(),
        warnings.len()
    );
    Ok(Startup {
        flags,
        warnings,
        properties,
        compiler,
    })
}
