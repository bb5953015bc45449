use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use jvmci_globals::{
    globals, printer,
    startup::{initialize, Startup, StartupOptions},
    BuildKind, StartupError,
};
use log::error;
use pretty_env_logger::env_logger;
use thiserror::Error;

/// Resolves, checks and prints the JVMCI flag set a VM would start with
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target platform whose defaults apply (x86, sparc, arm, ppc or host)
    #[arg(long, default_value = "host")]
    platform: String,

    /// Build configuration deciding which flags exist
    #[arg(long, value_enum)]
    build: Option<Build>,

    /// The VM includes the C2 compiler, which owns MaxVectorSize and ReduceInitialCardMarks
    #[arg(long)]
    compiler2: bool,

    /// File with one `+Flag`, `-Flag` or `Flag=value` per line
    #[arg(long)]
    flags_file: Option<PathBuf>,

    /// Java home holding lib/jvmci/compiler-name
    #[arg(long)]
    java_home: Option<PathBuf>,

    /// Print the final flag values even without -XX:+JVMCIPrintProperties
    #[arg(long)]
    print_flags: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// VM options such as -XX:+UseJVMCICompiler or -Djvmci.compiler=graal
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    vm_options: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Build {
    Product,
    Optimized,
    Debug,
}

impl From<Build> for BuildKind {
    fn from(build: Build) -> Self {
        match build {
            Build::Product => BuildKind::Product,
            Build::Optimized => BuildKind::Optimized,
            Build::Debug => BuildKind::Debug,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

impl Args {
    fn startup_options(&self) -> StartupOptions {
        StartupOptions {
            platform: self.platform.clone(),
            build: self.build.map(BuildKind::from).unwrap_or_else(BuildKind::current),
            compiler2: self.compiler2,
            flags_file: self.flags_file.clone(),
            env_options: None,
            command_line: self.vm_options.clone(),
            java_home: self.java_home.clone(),
        }
        .with_environment()
    }
}

fn render(startup: &Startup, format: Format) -> Result<String, serde_json::Error> {
    match format {
        Format::Json => printer::to_json(&startup.flags),
        Format::Text if startup.print_properties_requested() => {
            Ok(printer::print_properties(&startup.flags, &startup.properties))
        }
        Format::Text => Ok(printer::print_flags_final(&startup.flags)),
    }
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("could not render flags: {0}")]
    Render(#[from] serde_json::Error),
}

fn diagnostics(err: &RunError) -> Vec<String> {
    let mut lines = match err {
        RunError::Startup(StartupError::Consistency(consistency)) => consistency
            .violations
            .iter()
            .map(|violation| format!("Error: {violation}"))
            .collect(),
        other => vec![format!("Error: {other}")],
    };
    if let RunError::Startup(_) = err {
        lines.push("Error: Could not create the Java Virtual Machine.".to_owned());
    }
    lines
}

fn run(args: &Args) -> Result<Option<String>, RunError> {
    let startup = initialize(&args.startup_options())?;
    for warning in &startup.warnings {
        eprintln!("Warning: {warning}");
    }

    // JVMCIPrintProperties means print and exit
    let output = if args.print_flags || startup.print_properties_requested() {
        let text = render(&startup, args.format).map_err(|err| {
            error!("Could not render flags: {err}");
            err
        })?;
        Some(text)
    } else {
        None
    };

    globals::install(startup.flags)?;
    Ok(output)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(Some(output)) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => {
            for line in diagnostics(&err) {
                eprintln!("{line}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("jvmci-flags").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_vm_options_pass_through() {
        let args = args(&[
            "--platform",
            "sparc",
            "--build",
            "product",
            "-XX:+UseJVMCICompiler",
            "-XX:JVMCIThreads=2",
            "-Djvmci.compiler=graal",
        ]);
        let options = args.startup_options();
        assert_eq!(options.platform, "sparc");
        assert_eq!(options.build, BuildKind::Product);
        assert_eq!(
            options.command_line,
            vec![
                "-XX:+UseJVMCICompiler",
                "-XX:JVMCIThreads=2",
                "-Djvmci.compiler=graal"
            ]
        );
    }

    #[test]
    fn test_print_properties_renders_text() {
        let args = args(&["--platform", "x86", "--build", "product", "-XX:+JVMCIPrintProperties"]);
        let startup = initialize(&StartupOptions {
            env_options: None,
            ..args.startup_options()
        })
        .unwrap();
        let text = render(&startup, Format::Text).unwrap();
        assert!(text.starts_with("[Global flags]\n"));
        assert!(text.contains("[JVMCI properties]"));
    }

    #[test]
    fn test_json_format() {
        let args = args(&["--format", "json", "--build", "debug", "--platform", "arm"]);
        let startup = initialize(&StartupOptions {
            env_options: None,
            ..args.startup_options()
        })
        .unwrap();
        let json = render(&startup, args.format).unwrap();
        assert!(json.contains("\"name\": \"JVMCIUseFastLocking\""));
    }

    #[test]
    fn test_inconsistent_options_fail() {
        let args = args(&[
            "--platform",
            "x86",
            "-XX:+UseJVMCICompiler",
            "-XX:JVMCIThreads=0",
        ]);
        let err = initialize(&StartupOptions {
            env_options: None,
            ..args.startup_options()
        })
        .unwrap_err();
        assert!(matches!(err, StartupError::Consistency(_)));

        let lines = diagnostics(&RunError::from(err));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Error: Could not create the Java Virtual Machine.")
        );
    }

    #[test]
    fn test_compiler2_flag() {
        let options = args(&["--compiler2", "--build", "product", "-XX:+EnableJVMCI"])
            .startup_options();
        assert!(options.compiler2);
        assert_eq!(options.command_line, vec!["-XX:+EnableJVMCI"]);
        assert!(!args(&[]).startup_options().compiler2);
    }

    #[test]
    fn test_render_failure_is_an_error() {
        let err = RunError::from(serde_json::from_str::<u8>("x").unwrap_err());
        let lines = diagnostics(&err);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Error: could not render flags:"));
    }
}
