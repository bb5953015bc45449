//! Turns VM options from the flags file, the environment and the command
//! line into flag overrides and system properties.

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    fs,
    path::Path,
};

use log::{debug, info};

use crate::{
    error::ArgumentError,
    flags::{FlagOrigin, FlagTable},
};

pub const JAVA_TOOL_OPTIONS: &str = "JAVA_TOOL_OPTIONS";

/// `-Dkey=value` settings, ordered by key.
pub type SystemProperties = BTreeMap<String, String>;

/// Override sources, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideSource {
    FlagsFile,
    EnvironmentVariable,
    CommandLine,
}

impl OverrideSource {
    pub fn origin(self) -> FlagOrigin {
        match self {
            OverrideSource::FlagsFile => FlagOrigin::FlagsFile,
            OverrideSource::EnvironmentVariable => FlagOrigin::EnvironmentVariable,
            OverrideSource::CommandLine => FlagOrigin::CommandLine,
        }
    }
}

impl Display for OverrideSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideSource::FlagsFile => write!(f, "flags file"),
            OverrideSource::EnvironmentVariable => write!(f, "{JAVA_TOOL_OPTIONS}"),
            OverrideSource::CommandLine => write!(f, "command line"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmOption {
    Flag { name: String, value: String },
    Property { key: String, value: String },
    /// Not ours; some other subsystem consumes it.
    Other(String),
}

fn is_flag_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `+Name`, `-Name` or `Name=value`, the body shared by `-XX:` options and
/// flags-file lines.
fn parse_setting(body: &str) -> Option<VmOption> {
    let (name, value) = if let Some(name) = body.strip_prefix('+') {
        (name, "true")
    } else if let Some(name) = body.strip_prefix('-') {
        (name, "false")
    } else {
        body.split_once('=')?
    };
    is_flag_name(name).then(|| VmOption::Flag {
        name: name.to_owned(),
        value: value.to_owned(),
    })
}

/// Classifies one command-line token. `None` means it looks like a flag
/// setting but is malformed.
pub fn parse_token(token: &str) -> Option<VmOption> {
    if let Some(body) = token.strip_prefix("-XX:") {
        return parse_setting(body);
    }
    if let Some(body) = token.strip_prefix("-D") {
        let (key, value) = body.split_once('=').unwrap_or((body, ""));
        if key.is_empty() {
            return None;
        }
        return Some(VmOption::Property {
            key: key.to_owned(),
            value: value.to_owned(),
        });
    }
    if let Some((name, value)) = token.strip_prefix('-').and_then(|t| t.split_once('=')) {
        if is_flag_name(name) {
            return Some(VmOption::Flag {
                name: name.to_owned(),
                value: value.to_owned(),
            });
        }
    }
    Some(VmOption::Other(token.to_owned()))
}

/// Splits an options string on whitespace. Single or double quotes group
/// a run of text that contains whitespace.
pub fn split_options(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote = None;

    for c in text.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

fn apply(
    table: &mut FlagTable,
    properties: &mut SystemProperties,
    option: VmOption,
    source: OverrideSource,
) -> Result<(), ArgumentError> {
    match option {
        VmOption::Flag { name, value } => table
            .apply_override(&name, &value, source.origin())
            .map_err(|error| ArgumentError::Flag {
                source_kind: source,
                error,
            }),
        VmOption::Property { key, value } => {
            debug!("Property {key}={value} from {source}");
            properties.insert(key, value);
            Ok(())
        }
        VmOption::Other(token) => {
            debug!("Ignoring option '{token}' from {source}");
            Ok(())
        }
    }
}

/// Applies a token sequence in order. Stops at the first bad token.
pub fn apply_tokens<I, S>(
    table: &mut FlagTable,
    properties: &mut SystemProperties,
    tokens: I,
    source: OverrideSource,
) -> Result<(), ArgumentError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for token in tokens {
        let token = token.as_ref();
        let option = parse_token(token).ok_or_else(|| ArgumentError::Malformed {
            source_kind: source,
            token: token.to_owned(),
        })?;
        apply(table, properties, option, source)?;
    }
    Ok(())
}

/// Applies the contents of a flags file: one setting per line, `#`
/// starts a comment line.
pub fn apply_flags_file_contents(
    table: &mut FlagTable,
    contents: &str,
) -> Result<(), ArgumentError> {
    let source = OverrideSource::FlagsFile;
    let mut properties = SystemProperties::new();
    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let option = parse_setting(line).ok_or_else(|| ArgumentError::Malformed {
            source_kind: source,
            token: line.to_owned(),
        })?;
        apply(table, &mut properties, option, source)?;
    }
    Ok(())
}

pub fn apply_flags_file(table: &mut FlagTable, path: &Path) -> Result<(), ArgumentError> {
    let contents = fs::read_to_string(path).map_err(|error| ArgumentError::Io {
        path: path.to_owned(),
        error,
    })?;
    info!("Reading VM options from {}", path.display());
    apply_flags_file_contents(table, &contents)
}
