use std::fmt::Write;

use serde::Serialize;

use crate::{
    arguments::SystemProperties,
    flags::{Category, FlagEntry, FlagOrigin, FlagTable, FlagType, FlagValue},
};

#[derive(Debug, Serialize)]
struct FlagRecord<'a> {
    name: &'static str,
    #[serde(rename = "type")]
    flag_type: FlagType,
    category: Category,
    value: &'a FlagValue,
    origin: FlagOrigin,
    description: &'static str,
}

impl<'a> From<FlagEntry<'a>> for FlagRecord<'a> {
    fn from(entry: FlagEntry<'a>) -> Self {
        FlagRecord {
            name: entry.name,
            flag_type: entry.flag_type,
            category: entry.category,
            value: entry.value,
            origin: entry.origin,
            description: entry.description,
        }
    }
}

fn write_entry(out: &mut String, entry: &FlagEntry<'_>) -> Result<(), std::fmt::Error> {
    // `:=` marks a value some override source wrote
    let assign = if entry.origin == FlagOrigin::Default { " =" } else { ":=" };
    let value = entry.value.to_string();
    writeln!(
        out,
        "{:>9} {:<40} {} {:<20} {{{}}} {{{}}}",
        entry.flag_type, entry.name, assign, value, entry.category, entry.origin
    )
}

/// One aligned line per flag, in declaration order.
pub fn print_flags_final(flags: &FlagTable) -> String {
    let mut out = String::from("[Global flags]\n");
    for entry in flags.entries() {
        // writing into a String cannot fail
        let _ = write_entry(&mut out, &entry);
    }
    out
}

pub fn to_json(flags: &FlagTable) -> Result<String, serde_json::Error> {
    let records = flags.entries().map(FlagRecord::from).collect::<Vec<_>>();
    serde_json::to_string_pretty(&records)
}

/// What `-XX:+JVMCIPrintProperties` shows: the flags, then the `jvmci.*`
/// system properties.
pub fn print_properties(flags: &FlagTable, properties: &SystemProperties) -> String {
    let mut out = print_flags_final(flags);
    out.push_str("[JVMCI properties]\n");
    for (key, value) in properties.range("jvmci.".to_owned()..) {
        if !key.starts_with("jvmci.") {
            break;
        }
        let _ = writeln!(out, "{key} = {value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        flags::BuildKind,
        jvmci::{JVMCI_FLAGS, JVMCI_THREADS},
        platform::X86,
    };
    use pretty_assertions::assert_eq;

    fn table() -> FlagTable {
        let mut table = FlagTable::with_declarations(JVMCI_FLAGS, BuildKind::Product).unwrap();
        table.resolve_defaults(&X86).unwrap();
        table
            .apply_override(JVMCI_THREADS, "3", FlagOrigin::CommandLine)
            .unwrap();
        table
    }

    #[test]
    fn test_flags_final_lines() {
        let text = print_flags_final(&table());
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "[Global flags]");
        assert_eq!(lines.len(), 1 + table().entries().count());
        assert_eq!(
            lines[1],
            format!(
                "{:>9} {:<40}  = {:<20} {{product}} {{default}}",
                "bool", "EnableJVMCI", "true"
            )
        );
        let threads = lines.iter().find(|l| l.contains("JVMCIThreads ")).unwrap();
        assert!(threads.contains(":= 3"));
        assert!(threads.ends_with("{product} {command line}"));
    }

    #[test]
    fn test_json_dump() {
        let json = to_json(&table()).unwrap();
        let records: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(records.len(), table().entries().count());
        assert_eq!(records[0]["name"], "EnableJVMCI");
        assert_eq!(records[0]["type"], "bool");
        assert_eq!(records[0]["value"], true);
        assert_eq!(records[0]["origin"], "default");

        let threads = records
            .iter()
            .find(|r| r["name"] == "JVMCIThreads")
            .unwrap();
        assert_eq!(threads["value"], 3);
        assert_eq!(threads["origin"], "command_line");

        let vector = records
            .iter()
            .find(|r| r["name"] == "MaxVectorSize")
            .unwrap();
        assert_eq!(vector["category"], "product_pd");
    }

    #[test]
    fn test_properties_listing() {
        let mut properties = SystemProperties::new();
        properties.insert("java.home".to_owned(), "/jdk".to_owned());
        properties.insert("jvmci.compiler".to_owned(), "graal".to_owned());
        properties.insert("zzz".to_owned(), "1".to_owned());
        let text = print_properties(&table(), &properties);
        let tail = text
            .split("[JVMCI properties]\n")
            .nth(1)
            .unwrap();
        assert_eq!(tail, "jvmci.compiler = graal\n");
    }
}
