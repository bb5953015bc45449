use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub const K: i64 = 1024;
pub const M: i64 = K * K;
pub const G: i64 = M * K;

/// Width of a heap word on the target, in bytes.
pub const WORD_SIZE: i64 = std::mem::size_of::<usize>() as i64;

/// The largest value a Java `int` can hold.
pub const MAX_JINT: i64 = i32::MAX as i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    Bool,
    Intx,
    Uintx,
    Double,
    Ccstr,
}

impl Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlagType::Bool => "bool",
            FlagType::Intx => "intx",
            FlagType::Uintx => "uintx",
            FlagType::Double => "double",
            FlagType::Ccstr => "ccstr",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Intx(i64),
    Uintx(u64),
    Double(f64),
    Ccstr(String),
}

impl FlagValue {
    pub fn flag_type(&self) -> FlagType {
        match self {
            FlagValue::Bool(_) => FlagType::Bool,
            FlagValue::Intx(_) => FlagType::Intx,
            FlagValue::Uintx(_) => FlagType::Uintx,
            FlagValue::Double(_) => FlagType::Double,
            FlagValue::Ccstr(_) => FlagType::Ccstr,
        }
    }

    /// Coerces `raw` to a value of type `flag_type`. `None` means the text
    /// does not denote such a value.
    pub fn parse(flag_type: FlagType, raw: &str) -> Option<FlagValue> {
        match flag_type {
            FlagType::Bool => match raw {
                "true" => Some(FlagValue::Bool(true)),
                "false" => Some(FlagValue::Bool(false)),
                _ => None,
            },
            FlagType::Intx => {
                let (negative, digits) = match raw.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, raw),
                };
                let magnitude = i128::from(parse_unsigned(digits)?);
                let value = if negative { -magnitude } else { magnitude };
                i64::try_from(value).ok().map(FlagValue::Intx)
            }
            FlagType::Uintx => parse_unsigned(raw).map(FlagValue::Uintx),
            FlagType::Double => raw
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .map(FlagValue::Double),
            FlagType::Ccstr => Some(FlagValue::Ccstr(raw.to_owned())),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_intx(&self) -> Option<i64> {
        match self {
            FlagValue::Intx(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_uintx(&self) -> Option<u64> {
        match self {
            FlagValue::Uintx(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            FlagValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_ccstr(&self) -> Option<&str> {
        match self {
            FlagValue::Ccstr(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view used by range rules; booleans and strings have none.
    pub(crate) fn as_i128(&self) -> Option<i128> {
        match self {
            FlagValue::Intx(i) => Some(i128::from(*i)),
            FlagValue::Uintx(u) => Some(i128::from(*u)),
            _ => None,
        }
    }
}

impl Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Intx(i) => write!(f, "{i}"),
            FlagValue::Uintx(u) => write!(f, "{u}"),
            // `{:?}` keeps the fractional part so the text parses back to the same f64
            FlagValue::Double(d) => write!(f, "{d:?}"),
            FlagValue::Ccstr(s) => write!(f, "{s}"),
        }
    }
}

/// Decimal or `0x` hex, with an optional binary-multiple suffix.
fn parse_unsigned(raw: &str) -> Option<u64> {
    let (number, multiplier) = match raw.chars().last()? {
        'k' | 'K' => (&raw[..raw.len() - 1], K as u64),
        'm' | 'M' => (&raw[..raw.len() - 1], M as u64),
        'g' | 'G' => (&raw[..raw.len() - 1], G as u64),
        _ => (raw, 1),
    };
    if number.is_empty() || number.starts_with('+') {
        return None;
    }
    let base = match number
        .strip_prefix("0x")
        .or_else(|| number.strip_prefix("0X"))
    {
        Some(hex) if !hex.is_empty() && !hex.starts_with('+') => u64::from_str_radix(hex, 16).ok()?,
        Some(_) => return None,
        None => number.parse::<u64>().ok()?,
    };
    base.checked_mul(multiplier)
}

/// A compiled-in default. `Platform` defers to the platform provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Intx(i64),
    Uintx(u64),
    Double(f64),
    Ccstr(&'static str),
    /// An `intx` counted in heap words of the target platform.
    Words(i64),
    Platform,
}

impl DefaultValue {
    pub const fn flag_type(&self) -> Option<FlagType> {
        match self {
            DefaultValue::Bool(_) => Some(FlagType::Bool),
            DefaultValue::Intx(_) | DefaultValue::Words(_) => Some(FlagType::Intx),
            DefaultValue::Uintx(_) => Some(FlagType::Uintx),
            DefaultValue::Double(_) => Some(FlagType::Double),
            DefaultValue::Ccstr(_) => Some(FlagType::Ccstr),
            DefaultValue::Platform => None,
        }
    }

    /// The concrete value on a target whose heap words are `word_size`
    /// bytes wide. `None` for platform-dependent defaults and on overflow.
    pub fn resolve(&self, word_size: i64) -> Option<FlagValue> {
        match *self {
            DefaultValue::Bool(b) => Some(FlagValue::Bool(b)),
            DefaultValue::Intx(i) => Some(FlagValue::Intx(i)),
            DefaultValue::Words(words) => words.checked_mul(word_size).map(FlagValue::Intx),
            DefaultValue::Uintx(u) => Some(FlagValue::Uintx(u)),
            DefaultValue::Double(d) => Some(FlagValue::Double(d)),
            DefaultValue::Ccstr(s) => Some(FlagValue::Ccstr(s.to_owned())),
            DefaultValue::Platform => None,
        }
    }
}
