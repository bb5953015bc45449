use log::trace;

use crate::flags::{FlagTable, FlagValue};

use super::Finding;

/// One cross-flag constraint. Rules only read the table.
pub trait ConsistencyRule {
    fn name(&self) -> String;

    fn check(&self, flags: &FlagTable) -> Vec<Finding>;
}

/// What a [`RequiresRule`] does when its dependency is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Reject,
    Warn,
}

/// The state a dependent flag relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Enabled(&'static str),
    Positive(&'static str),
}

impl Condition {
    fn flag(self) -> &'static str {
        match self {
            Condition::Enabled(flag) | Condition::Positive(flag) => flag,
        }
    }

    /// `None` if the flag is missing or has an unexpected type.
    fn holds(self, flags: &FlagTable) -> Option<bool> {
        match self {
            Condition::Enabled(flag) => flags.get(flag).ok()?.as_bool(),
            Condition::Positive(flag) => flags.get(flag).ok()?.as_i128().map(|v| v > 0),
        }
    }

    fn describe(self) -> String {
        match self {
            Condition::Enabled(flag) => format!("'{flag}' must be enabled"),
            Condition::Positive(flag) => format!("'{flag}' must be positive"),
        }
    }
}

fn registered(flags: &FlagTable, names: &[&str], rule: &str) -> bool {
    match names.iter().find(|name| !flags.contains(name)) {
        Some(missing) => {
            trace!("Skipping {rule}: {missing} is not part of this build");
            false
        }
        None => true,
    }
}

/// Keeps an integer flag inside an inclusive range.
#[derive(Debug, Clone)]
pub struct RangeRule {
    pub flag: &'static str,
    pub min: i128,
    pub max: i128,
}

impl RangeRule {
    pub fn new(flag: &'static str, min: i64, max: i64) -> Self {
        RangeRule {
            flag,
            min: i128::from(min),
            max: i128::from(max),
        }
    }
}

impl ConsistencyRule for RangeRule {
    fn name(&self) -> String {
        format!("range({})", self.flag)
    }

    fn check(&self, flags: &FlagTable) -> Vec<Finding> {
        if !registered(flags, &[self.flag], &self.name()) {
            return Vec::new();
        }
        let Some(value) = flags.get(self.flag).ok().and_then(FlagValue::as_i128) else {
            return Vec::new();
        };
        if value < self.min || value > self.max {
            vec![Finding::Reject(format!(
                "{}={} is outside the allowed range [ {} ... {} ]",
                self.flag, value, self.min, self.max
            ))]
        } else {
            Vec::new()
        }
    }
}

/// Requires an integer flag to be zero or a power of two.
#[derive(Debug, Clone)]
pub struct PowerOfTwoRule {
    pub flag: &'static str,
}

impl ConsistencyRule for PowerOfTwoRule {
    fn name(&self) -> String {
        format!("power-of-two({})", self.flag)
    }

    fn check(&self, flags: &FlagTable) -> Vec<Finding> {
        if !registered(flags, &[self.flag], &self.name()) {
            return Vec::new();
        }
        match flags.get(self.flag).ok().and_then(FlagValue::as_i128) {
            Some(value) if value > 0 && value & (value - 1) != 0 => vec![Finding::Reject(format!(
                "{}={} must be a power of 2",
                self.flag, value
            ))],
            _ => Vec::new(),
        }
    }
}

/// A flag that was explicitly set only makes sense when `condition` holds.
#[derive(Debug, Clone)]
pub struct RequiresRule {
    pub dependent: &'static str,
    pub condition: Condition,
    pub policy: Policy,
}

impl RequiresRule {
    pub fn reject(dependent: &'static str, condition: Condition) -> Self {
        RequiresRule {
            dependent,
            condition,
            policy: Policy::Reject,
        }
    }

    pub fn warn(dependent: &'static str, condition: Condition) -> Self {
        RequiresRule {
            dependent,
            condition,
            policy: Policy::Warn,
        }
    }
}

impl ConsistencyRule for RequiresRule {
    fn name(&self) -> String {
        format!("requires({} -> {})", self.dependent, self.condition.flag())
    }

    fn check(&self, flags: &FlagTable) -> Vec<Finding> {
        if !registered(flags, &[self.dependent, self.condition.flag()], &self.name()) {
            return Vec::new();
        }
        if flags.is_default(self.dependent).unwrap_or(true) {
            return Vec::new();
        }
        if self.condition.holds(flags) != Some(false) {
            return Vec::new();
        }

        let value = flags
            .get(self.dependent)
            .map(FlagValue::to_string)
            .unwrap_or_default();
        match self.policy {
            Policy::Reject => vec![Finding::Reject(format!(
                "improperly specified VM option '{}={}': {}",
                self.dependent,
                value,
                self.condition.describe()
            ))],
            Policy::Warn => vec![Finding::Warn(format!(
                "'{}={}' is ignored: {}",
                self.dependent,
                value,
                self.condition.describe()
            ))],
        }
    }
}

/// A worker count has to be at least one while its feature is on.
#[derive(Debug, Clone)]
pub struct PositiveWhenEnabled {
    pub flag: &'static str,
    pub feature: &'static str,
}

impl ConsistencyRule for PositiveWhenEnabled {
    fn name(&self) -> String {
        format!("thread-count({})", self.flag)
    }

    fn check(&self, flags: &FlagTable) -> Vec<Finding> {
        if !registered(flags, &[self.flag, self.feature], &self.name()) {
            return Vec::new();
        }
        if !Condition::Enabled(self.feature).holds(flags).unwrap_or(false) {
            return Vec::new();
        }
        match flags.get(self.flag).ok().and_then(FlagValue::as_i128) {
            Some(count) if count < 1 => vec![Finding::Reject(format!(
                "{}={} must be at least 1 when {} is enabled",
                self.flag, count, self.feature
            ))],
            _ => Vec::new(),
        }
    }
}
