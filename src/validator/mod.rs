//! Cross-flag consistency checking.
//!
//! The validator runs every rule against a fully configured table and
//! reports all broken rules together. It never changes a value.

mod rules;

use std::fmt::{self, Display};

use derive_new::new;
use log::{debug, error, warn};

pub use rules::{
    Condition, ConsistencyRule, Policy, PositiveWhenEnabled, PowerOfTwoRule, RangeRule,
    RequiresRule,
};

use crate::{error::ConsistencyError, flags::FlagTable, flags::MAX_JINT, jvmci::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    Reject(String),
    Warn(String),
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Violation {
    pub rule: String,
    pub message: String,
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.rule)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Warning {
    pub rule: String,
    pub message: String,
}

impl Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.rule)
    }
}

#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ConsistencyRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Validator::default()
    }

    pub fn with_rule(mut self, rule: impl ConsistencyRule + 'static) -> Self {
        self.add_rule(rule);
        self
    }

    pub fn add_rule(&mut self, rule: impl ConsistencyRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// The rules the VM enforces on the JVMCI flags.
    pub fn jvmci() -> Self {
        let enabled = Condition::Enabled(ENABLE_JVMCI);
        Validator::new()
            .with_rule(RequiresRule::reject(USE_JVMCI_COMPILER, enabled))
            .with_rule(RequiresRule::reject(BOOTSTRAP_JVMCI, enabled))
            .with_rule(RequiresRule::reject(EAGER_JVMCI, enabled))
            .with_rule(RequiresRule::reject(JVMCI_PRINT_PROPERTIES, enabled))
            .with_rule(RequiresRule::reject(USE_JVMCI_CLASS_LOADER, enabled))
            .with_rule(RequiresRule::reject(
                BOOTSTRAP_JVMCI,
                Condition::Enabled(USE_JVMCI_COMPILER),
            ))
            .with_rule(RequiresRule::warn(
                PRINT_BOOTSTRAP,
                Condition::Enabled(BOOTSTRAP_JVMCI),
            ))
            .with_rule(RequiresRule::warn(
                JVMCI_COUNTERS_EXCLUDE_COMPILER,
                Condition::Positive(JVMCI_COUNTER_SIZE),
            ))
            .with_rule(RequiresRule::warn(TRACE_UNCOLLECTED_SPECULATIONS, enabled))
            .with_rule(PositiveWhenEnabled {
                flag: JVMCI_THREADS,
                feature: USE_JVMCI_COMPILER,
            })
            .with_rule(PositiveWhenEnabled {
                flag: JVMCI_HOST_THREADS,
                feature: USE_JVMCI_COMPILER,
            })
            .with_rule(RangeRule::new(JVMCI_NMETHOD_SIZE_LIMIT, 0, MAX_JINT))
            .with_rule(RangeRule::new(JVMCI_COUNTER_SIZE, 0, 1_000_000))
            .with_rule(RangeRule::new(JVMCI_TRACE_LEVEL, 0, 10))
            .with_rule(RangeRule::new(METHOD_PROFILE_WIDTH, 0, 64))
            .with_rule(RangeRule::new(MAX_VECTOR_SIZE, 0, 64))
            .with_rule(PowerOfTwoRule {
                flag: MAX_VECTOR_SIZE,
            })
    }

    /// Runs every rule. Succeeds with the warnings if no rule rejected the
    /// configuration, otherwise fails with every rejection.
    pub fn check(&self, flags: &FlagTable) -> Result<Vec<Warning>, ConsistencyError> {
        let mut violations = Vec::new();
        let mut warnings = Vec::new();

        for rule in &self.rules {
            for finding in rule.check(flags) {
                match finding {
                    Finding::Reject(message) => {
                        error!("{message}");
                        violations.push(Violation::new(rule.name(), message));
                    }
                    Finding::Warn(message) => {
                        warn!("{message}");
                        warnings.push(Warning::new(rule.name(), message));
                    }
                }
            }
        }

        debug!(
            "Checked {} rules: {} violations, {} warnings",
            self.rules.len(),
            violations.len(),
            warnings.len()
        );
        if violations.is_empty() {
            Ok(warnings)
        } else {
            Err(ConsistencyError { violations })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        flags::{BuildKind, FlagOrigin, ValidationState},
        platform::{Arm, X86},
    };
    use pretty_assertions::assert_eq;
    use pretty_env_logger::env_logger;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn table(build: BuildKind, overrides: &[(&str, &str)]) -> FlagTable {
        let mut table = FlagTable::with_declarations(JVMCI_FLAGS, build).unwrap();
        table.resolve_defaults(&X86).unwrap();
        for (name, value) in overrides {
            table
                .apply_override(name, value, FlagOrigin::CommandLine)
                .unwrap();
        }
        table
    }

    fn rules_of(error: &ConsistencyError) -> Vec<&str> {
        error.violations.iter().map(|v| v.rule.as_str()).collect()
    }

    #[test]
    fn test_defaults_are_consistent() {
        init();
        for build in [BuildKind::Product, BuildKind::Optimized, BuildKind::Debug] {
            let flags = table(build, &[]);
            assert_eq!(Validator::jvmci().check(&flags), Ok(Vec::new()));
        }
    }

    #[test]
    fn test_zero_threads_with_compiler_enabled() {
        init();
        let flags = table(
            BuildKind::Product,
            &[
                (ENABLE_JVMCI, "true"),
                (USE_JVMCI_COMPILER, "true"),
                (JVMCI_THREADS, "0"),
            ],
        );
        let error = Validator::jvmci().check(&flags).unwrap_err();
        assert_eq!(rules_of(&error), vec!["thread-count(JVMCIThreads)"]);
        assert!(error.violations[0].message.contains("JVMCIThreads=0"));
    }

    #[test]
    fn test_zero_threads_ignored_without_compiler() {
        let flags = table(BuildKind::Product, &[(JVMCI_THREADS, "0")]);
        assert_eq!(Validator::jvmci().check(&flags), Ok(Vec::new()));
    }

    #[test]
    fn test_negative_size_limit_is_rejected_not_clamped() {
        let flags = table(BuildKind::Product, &[(JVMCI_NMETHOD_SIZE_LIMIT, "-1")]);
        let error = Validator::jvmci().check(&flags).unwrap_err();
        assert_eq!(rules_of(&error), vec!["range(JVMCINMethodSizeLimit)"]);
        assert_eq!(flags.get_intx(JVMCI_NMETHOD_SIZE_LIMIT), Ok(-1));
    }

    #[test]
    fn test_size_limit_ceiling() {
        let over = (i64::from(i32::MAX) + 1).to_string();
        let flags = table(BuildKind::Product, &[(JVMCI_NMETHOD_SIZE_LIMIT, &over)]);
        assert!(Validator::jvmci().check(&flags).is_err());

        let at = i32::MAX.to_string();
        let flags = table(BuildKind::Product, &[(JVMCI_NMETHOD_SIZE_LIMIT, &at)]);
        assert!(Validator::jvmci().check(&flags).is_ok());
    }

    #[test]
    fn test_all_violations_reported_together() {
        let flags = table(
            BuildKind::Product,
            &[
                (USE_JVMCI_COMPILER, "true"),
                (JVMCI_THREADS, "0"),
                (JVMCI_NMETHOD_SIZE_LIMIT, "-1"),
            ],
        );
        let error = Validator::jvmci().check(&flags).unwrap_err();
        assert_eq!(
            rules_of(&error),
            vec!["thread-count(JVMCIThreads)", "range(JVMCINMethodSizeLimit)"]
        );
    }

    #[test]
    fn test_check_is_idempotent_and_read_only() {
        let flags = table(
            BuildKind::Debug,
            &[(JVMCI_COUNTER_SIZE, "-5"), (MAX_VECTOR_SIZE, "24")],
        );
        let before = flags.to_overrides();
        let validator = Validator::jvmci();
        let first = validator.check(&flags);
        let second = validator.check(&flags);
        assert_eq!(first, second);
        assert_eq!(flags.to_overrides(), before);
        assert_eq!(
            rules_of(&first.unwrap_err()),
            vec!["range(JVMCICounterSize)", "power-of-two(MaxVectorSize)"]
        );
    }

    #[test]
    fn test_features_require_enable_jvmci() {
        let flags = table(
            BuildKind::Product,
            &[
                (ENABLE_JVMCI, "false"),
                (USE_JVMCI_COMPILER, "true"),
                (BOOTSTRAP_JVMCI, "true"),
            ],
        );
        let error = Validator::jvmci().check(&flags).unwrap_err();
        assert_eq!(
            rules_of(&error),
            vec![
                "requires(UseJVMCICompiler -> EnableJVMCI)",
                "requires(BootstrapJVMCI -> EnableJVMCI)",
            ]
        );
        assert!(error.violations[0]
            .message
            .contains("'EnableJVMCI' must be enabled"));
    }

    #[test]
    fn test_disabled_jvmci_with_untouched_flags_is_fine() {
        let flags = table(BuildKind::Product, &[(ENABLE_JVMCI, "false")]);
        assert_eq!(Validator::jvmci().check(&flags), Ok(Vec::new()));
    }

    #[test]
    fn test_bootstrap_requires_compiler() {
        let flags = table(BuildKind::Product, &[(BOOTSTRAP_JVMCI, "true")]);
        let error = Validator::jvmci().check(&flags).unwrap_err();
        assert_eq!(
            rules_of(&error),
            vec!["requires(BootstrapJVMCI -> UseJVMCICompiler)"]
        );
    }

    #[test]
    fn test_tracing_without_owner_warns() {
        let flags = table(
            BuildKind::Debug,
            &[
                (PRINT_BOOTSTRAP, "false"),
                (JVMCI_COUNTERS_EXCLUDE_COMPILER, "false"),
            ],
        );
        let warnings = Validator::jvmci().check(&flags).unwrap();
        assert_eq!(
            warnings.iter().map(|w| w.rule.as_str()).collect::<Vec<_>>(),
            vec![
                "requires(PrintBootstrap -> BootstrapJVMCI)",
                "requires(JVMCICountersExcludeCompiler -> JVMCICounterSize)",
            ]
        );
    }

    #[test]
    fn test_develop_rule_skipped_in_product_build() {
        let mut flags = table(BuildKind::Product, &[(ENABLE_JVMCI, "false")]);
        assert!(!flags.contains(TRACE_UNCOLLECTED_SPECULATIONS));
        assert_eq!(flags.validate(&Validator::jvmci()), Ok(Vec::new()));

        let flags = table(
            BuildKind::Debug,
            &[(ENABLE_JVMCI, "false"), (TRACE_UNCOLLECTED_SPECULATIONS, "true")],
        );
        let warnings = Validator::jvmci().check(&flags).unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_vector_rules_skipped_with_compiler2() {
        let mut flags =
            FlagTable::with_configuration(JVMCI_FLAGS, BuildKind::Product, true).unwrap();
        flags.resolve_defaults(&Arm).unwrap();
        assert!(!flags.contains(MAX_VECTOR_SIZE));

        let validator = Validator::jvmci().with_rule(RangeRule::new(MAX_VECTOR_SIZE, 32, 64));
        assert_eq!(flags.validate(&validator), Ok(Vec::new()));
        assert_eq!(flags.state(), ValidationState::Valid);
    }

    #[test]
    fn test_custom_rules_extend_the_set() {
        let mut flags = FlagTable::with_declarations(JVMCI_FLAGS, BuildKind::Product).unwrap();
        flags.resolve_defaults(&Arm).unwrap();
        let validator = Validator::jvmci().with_rule(RangeRule::new(MAX_VECTOR_SIZE, 32, 64));
        assert!(validator
            .rule_names()
            .contains(&"range(MaxVectorSize)".to_owned()));
        let error = flags.validate(&validator).unwrap_err();
        assert_eq!(rules_of(&error), vec!["range(MaxVectorSize)"]);
        assert_eq!(flags.state(), ValidationState::Invalid);

        // recovery is changing the value and validating again
        flags
            .apply_override(MAX_VECTOR_SIZE, "32", FlagOrigin::CommandLine)
            .unwrap();
        assert_eq!(flags.state(), ValidationState::Unvalidated);
        assert!(flags.validate(&validator).is_ok());
        assert_eq!(flags.state(), ValidationState::Valid);
    }
}
