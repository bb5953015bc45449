use std::collections::HashMap;

use derive_new::new;
use log::{debug, info, trace};

use crate::{
    error::{ConsistencyError, FlagError},
    platform::PlatformDefaults,
    validator::{Validator, Violation, Warning},
};

use super::{
    descriptor::{BuildKind, Category, FlagDescriptor, FlagOrigin},
    value::{FlagType, FlagValue},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    Unvalidated,
    Valid,
    Invalid,
}

#[derive(Debug, Clone)]
struct Slot {
    value: FlagValue,
    default: FlagValue,
    origin: FlagOrigin,
}

/// One row of [`FlagTable::entries`].
#[derive(Debug, Clone, PartialEq, new)]
pub struct FlagEntry<'a> {
    pub name: &'static str,
    pub category: Category,
    pub flag_type: FlagType,
    pub value: &'a FlagValue,
    pub origin: FlagOrigin,
    pub description: &'static str,
}

/// Why a declared flag is missing from this table.
#[derive(Debug, Clone, Copy)]
enum Exclusion {
    Build(Category),
    Compiler2,
}

/// Owns every flag descriptor and the live value bound to it.
///
/// The table goes through three phases: registration, default resolution
/// and override application. After a successful [`FlagTable::validate`] it
/// refuses further writes.
#[derive(Debug, Clone)]
pub struct FlagTable {
    build: BuildKind,
    compiler2: bool,
    descriptors: Vec<FlagDescriptor>,
    index: HashMap<&'static str, usize>,
    // declared but filtered out by the build configuration
    unavailable: HashMap<&'static str, Exclusion>,
    slots: Option<Vec<Slot>>,
    state: ValidationState,
}

impl FlagTable {
    pub fn new(build: BuildKind) -> Self {
        FlagTable::configured(build, false)
    }

    /// An empty table for `build`, with or without the C2 compiler.
    pub fn configured(build: BuildKind, compiler2: bool) -> Self {
        FlagTable {
            build,
            compiler2,
            descriptors: Vec::new(),
            index: HashMap::new(),
            unavailable: HashMap::new(),
            slots: None,
            state: ValidationState::Unvalidated,
        }
    }

    /// Registers every descriptor of `declarations` that exists in `build`,
    /// keeping declaration order.
    pub fn with_declarations(
        declarations: &[FlagDescriptor],
        build: BuildKind,
    ) -> Result<Self, FlagError> {
        FlagTable::with_configuration(declarations, build, false)
    }

    pub fn with_configuration(
        declarations: &[FlagDescriptor],
        build: BuildKind,
        compiler2: bool,
    ) -> Result<Self, FlagError> {
        let mut table = FlagTable::configured(build, compiler2);
        for descriptor in declarations {
            table.register(*descriptor)?;
        }
        Ok(table)
    }

    pub fn build(&self) -> BuildKind {
        self.build
    }

    pub fn compiler2(&self) -> bool {
        self.compiler2
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    pub fn register(&mut self, descriptor: FlagDescriptor) -> Result<(), FlagError> {
        let name = descriptor.name;
        if self.slots.is_some() {
            return Err(FlagError::RegistrationClosed { name: name.to_owned() });
        }
        if self.index.contains_key(name) || self.unavailable.contains_key(name) {
            return Err(FlagError::DuplicateFlagName { name: name.to_owned() });
        }

        if !self.build.includes(descriptor.category) {
            trace!(
                "Skipping {} flag {} in {} build",
                descriptor.category,
                name,
                self.build
            );
            self.unavailable.insert(name, Exclusion::Build(descriptor.category));
            return Ok(());
        }
        if !descriptor.availability.includes(self.compiler2) {
            trace!("Skipping {name}, declared by C2 in this build");
            self.unavailable.insert(name, Exclusion::Compiler2);
            return Ok(());
        }

        debug!("Registering {} {} ({})", descriptor.flag_type, name, descriptor.category);
        self.index.insert(name, self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Binds the initial value of every flag. Platform-dependent flags ask
    /// `platform`; the rest use their compiled-in default, with word counts
    /// scaled by the platform's word size. Runs once.
    pub fn resolve_defaults(&mut self, platform: &dyn PlatformDefaults) -> Result<(), FlagError> {
        if self.slots.is_some() {
            return Err(FlagError::DefaultsAlreadyResolved);
        }

        let word_size = platform.word_size();
        let mut slots = Vec::with_capacity(self.descriptors.len());
        for descriptor in &self.descriptors {
            let value = if descriptor.category.is_platform_dependent() {
                platform
                    .default_value(descriptor.name)
                    .filter(|value| value.flag_type() == descriptor.flag_type)
                    .ok_or_else(|| FlagError::MissingPlatformDefault {
                        name: descriptor.name.to_owned(),
                        platform: platform.name().to_owned(),
                    })?
            } else {
                descriptor
                    .default
                    .resolve(word_size)
                    .ok_or_else(|| FlagError::MissingPlatformDefault {
                        name: descriptor.name.to_owned(),
                        platform: platform.name().to_owned(),
                    })?
            };
            slots.push(Slot {
                default: value.clone(),
                value,
                origin: FlagOrigin::Default,
            });
        }

        info!(
            "Resolved defaults for {} flags on {}",
            slots.len(),
            platform.name()
        );
        self.slots = Some(slots);
        Ok(())
    }

    fn position(&self, name: &str) -> Result<usize, FlagError> {
        if let Some(&position) = self.index.get(name) {
            return Ok(position);
        }
        match self.unavailable.get(name) {
            Some(&Exclusion::Build(category)) => Err(FlagError::NotAvailable {
                name: name.to_owned(),
                category,
                build: self.build,
            }),
            Some(&Exclusion::Compiler2) => Err(FlagError::DeclaredByCompiler2 {
                name: name.to_owned(),
            }),
            None => Err(FlagError::UnknownFlag { name: name.to_owned() }),
        }
    }

    fn slot(&self, name: &str) -> Result<&Slot, FlagError> {
        let position = self.position(name)?;
        let slots = self.slots.as_ref().ok_or(FlagError::DefaultsNotResolved)?;
        Ok(&slots[position])
    }

    /// Parses `raw` against the declared type of `name` and stores it.
    /// On any error the table is left as it was.
    pub fn apply_override(
        &mut self,
        name: &str,
        raw: &str,
        origin: FlagOrigin,
    ) -> Result<(), FlagError> {
        let position = self.position(name)?;
        let flag_type = self.descriptors[position].flag_type;
        let value = FlagValue::parse(flag_type, raw).ok_or_else(|| FlagError::TypeMismatch {
            name: name.to_owned(),
            expected: flag_type,
            value: raw.to_owned(),
        })?;
        self.store(position, value, origin)
    }

    /// Typed form of [`FlagTable::apply_override`].
    pub fn set_value(
        &mut self,
        name: &str,
        value: FlagValue,
        origin: FlagOrigin,
    ) -> Result<(), FlagError> {
        let position = self.position(name)?;
        let flag_type = self.descriptors[position].flag_type;
        if value.flag_type() != flag_type {
            return Err(FlagError::TypeMismatch {
                name: name.to_owned(),
                expected: flag_type,
                value: value.to_string(),
            });
        }
        self.store(position, value, origin)
    }

    fn store(&mut self, position: usize, value: FlagValue, origin: FlagOrigin) -> Result<(), FlagError> {
        let name = self.descriptors[position].name;
        if self.state == ValidationState::Valid {
            return Err(FlagError::Frozen { name: name.to_owned() });
        }
        let slots = self.slots.as_mut().ok_or(FlagError::DefaultsNotResolved)?;

        let slot = &mut slots[position];
        debug!("{name} = {value} (was {}, from {origin})", slot.value);
        slot.value = value;
        slot.origin = origin;
        self.state = ValidationState::Unvalidated;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&FlagValue, FlagError> {
        self.slot(name).map(|slot| &slot.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn descriptor(&self, name: &str) -> Result<&FlagDescriptor, FlagError> {
        self.position(name).map(|position| &self.descriptors[position])
    }

    pub fn origin(&self, name: &str) -> Result<FlagOrigin, FlagError> {
        self.slot(name).map(|slot| slot.origin)
    }

    /// True until some override source writes `name`, even if it wrote the
    /// default value back.
    pub fn is_default(&self, name: &str) -> Result<bool, FlagError> {
        self.slot(name).map(|slot| slot.origin == FlagOrigin::Default)
    }

    pub fn default_value(&self, name: &str) -> Result<&FlagValue, FlagError> {
        self.slot(name).map(|slot| &slot.default)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, FlagError> {
        self.typed(name, FlagType::Bool, FlagValue::as_bool)
    }

    pub fn get_intx(&self, name: &str) -> Result<i64, FlagError> {
        self.typed(name, FlagType::Intx, FlagValue::as_intx)
    }

    pub fn get_uintx(&self, name: &str) -> Result<u64, FlagError> {
        self.typed(name, FlagType::Uintx, FlagValue::as_uintx)
    }

    pub fn get_double(&self, name: &str) -> Result<f64, FlagError> {
        self.typed(name, FlagType::Double, FlagValue::as_double)
    }

    pub fn get_ccstr(&self, name: &str) -> Result<&str, FlagError> {
        let value = self.get(name)?;
        value.as_ccstr().ok_or_else(|| FlagError::TypeMismatch {
            name: name.to_owned(),
            expected: FlagType::Ccstr,
            value: value.to_string(),
        })
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: FlagType,
        view: fn(&FlagValue) -> Option<T>,
    ) -> Result<T, FlagError> {
        let value = self.get(name)?;
        view(value).ok_or_else(|| FlagError::TypeMismatch {
            name: name.to_owned(),
            expected,
            value: value.to_string(),
        })
    }

    /// Every registered flag in declaration order. Empty until defaults are
    /// resolved. Each call starts a fresh pass.
    pub fn entries(&self) -> impl Iterator<Item = FlagEntry<'_>> + '_ {
        self.descriptors
            .iter()
            .zip(self.slots.iter().flatten())
            .map(|(descriptor, slot)| {
                FlagEntry::new(
                    descriptor.name,
                    descriptor.category,
                    descriptor.flag_type,
                    &slot.value,
                    slot.origin,
                    descriptor.description,
                )
            })
    }

    /// Renders the whole value set as `-XX:Name=value` options.
    pub fn to_overrides(&self) -> Vec<String> {
        self.entries()
            .map(|entry| format!("-XX:{}={}", entry.name, entry.value))
            .collect()
    }

    /// Runs `validator` and records the outcome. A valid table is frozen.
    /// A table without resolved defaults has nothing to check and stays
    /// unvalidated.
    pub fn validate(&mut self, validator: &Validator) -> Result<Vec<Warning>, ConsistencyError> {
        if self.slots.is_none() {
            return Err(ConsistencyError {
                violations: vec![Violation::new(
                    "defaults".to_owned(),
                    FlagError::DefaultsNotResolved.to_string(),
                )],
            });
        }
        match validator.check(self) {
            Ok(warnings) => {
                self.state = ValidationState::Valid;
                Ok(warnings)
            }
            Err(error) => {
                self.state = ValidationState::Invalid;
                Err(error)
            }
        }
    }
}
