use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::value::{DefaultValue, FlagType};

/// Visibility class of a flag. Decides where its default comes from and
/// whether the flag exists at all in a given build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Product,
    ProductPd,
    Develop,
    DevelopPd,
    NotProduct,
}

impl Category {
    pub fn is_platform_dependent(self) -> bool {
        matches!(self, Category::ProductPd | Category::DevelopPd)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Product => "product",
            Category::ProductPd => "pd product",
            Category::Develop => "develop",
            Category::DevelopPd => "pd develop",
            Category::NotProduct => "notproduct",
        };
        f.pad(name)
    }
}

/// Build configuration the table is assembled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    Product,
    Optimized,
    Debug,
}

impl BuildKind {
    pub fn current() -> BuildKind {
        if cfg!(debug_assertions) {
            BuildKind::Debug
        } else {
            BuildKind::Product
        }
    }

    pub fn includes(self, category: Category) -> bool {
        match category {
            Category::Product | Category::ProductPd => true,
            Category::NotProduct => self != BuildKind::Product,
            Category::Develop | Category::DevelopPd => self == BuildKind::Debug,
        }
    }
}

impl Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildKind::Product => "product",
            BuildKind::Optimized => "optimized",
            BuildKind::Debug => "debug",
        };
        f.pad(name)
    }
}

/// Where the current value of a flag came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagOrigin {
    Default,
    Ergonomic,
    FlagsFile,
    EnvironmentVariable,
    CommandLine,
    Management,
}

impl Display for FlagOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlagOrigin::Default => "default",
            FlagOrigin::Ergonomic => "ergonomic",
            FlagOrigin::FlagsFile => "config file",
            FlagOrigin::EnvironmentVariable => "environment",
            FlagOrigin::CommandLine => "command line",
            FlagOrigin::Management => "management",
        };
        f.pad(name)
    }
}

/// Compiler configurations a flag is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    Always,
    /// Only when the VM is built without the C2 compiler, which declares
    /// its own flag of the same name.
    WithoutCompiler2,
}

impl Availability {
    pub fn includes(self, compiler2: bool) -> bool {
        match self {
            Availability::Always => true,
            Availability::WithoutCompiler2 => !compiler2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagDescriptor {
    pub name: &'static str,
    pub flag_type: FlagType,
    pub category: Category,
    pub default: DefaultValue,
    pub availability: Availability,
    pub description: &'static str,
}

const fn literal_type(default: DefaultValue) -> FlagType {
    match default.flag_type() {
        Some(flag_type) => flag_type,
        None => panic!("a literal default is required"),
    }
}

impl FlagDescriptor {
    pub const fn product(name: &'static str, default: DefaultValue, description: &'static str) -> Self {
        FlagDescriptor {
            name,
            flag_type: literal_type(default),
            category: Category::Product,
            default,
            availability: Availability::Always,
            description,
        }
    }

    pub const fn product_pd(name: &'static str, flag_type: FlagType, description: &'static str) -> Self {
        FlagDescriptor {
            name,
            flag_type,
            category: Category::ProductPd,
            default: DefaultValue::Platform,
            availability: Availability::Always,
            description,
        }
    }

    pub const fn develop(name: &'static str, default: DefaultValue, description: &'static str) -> Self {
        FlagDescriptor {
            name,
            flag_type: literal_type(default),
            category: Category::Develop,
            default,
            availability: Availability::Always,
            description,
        }
    }

    pub const fn develop_pd(name: &'static str, flag_type: FlagType, description: &'static str) -> Self {
        FlagDescriptor {
            name,
            flag_type,
            category: Category::DevelopPd,
            default: DefaultValue::Platform,
            availability: Availability::Always,
            description,
        }
    }

    pub const fn notproduct(name: &'static str, default: DefaultValue, description: &'static str) -> Self {
        FlagDescriptor {
            name,
            flag_type: literal_type(default),
            category: Category::NotProduct,
            default,
            availability: Availability::Always,
            description,
        }
    }

    /// Drops the flag from builds that include the C2 compiler.
    pub const fn without_compiler2(self) -> Self {
        FlagDescriptor {
            availability: Availability::WithoutCompiler2,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filters_categories() {
        assert!(BuildKind::Product.includes(Category::Product));
        assert!(BuildKind::Product.includes(Category::ProductPd));
        assert!(!BuildKind::Product.includes(Category::Develop));
        assert!(!BuildKind::Product.includes(Category::NotProduct));

        assert!(BuildKind::Optimized.includes(Category::NotProduct));
        assert!(!BuildKind::Optimized.includes(Category::DevelopPd));

        for category in [
            Category::Product,
            Category::ProductPd,
            Category::Develop,
            Category::DevelopPd,
            Category::NotProduct,
        ] {
            assert!(BuildKind::Debug.includes(category));
        }
    }

    #[test]
    fn test_constructors_infer_type() {
        const FLAG: FlagDescriptor =
            FlagDescriptor::develop("TraceThings", DefaultValue::Bool(false), "Trace things");
        assert_eq!(FLAG.flag_type, FlagType::Bool);
        assert_eq!(FLAG.category, Category::Develop);

        let pd = FlagDescriptor::product_pd("VectorWidth", FlagType::Intx, "Width");
        assert!(pd.category.is_platform_dependent());
        assert_eq!(pd.default, DefaultValue::Platform);
        assert_eq!(pd.availability, Availability::Always);
    }

    #[test]
    fn test_compiler2_gate() {
        const GATED: FlagDescriptor =
            FlagDescriptor::product("DeferBarriers", DefaultValue::Bool(true), "Defer")
                .without_compiler2();
        assert_eq!(GATED.availability, Availability::WithoutCompiler2);
        assert_eq!(GATED.flag_type, FlagType::Bool);
        assert!(GATED.availability.includes(false));
        assert!(!GATED.availability.includes(true));
        assert!(Availability::Always.includes(true));
    }
}
