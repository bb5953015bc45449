mod error;

pub mod arguments;
pub mod ergonomics;
pub mod flags;
pub mod globals;
pub mod jvmci;
pub mod platform;
pub mod printer;
pub mod startup;
pub mod validator;

pub use error::{ArgumentError, ConsistencyError, FlagError, StartupError};
pub use flags::{BuildKind, Category, FlagDescriptor, FlagOrigin, FlagTable, FlagType, FlagValue};
pub use startup::{initialize, Startup, StartupOptions};
pub use validator::Validator;
