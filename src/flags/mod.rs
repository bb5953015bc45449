mod descriptor;
mod table;
mod value;

pub use descriptor::{Availability, BuildKind, Category, FlagDescriptor, FlagOrigin};
pub use table::{FlagEntry, FlagTable, ValidationState};
pub use value::{DefaultValue, FlagType, FlagValue, G, K, M, MAX_JINT, WORD_SIZE};
