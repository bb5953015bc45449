//! The process-wide flag table. Written once at startup, read by everyone
//! afterwards without locking.

use std::sync::OnceLock;

use log::info;

use crate::{
    error::StartupError,
    flags::{FlagTable, ValidationState},
};

static FLAGS: OnceLock<FlagTable> = OnceLock::new();

/// Publishes a validated table. Only the first call succeeds.
pub fn install(table: FlagTable) -> Result<&'static FlagTable, StartupError> {
    if table.state() != ValidationState::Valid {
        return Err(StartupError::NotValidated);
    }
    FLAGS
        .set(table)
        .map_err(|_| StartupError::AlreadyInstalled)?;
    info!("Installed the global flag table");
    FLAGS.get().ok_or(StartupError::NotValidated)
}

/// The installed table, if startup got that far.
pub fn flags() -> Option<&'static FlagTable> {
    FLAGS.get()
}
