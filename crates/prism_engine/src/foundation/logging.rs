//! Logging setup and level macro re-exports

pub use log::{debug, error, info, trace, warn};

/// Initialize the global logger from the environment
///
/// Panics if a logger is already installed; embedders that set up their
/// own logging should call [`try_init`] instead.
pub fn init() {
    env_logger::init();
}

/// Initialize the global logger, ignoring a prior installation
pub fn try_init() {
    let _ = env_logger::try_init();
}
