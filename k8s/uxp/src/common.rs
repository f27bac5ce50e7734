/// Contains constant values which are used as defaults and in log messages.
pub mod constants;

/// Contains the error handling tooling.
pub mod error;

/// Contains tools for working with files.
pub mod file;

/// Contains the filesystem capability used by the chart cache.
pub mod fs;
