/// Contains the capability interfaces the lifecycle manager is built from.
pub mod collaborators;

/// Contains the installer configuration and its builder.
pub mod config;

/// Contains the version resolver.
pub mod version;

/// Contains the chart cache, which pulls and loads charts.
pub mod cache;

/// Contains the release inspector, which finds the installed release and its version.
pub mod inspector;

/// Contains the rollback coordinator for failed upgrades.
pub mod rollback;

/// Contains the lifecycle manager.
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod testing;

pub use collaborators::Collaborators;
pub use config::InstallerConfig;
pub use inspector::{InstalledRelease, ReleaseKind};
pub use lifecycle::LifecycleManager;
