/// Contains constant values, the error handling tooling and filesystem tools.
pub mod common;

/// Contains tools to work with helm charts and releases by means of the helm v3 binary.
pub mod helm;

/// Contains the chart lifecycle manager, which installs, upgrades and uninstalls the release.
pub mod installer;
