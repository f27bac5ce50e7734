use crate::common::constants::{LEGACY_CHART_NAME, PRODUCT};
use snafu::Snafu;
use std::path::PathBuf;

/// For use with multiple fallible operations which may fail for different reasons, but are
/// defined withing the same scope and must return to the outer scope (calling scope) using
/// the try operator -- '?'.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[snafu(context(suffix(false)))]
pub enum Error {
    /// Error for when a Helm command fails to execute.
    #[snafu(display(
        "Failed to run Helm command,\ncommand: {},\nargs: {:?},\ncommand_error: {}",
        command,
        args,
        source
    ))]
    HelmCommand {
        source: std::io::Error,
        command: String,
        args: Vec<String>,
    },

    /// Error for use when converting Vec<u8> to String.
    #[snafu(display("Failed to convert Vec<u8> to UTF-8 formatted String: {}", source))]
    U8VectorToString { source: std::str::Utf8Error },

    /// Error for when regular expression parsing or compilation fails.
    #[snafu(display("Failed to compile regex {}: {}", expression, source))]
    RegexCompile {
        source: regex::Error,
        expression: String,
    },

    /// Error for when Helm v3.x.y is not present in $PATH.
    #[snafu(display("Helm version {} does not start with 'v3.x.y'", version))]
    HelmVersion { version: String },

    /// Error for when a Helm version command execution succeeds, but with an error.
    #[snafu(display(
        "`helm version` command return an error,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmVersionCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for when a Helm pull command execution succeeds, but with an error.
    #[snafu(display(
        "`helm pull` command return an error,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmPullCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for when a Helm status command execution succeeds, but with an error.
    #[snafu(display(
        "`helm status` command return an error,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmStatusCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for when a Helm install command execution succeeds, but with an error.
    #[snafu(display(
        "`helm install` command return an error,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmInstallCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for when a Helm upgrade command execution succeeds, but with an error.
    #[snafu(display(
        "`helm upgrade` command return an error,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmUpgradeCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for when a Helm uninstall command execution succeeds, but with an error.
    #[snafu(display(
        "`helm uninstall` command return an error,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmUninstallCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for when a Helm rollback command execution succeeds, but with an error.
    #[snafu(display(
        "`helm rollback` command return an error,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmRollbackCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for mandatory options for a HelmReleaseClient are missing when building.
    #[snafu(display("Setting namespace is mandatory for HelmReleaseClient"))]
    HelmClientNs,

    /// Error for when json could not be parsed from a slice.
    #[snafu(display("Failed to parse JSON {}: {}", input_json, source))]
    JsonParseFromSlice {
        source: serde_json::Error,
        input_json: String,
    },

    /// Error for when yaml could not be parsed from a file.
    #[snafu(display("Failed to parse YAML at {}: {}", filepath.display(), source))]
    YamlParseFromFile {
        source: serde_yaml::Error,
        filepath: PathBuf,
    },

    /// Error for when the install parameters could not be serialized to yaml.
    #[snafu(display("Failed to serialize install parameters to YAML: {}", source))]
    YamlSerialize { source: serde_yaml::Error },

    /// Error for when reading a file fails.
    #[snafu(display("Failed to read file {}: {}", filepath.display(), source))]
    ReadingFile {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error for when a temporary file could not be created.
    #[snafu(display("Failed to create temporary file: {}", source))]
    TempFileCreation { source: std::io::Error },

    /// Error for when writing to a temporary file fails.
    #[snafu(display("Failed to write to temporary file {}: {}", filepath.display(), source))]
    WriteToTempFile {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error for when a --set install parameter is not of the form key=value.
    #[snafu(display("Failed to parse install parameter '{}', expected key=value", parameter))]
    InvalidSetParameter { parameter: String },

    /// Error for when a chart archive cannot be opened.
    #[snafu(display("Failed to open chart archive {}: {}", path.display(), source))]
    OpeningArchive {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when the entries of a chart archive cannot be read.
    #[snafu(display("Failed to read chart archive {}: {}", path.display(), source))]
    ReadingArchive {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when a chart archive has no Chart.yaml at its top level directory.
    #[snafu(display("Failed to find Chart.yaml in chart archive {}", path.display()))]
    ChartYamlNotFound { path: PathBuf },

    /// Error for failures in generating a semver::Version from a &str input.
    #[snafu(display("Failed to parse {} as a valid semver: {}", version_string, source))]
    InvalidVersion {
        source: semver::Error,
        version_string: String,
    },

    /// Error for when the helm release is not present in the namespace.
    #[snafu(display("Helm release {} not found in Namespace {}", name, namespace))]
    ReleaseNotFound { name: String, namespace: String },

    /// Error for when looking up the installed release fails for a reason other than the release
    /// being absent.
    #[snafu(display(
        "Could not identify installed release for {} or {} in Namespace {}: {}",
        canonical_name,
        LEGACY_CHART_NAME,
        namespace,
        source
    ))]
    GetInstalledRelease {
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
        canonical_name: String,
        namespace: String,
    },

    /// Error for when an installed release carries no chart metadata or chart version.
    #[snafu(display(
        "Could not identify current version of Helm release {} in Namespace {}",
        release_name,
        namespace
    ))]
    VerificationFailed {
        release_name: String,
        namespace: String,
    },

    /// Error for when the install precondition (no installed release) could not be checked.
    #[snafu(display("Could not verify that chart is not already installed: {}", source))]
    VerifyNotInstalled {
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },

    /// Error for when an install is requested while a release is already installed.
    #[snafu(display("Chart already installed with version {}", version))]
    AlreadyInstalled { version: String },

    /// Error for when the legacy release would be upgraded across a version boundary.
    #[snafu(display(
        "Cannot upgrade {} {} to {} with version mismatch, the target version {} is not \
        equivalent to the installed version",
        LEGACY_CHART_NAME,
        current_version,
        canonical_name,
        target_version
    ))]
    UpgradeVersionMismatch {
        canonical_name: String,
        current_version: String,
        target_version: String,
    },

    /// Error for when the chart cache directory cannot be validated.
    #[snafu(display("Failed to validate chart cache path {}: {}", path.display(), source))]
    StatCachePath {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when the chart cache directory cannot be created.
    #[snafu(display("Failed to create chart cache directory {}: {}", path.display(), source))]
    CreateCacheDir {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when a temporary directory cannot be created inside the chart cache.
    #[snafu(display(
        "Failed to create temporary directory in chart cache {}: {}",
        path.display(),
        source
    ))]
    CreateTempDir {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when pulling a chart from the helm repository fails.
    #[snafu(display("Could not pull chart: {}", source))]
    PullChart {
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },

    /// Error for when the contents of the latest-pull directory cannot be listed.
    #[snafu(display("Could not identify chart pulled as latest in {}: {}", path.display(), source))]
    ReadPulledChart {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when the latest-pull directory does not hold exactly one chart archive.
    #[snafu(display(
        "Corrupt chart tmp directory, found {} files, consider removing cache ({})",
        file_count,
        cache_dir.display()
    ))]
    CorruptCacheState { cache_dir: PathBuf, file_count: usize },

    /// Error for when the latest pulled chart cannot be moved into the chart cache.
    #[snafu(display(
        "Could not move latest pulled chart {} to cache at {}: {}",
        from.display(),
        to.display(),
        source
    ))]
    CacheWriteFailed {
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },

    /// Error for when a cached chart archive cannot be loaded.
    #[snafu(display("Could not load chart {}: {}", path.display(), source))]
    LoadChart {
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
        path: PathBuf,
    },

    /// Error for when an upgrade failed and the compensating rollback failed as well. The
    /// release is in an unknown state.
    #[snafu(display(
        "Failed upgrade of {} resulted in a failed rollback: {}, upgrade error: {}",
        release_name,
        source,
        upgrade_error
    ))]
    RollbackFailed {
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
        upgrade_error: Box<Error>,
        release_name: String,
    },

    /// Error for when an upgrade failed and the release was rolled back to its prior revision.
    #[snafu(display("Failed upgrade of {} was rolled back: {}", release_name, source))]
    UpgradeRolledBack {
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
        release_name: String,
    },

    /// Error for when the user's home directory cannot be determined.
    #[snafu(display(
        "Failed to determine home directory for the default chart cache, set a cache directory"
    ))]
    HomeDirectory,

    /// Error for when a helm repository URL is parsed.
    #[snafu(display("Failed to parse helm repository URL {}: {}", url, source))]
    RepoUrlParse {
        source: url::ParseError,
        url: String,
    },

    /// Error for when Kubernetes API client generation fails.
    #[snafu(display("Failed to generate kubernetes client: {}", source))]
    K8sClientGeneration { source: kube::Error },

    /// Error for when a Kubernetes API request to create a Namespace fails.
    #[snafu(display("Failed to create Kubernetes Namespace {}: {}", namespace, source))]
    CreateNamespace {
        source: kube::Error,
        namespace: String,
    },

    /// Error for when the async runtime for Kubernetes API calls cannot be started.
    #[snafu(display("Failed to start {} runtime for Kubernetes API calls: {}", PRODUCT, source))]
    AsyncRuntime { source: std::io::Error },
}

impl Error {
    /// Returns true if this is a ReleaseNotFound error.
    pub fn is_release_not_found(&self) -> bool {
        matches!(self, Error::ReleaseNotFound { .. })
    }
}

/// A wrapper type to remove repeated Result<T, Error> returns.
pub type Result<T, E = Error> = std::result::Result<T, E>;
