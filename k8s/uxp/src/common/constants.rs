/// This is the name of the product that is being installed.
pub const PRODUCT: &str = "UXP";

/// This is the name of the helm v3 binary which is expected to be in $PATH.
pub const HELM_COMMAND: &str = "helm";

/// This is the default Kubernetes Namespace for the helm release.
pub const DEFAULT_NAMESPACE: &str = "upbound-system";

/// This is the helm repository which serves stable releases.
pub const DEFAULT_REPO_URL: &str = "https://charts.upbound.io/stable";

/// This is the helm repository which serves development releases.
pub const DEFAULT_UNSTABLE_REPO_URL: &str = "https://charts.upbound.io/main";

/// This is the name of the helm chart of this project. The release is named after the chart.
pub const DEFAULT_CHART_NAME: &str = "universal-crossplane";

/// This is the name under which older installations of the same product were released.
pub const LEGACY_CHART_NAME: &str = "crossplane";

/// This is the chart cache directory, relative to the user's home directory.
pub const DEFAULT_CACHE_DIR: &str = ".cache/up/charts";

/// This is a helm version constraint which matches every release, pre-releases included.
pub const ALL_VERSIONS: &str = ">0.0.0-0";

/// This is the file extension of packaged helm charts.
pub const CHART_ARCHIVE_EXTENSION: &str = "tgz";

/// This is the prefix of the temporary directories used while pulling the latest chart.
pub const LATEST_PULL_DIR_PREFIX: &str = "latest-";

/// This is the text with which helm v3 reports a missing release on its standard error.
pub const HELM_RELEASE_NOT_FOUND: &str = "release: not found";
