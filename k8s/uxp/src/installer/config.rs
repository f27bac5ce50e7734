use crate::common::{
    constants::{
        DEFAULT_CACHE_DIR, DEFAULT_CHART_NAME, DEFAULT_NAMESPACE, DEFAULT_REPO_URL,
        DEFAULT_UNSTABLE_REPO_URL, LEGACY_CHART_NAME,
    },
    error::{HomeDirectory, RepoUrlParse, Result},
};
use snafu::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use url::Url;

/// Knows where the user's home directory is.
pub type HomeDirFn = fn() -> Option<PathBuf>;

/// This is a builder for the InstallerConfig.
pub struct InstallerConfigBuilder {
    repo_url: Option<Url>,
    chart_name: Option<String>,
    namespace: Option<String>,
    cache_dir: Option<PathBuf>,
    unstable: bool,
    rollback_on_error: bool,
    force: bool,
    home_dir: HomeDirFn,
}

impl Default for InstallerConfigBuilder {
    fn default() -> Self {
        Self {
            repo_url: None,
            chart_name: None,
            namespace: None,
            cache_dir: None,
            unstable: false,
            rollback_on_error: false,
            force: false,
            home_dir: dirs::home_dir,
        }
    }
}

impl InstallerConfigBuilder {
    /// This is a builder option to override the helm repository the chart is pulled from.
    #[must_use]
    pub fn with_repo_url(mut self, url: Url) -> Self {
        self.repo_url = Some(url);
        self
    }

    /// This is a builder option to override the name of the chart, which is also the name of
    /// the release it is installed as.
    #[must_use]
    pub fn with_chart_name<J>(mut self, name: J) -> Self
    where
        J: ToString,
    {
        self.chart_name = Some(name.to_string());
        self
    }

    /// This is a builder option to set the Namespace of the release.
    #[must_use]
    pub fn with_namespace<J>(mut self, ns: J) -> Self
    where
        J: ToString,
    {
        self.namespace = Some(ns.to_string());
        self
    }

    /// This is a builder option to override the chart cache directory.
    #[must_use]
    pub fn with_cache_dir<P>(mut self, dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.cache_dir = Some(dir.into());
        self
    }

    /// This allows installing development versions. Unless a repository URL is set, charts are
    /// pulled from the unstable repository.
    #[must_use]
    pub fn with_unstable_versions(mut self, unstable: bool) -> Self {
        self.unstable = unstable;
        self
    }

    /// This rolls a release back to its previous revision if an upgrade fails.
    #[must_use]
    pub fn with_rollback_on_error(mut self, rollback: bool) -> Self {
        self.rollback_on_error = rollback;
        self
    }

    /// This forces operations when possible.
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// This is a builder option to change how the home directory is found. The home directory
    /// is only needed when no cache directory is set.
    #[must_use]
    pub fn with_home_dir(mut self, home_dir: HomeDirFn) -> Self {
        self.home_dir = home_dir;
        self
    }

    /// Build the InstallerConfig.
    pub fn build(self) -> Result<InstallerConfig> {
        let repo_url = match self.repo_url {
            Some(url) => url,
            None if self.unstable => parse_url(DEFAULT_UNSTABLE_REPO_URL)?,
            None => parse_url(DEFAULT_REPO_URL)?,
        };

        let cache_dir = match self.cache_dir {
            Some(dir) => dir,
            None => (self.home_dir)().context(HomeDirectory)?.join(DEFAULT_CACHE_DIR),
        };

        Ok(InstallerConfig {
            repo_url,
            chart_name: self
                .chart_name
                .unwrap_or_else(|| DEFAULT_CHART_NAME.to_string()),
            namespace: self
                .namespace
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            cache_dir,
            unstable: self.unstable,
            rollback_on_error: self.rollback_on_error,
            force: self.force,
        })
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).context(RepoUrlParse { url })
}

/// The immutable configuration of one lifecycle manager.
#[derive(Clone, Debug)]
pub struct InstallerConfig {
    repo_url: Url,
    chart_name: String,
    namespace: String,
    cache_dir: PathBuf,
    unstable: bool,
    rollback_on_error: bool,
    force: bool,
}

impl InstallerConfig {
    /// This creates a default instance of the InstallerConfigBuilder.
    pub fn builder() -> InstallerConfigBuilder {
        InstallerConfigBuilder::default()
    }

    /// This is the helm repository charts are pulled from.
    pub fn repo_url(&self) -> &Url {
        &self.repo_url
    }

    /// This is the name of the chart, and of the canonical release.
    pub fn chart_name(&self) -> &str {
        self.chart_name.as_str()
    }

    /// This is the name older installations were released under.
    pub fn legacy_chart_name(&self) -> &str {
        LEGACY_CHART_NAME
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    pub fn cache_dir(&self) -> &Path {
        self.cache_dir.as_path()
    }

    pub fn unstable(&self) -> bool {
        self.unstable
    }

    pub fn rollback_on_error(&self) -> bool {
        self.rollback_on_error
    }

    pub fn force(&self) -> bool {
        self.force
    }
}
