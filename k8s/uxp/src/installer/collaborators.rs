use crate::{
    common::{error::Result, fs::Filesystem},
    helm::{
        chart::Chart,
        client::{ReleaseInfo, UninstallResponse},
        values::Parameters,
    },
};
use std::path::Path;

/// Fetches packaged charts from a chart repository.
pub trait ChartPuller {
    /// Pulls the newest version of `chart_name` which satisfies the `version` constraint into
    /// `dest_dir`, under the repository's archive naming convention.
    fn pull(&self, chart_name: &str, version: &str, dest_dir: &Path) -> Result<()>;
}

/// Loads a packaged chart from the local filesystem.
pub trait ChartLoader {
    fn load(&self, path: &Path) -> Result<Chart>;
}

/// The cluster's release-state store, scoped to one Namespace. A missing release is reported
/// as a ReleaseNotFound error.
pub trait ReleaseStore {
    /// Fetches the release with the given name.
    fn get(&self, release_name: &str) -> Result<ReleaseInfo>;

    /// Installs the chart as a new release.
    fn install(
        &self,
        release_name: &str,
        chart: &Chart,
        parameters: &Parameters,
    ) -> Result<ReleaseInfo>;

    /// Upgrades an existing release to the chart.
    fn upgrade(
        &self,
        release_name: &str,
        chart: &Chart,
        parameters: &Parameters,
    ) -> Result<ReleaseInfo>;

    fn uninstall(&self, release_name: &str) -> Result<UninstallResponse>;

    /// Rolls the release back to its previous revision.
    fn rollback(&self, release_name: &str) -> Result<()>;
}

/// The collaborators a LifecycleManager is built from. The caller picks the implementations,
/// see crate::helm::helm_collaborators for the production set.
pub struct Collaborators {
    pub puller: Box<dyn ChartPuller>,
    pub loader: Box<dyn ChartLoader>,
    pub store: Box<dyn ReleaseStore>,
    pub fs: Box<dyn Filesystem>,
}
