use crate::{
    common::error::{AlreadyInstalled, Result, UpgradeVersionMismatch, VerifyNotInstalled},
    helm::{
        client::{ReleaseInfo, UninstallResponse},
        values::Parameters,
    },
    installer::{
        cache::ChartCache,
        collaborators::Collaborators,
        config::InstallerConfig,
        inspector::{InstalledRelease, ReleaseInspector},
        rollback::RollbackCoordinator,
        version,
    },
};
use snafu::IntoError;
use tracing::{info, warn};

/// Installs, upgrades and uninstalls the release of the chart in one Namespace. An empty version
/// stands for the latest version in the repository.
pub struct LifecycleManager {
    config: InstallerConfig,
    clients: Collaborators,
}

impl LifecycleManager {
    pub fn new(config: InstallerConfig, clients: Collaborators) -> Self {
        Self { config, clients }
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Returns the installed release, under the canonical or under the legacy name.
    pub fn current_version(&self) -> Result<InstalledRelease> {
        self.inspector().current_version()
    }

    /// Installs the chart at `version` under the canonical release name. Fails if a release is
    /// installed under either name.
    pub fn install(&self, version: &str, parameters: &Parameters) -> Result<ReleaseInfo> {
        match self.current_version() {
            Ok(installed) => {
                return AlreadyInstalled {
                    version: installed.version(),
                }
                .fail()
            }
            Err(error) if error.is_release_not_found() => {}
            Err(error) => return Err(VerifyNotInstalled.into_error(error)),
        }

        let chart = self.chart_cache().pull_and_load(version)?;
        info!(
            release = self.config.chart_name(),
            namespace = self.config.namespace(),
            version = chart.metadata().version(),
            "Installing chart"
        );
        self.clients
            .store
            .install(self.config.chart_name(), &chart, parameters)
    }

    /// Upgrades the installed release to the chart at `version`. The release keeps the name it
    /// was found under.
    pub fn upgrade(&self, version: &str, parameters: &Parameters) -> Result<ReleaseInfo> {
        let installed = self.current_version()?;

        if installed.is_legacy() && !version::equivalent(installed.version(), version) {
            if !self.config.force() {
                return UpgradeVersionMismatch {
                    canonical_name: self.config.chart_name(),
                    current_version: installed.version(),
                    target_version: version,
                }
                .fail();
            }
            warn!(
                release = installed.name(),
                current_version = installed.version(),
                target_version = version,
                "Forcing upgrade of legacy release across versions"
            );
        }

        let chart = self.chart_cache().pull_and_load(version)?;
        info!(
            release = installed.name(),
            namespace = self.config.namespace(),
            from = installed.version(),
            to = chart.metadata().version(),
            "Upgrading release"
        );

        match self
            .clients
            .store
            .upgrade(installed.name(), &chart, parameters)
        {
            Ok(release) => Ok(release),
            Err(error) if self.config.rollback_on_error() => {
                Err(RollbackCoordinator::new(self.clients.store.as_ref())
                    .recover(installed.name(), error))
            }
            Err(error) => Err(error),
        }
    }

    /// Uninstalls the release named after the chart. A release installed under the legacy name
    /// is not looked for, and is reported as not found.
    pub fn uninstall(&self) -> Result<UninstallResponse> {
        info!(
            release = self.config.chart_name(),
            namespace = self.config.namespace(),
            "Uninstalling release"
        );
        self.clients.store.uninstall(self.config.chart_name())
    }

    fn inspector(&self) -> ReleaseInspector<'_> {
        ReleaseInspector::new(
            self.clients.store.as_ref(),
            self.config.chart_name(),
            self.config.legacy_chart_name(),
            self.config.namespace(),
        )
    }

    fn chart_cache(&self) -> ChartCache<'_> {
        ChartCache::new(
            self.config.chart_name(),
            self.config.cache_dir(),
            self.clients.puller.as_ref(),
            self.clients.loader.as_ref(),
            self.clients.fs.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::{
            constants::{DEFAULT_CHART_NAME, LEGACY_CHART_NAME},
            error::Error,
        },
        installer::testing::Harness,
    };

    const CACHE_DIR: &str = "/home/upbound/.cache/up/charts";

    fn config(force: bool, rollback_on_error: bool) -> InstallerConfig {
        InstallerConfig::builder()
            .with_cache_dir(CACHE_DIR)
            .with_force(force)
            .with_rollback_on_error(rollback_on_error)
            .build()
            .unwrap()
    }

    fn manager(harness: &Harness, config: InstallerConfig) -> LifecycleManager {
        LifecycleManager::new(config, harness.collaborators())
    }

    fn params() -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("replicas".into(), 2.into());
        parameters
    }

    #[test]
    fn install_on_empty_namespace_uses_canonical_name() {
        let harness = Harness::new();

        let release = manager(&harness, config(false, false))
            .install("1.5.1-up.1", &params())
            .unwrap();

        assert_eq!(release.name(), DEFAULT_CHART_NAME);
        assert_eq!(release.chart_version(), Some("1.5.1-up.1"));
        let world = harness.world();
        assert_eq!(world.installs, vec![DEFAULT_CHART_NAME]);
        assert!(world.releases.contains_key(DEFAULT_CHART_NAME));
        assert!(!world.releases.contains_key(LEGACY_CHART_NAME));
        assert_eq!(world.pulls.len(), 1);
        assert_eq!(world.loads.len(), 1);
    }

    #[test]
    fn install_on_installed_namespace_touches_nothing() {
        for name in [DEFAULT_CHART_NAME, LEGACY_CHART_NAME] {
            let harness = Harness::new().with_release(name, "1.4.0");

            let error = manager(&harness, config(false, false))
                .install("1.5.1-up.1", &params())
                .unwrap_err();

            match error {
                Error::AlreadyInstalled { version } => assert_eq!(version, "1.4.0"),
                other => panic!("unexpected error: {other}"),
            }
            let world = harness.world();
            assert!(world.pulls.is_empty());
            assert!(world.loads.is_empty());
            assert_eq!(world.store_mutations(), 0);
        }
    }

    #[test]
    fn install_fails_if_installed_release_cannot_be_checked() {
        let harness = Harness::new();
        harness.world().fail_get = true;

        let error = manager(&harness, config(false, false))
            .install("1.5.1-up.1", &params())
            .unwrap_err();

        assert!(matches!(error, Error::VerifyNotInstalled { .. }));
        assert!(harness.world().pulls.is_empty());
        assert_eq!(harness.world().store_mutations(), 0);
    }

    #[test]
    fn install_failure_is_returned_without_retry_or_rollback() {
        let harness = Harness::new();
        harness.world().fail_install = true;

        let error = manager(&harness, config(false, true))
            .install("", &params())
            .unwrap_err();

        assert!(matches!(error, Error::HelmInstallCommand { .. }));
        let world = harness.world();
        assert_eq!(world.installs.len(), 1);
        assert!(world.rollbacks.is_empty());
    }

    #[test]
    fn upgrade_of_canonical_release() {
        let harness = Harness::new().with_release(DEFAULT_CHART_NAME, "1.5.1-up.1");

        let release = manager(&harness, config(false, false))
            .upgrade("1.6.0-up.1", &params())
            .unwrap();

        assert_eq!(release.name(), DEFAULT_CHART_NAME);
        assert_eq!(release.revision(), 2);
        assert_eq!(release.chart_version(), Some("1.6.0-up.1"));
        assert_eq!(harness.world().upgrades, vec![DEFAULT_CHART_NAME]);
    }

    #[test]
    fn upgrade_of_canonical_release_ignores_version_boundaries() {
        let harness = Harness::new().with_release(DEFAULT_CHART_NAME, "1.3.0-up.1");

        manager(&harness, config(false, false))
            .upgrade("1.6.0-up.1", &params())
            .unwrap();

        assert_eq!(harness.world().upgrades.len(), 1);
    }

    #[test]
    fn upgrade_of_legacy_release_keeps_legacy_name() {
        let harness = Harness::new().with_release(LEGACY_CHART_NAME, "1.5.1");

        let release = manager(&harness, config(false, false))
            .upgrade("v1.5.1-up.1", &params())
            .unwrap();

        assert_eq!(release.name(), LEGACY_CHART_NAME);
        let world = harness.world();
        assert_eq!(world.upgrades, vec![LEGACY_CHART_NAME]);
        assert!(!world.releases.contains_key(DEFAULT_CHART_NAME));
    }

    #[test]
    fn upgrade_of_legacy_release_across_versions_is_refused() {
        let harness = Harness::new().with_release(LEGACY_CHART_NAME, "1.4.0");

        let error = manager(&harness, config(false, false))
            .upgrade("1.5.1-up.1", &params())
            .unwrap_err();

        match error {
            Error::UpgradeVersionMismatch {
                current_version,
                target_version,
                ..
            } => {
                assert_eq!(current_version, "1.4.0");
                assert_eq!(target_version, "1.5.1-up.1");
            }
            other => panic!("unexpected error: {other}"),
        }
        let world = harness.world();
        assert!(world.pulls.is_empty());
        assert!(world.loads.is_empty());
        assert_eq!(world.store_mutations(), 0);
    }

    #[test]
    fn upgrade_of_legacy_release_to_latest_is_refused() {
        let harness = Harness::new().with_release(LEGACY_CHART_NAME, "1.4.0");

        let error = manager(&harness, config(false, false))
            .upgrade("", &params())
            .unwrap_err();

        assert!(matches!(error, Error::UpgradeVersionMismatch { .. }));
        assert!(harness.world().pulls.is_empty());
    }

    #[test]
    fn forced_upgrade_of_legacy_release_across_versions() {
        let harness = Harness::new().with_release(LEGACY_CHART_NAME, "1.4.0");

        let release = manager(&harness, config(true, false))
            .upgrade("1.5.1-up.1", &params())
            .unwrap();

        assert_eq!(release.name(), LEGACY_CHART_NAME);
        let world = harness.world();
        assert_eq!(world.pulls.len(), 1);
        assert_eq!(world.loads.len(), 1);
        assert_eq!(world.upgrades, vec![LEGACY_CHART_NAME]);
    }

    #[test]
    fn upgrade_on_empty_namespace_is_not_found() {
        let harness = Harness::new();

        let error = manager(&harness, config(false, false))
            .upgrade("1.5.1-up.1", &params())
            .unwrap_err();

        assert!(error.is_release_not_found());
        assert!(harness.world().pulls.is_empty());
        assert_eq!(harness.world().store_mutations(), 0);
    }

    #[test]
    fn failed_upgrade_is_rolled_back() {
        let harness = Harness::new().with_release(LEGACY_CHART_NAME, "1.5.1");
        harness.world().fail_upgrade = true;

        let error = manager(&harness, config(false, true))
            .upgrade("1.5.1-up.2", &params())
            .unwrap_err();

        match error {
            Error::UpgradeRolledBack {
                source,
                release_name,
            } => {
                assert!(matches!(*source, Error::HelmUpgradeCommand { .. }));
                assert_eq!(release_name, LEGACY_CHART_NAME);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(harness.world().rollbacks, vec![LEGACY_CHART_NAME]);
    }

    #[test]
    fn failed_rollback_of_failed_upgrade_reports_both_errors() {
        let harness = Harness::new().with_release(DEFAULT_CHART_NAME, "1.5.1-up.1");
        harness.world().fail_upgrade = true;
        harness.world().fail_rollback = true;

        let error = manager(&harness, config(false, true))
            .upgrade("1.6.0-up.1", &params())
            .unwrap_err();

        match error {
            Error::RollbackFailed {
                source,
                upgrade_error,
                ..
            } => {
                assert!(matches!(*source, Error::HelmRollbackCommand { .. }));
                assert!(matches!(*upgrade_error, Error::HelmUpgradeCommand { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(harness.world().rollbacks.len(), 1);
    }

    #[test]
    fn failed_upgrade_without_rollback_is_returned_as_is() {
        let harness = Harness::new().with_release(DEFAULT_CHART_NAME, "1.5.1-up.1");
        harness.world().fail_upgrade = true;

        let error = manager(&harness, config(false, false))
            .upgrade("1.6.0-up.1", &params())
            .unwrap_err();

        assert!(matches!(error, Error::HelmUpgradeCommand { .. }));
        assert!(harness.world().rollbacks.is_empty());
    }

    #[test]
    fn uninstall_uses_canonical_name_only() {
        let harness = Harness::new().with_release(DEFAULT_CHART_NAME, "1.5.1-up.1");
        manager(&harness, config(false, false)).uninstall().unwrap();
        assert!(harness.world().releases.is_empty());

        let harness = Harness::new().with_release(LEGACY_CHART_NAME, "1.5.1");
        let error = manager(&harness, config(false, false)).uninstall().unwrap_err();

        assert!(error.is_release_not_found());
        let world = harness.world();
        assert_eq!(world.uninstalls, vec![DEFAULT_CHART_NAME]);
        assert!(world.releases.contains_key(LEGACY_CHART_NAME));
    }

    #[test]
    fn current_version_reports_resolved_name() {
        let harness = Harness::new().with_release(LEGACY_CHART_NAME, "1.5.1");

        let installed = manager(&harness, config(false, false)).current_version().unwrap();

        assert_eq!(installed.name(), LEGACY_CHART_NAME);
        assert_eq!(installed.version(), "1.5.1");
    }
}
