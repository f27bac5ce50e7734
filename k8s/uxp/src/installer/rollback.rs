use crate::{
    common::error::{Error, RollbackFailed, UpgradeRolledBack},
    installer::collaborators::ReleaseStore,
};
use snafu::IntoError;
use tracing::{error, info, warn};

/// Returns a release to its previous revision after a failed upgrade. The rollback is attempted
/// exactly once.
pub struct RollbackCoordinator<'a> {
    store: &'a dyn ReleaseStore,
}

impl<'a> RollbackCoordinator<'a> {
    pub fn new(store: &'a dyn ReleaseStore) -> Self {
        Self { store }
    }

    /// Rolls back `release_name` and turns the upgrade error into the outcome of the rollback:
    /// UpgradeRolledBack if the release was restored, RollbackFailed if it was not.
    pub fn recover(&self, release_name: &str, upgrade_error: Error) -> Error {
        warn!(
            release = release_name,
            error = %upgrade_error,
            "Upgrade failed, rolling back to the previous revision"
        );

        match self.store.rollback(release_name) {
            Ok(()) => {
                info!(release = release_name, "Rolled back failed upgrade");
                UpgradeRolledBack { release_name }.into_error(upgrade_error)
            }
            Err(rollback_error) => {
                error!(
                    release = release_name,
                    error = %rollback_error,
                    "Rollback failed, the release needs manual intervention"
                );
                RollbackFailed {
                    upgrade_error: Box::new(upgrade_error),
                    release_name,
                }
                .into_error(rollback_error)
            }
        }
    }
}
