use crate::{
    common::error::{GetInstalledRelease, ReleaseNotFound, Result, VerificationFailed},
    helm::client::ReleaseInfo,
    installer::collaborators::ReleaseStore,
};
use snafu::{OptionExt, ResultExt};
use tracing::{debug, warn};

/// The name an installation was released under. A Namespace holds at most one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseKind {
    /// The release is named after the current chart.
    Canonical,
    /// The release is named after the chart the product was published as before.
    Legacy,
}

/// The release found in the Namespace, and the name every later operation in the same
/// invocation must address it by.
#[derive(Clone, Debug, PartialEq)]
pub struct InstalledRelease {
    name: String,
    kind: ReleaseKind,
    version: String,
}

impl InstalledRelease {
    /// This is the resolved release name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn kind(&self) -> ReleaseKind {
        self.kind
    }

    /// This is the version of the installed chart.
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    pub fn is_legacy(&self) -> bool {
        self.kind == ReleaseKind::Legacy
    }
}

/// Finds the installed release, looking for the canonical name first and for the legacy
/// name second.
pub struct ReleaseInspector<'a> {
    store: &'a dyn ReleaseStore,
    canonical_name: &'a str,
    legacy_name: &'a str,
    namespace: &'a str,
}

impl<'a> ReleaseInspector<'a> {
    pub fn new(
        store: &'a dyn ReleaseStore,
        canonical_name: &'a str,
        legacy_name: &'a str,
        namespace: &'a str,
    ) -> Self {
        Self {
            store,
            canonical_name,
            legacy_name,
            namespace,
        }
    }

    /// Returns the installed release and its chart version. Fails with ReleaseNotFound if
    /// neither name is installed.
    pub fn current_version(&self) -> Result<InstalledRelease> {
        let (release, kind) = match self.store.get(self.canonical_name) {
            Ok(release) => (release, ReleaseKind::Canonical),
            Err(error) if error.is_release_not_found() => {
                debug!(
                    release = self.canonical_name,
                    fallback = self.legacy_name,
                    namespace = self.namespace,
                    "Release not found, looking for legacy release"
                );
                (self.legacy_release()?, ReleaseKind::Legacy)
            }
            Err(error) => return Err(error).context(self.lookup_failed()),
        };

        let version = release.chart_version().context(VerificationFailed {
            release_name: release.name(),
            namespace: self.namespace,
        })?;

        Ok(InstalledRelease {
            name: match kind {
                ReleaseKind::Canonical => self.canonical_name,
                ReleaseKind::Legacy => self.legacy_name,
            }
            .to_string(),
            kind,
            version: version.to_string(),
        })
    }

    fn legacy_release(&self) -> Result<ReleaseInfo> {
        match self.store.get(self.legacy_name) {
            Ok(release) => {
                warn!(
                    release = self.legacy_name,
                    namespace = self.namespace,
                    "Found legacy release, it will be managed in place of {}",
                    self.canonical_name
                );
                Ok(release)
            }
            Err(error) if error.is_release_not_found() => ReleaseNotFound {
                name: self.canonical_name,
                namespace: self.namespace,
            }
            .fail(),
            Err(error) => Err(error).context(self.lookup_failed()),
        }
    }

    fn lookup_failed(&self) -> GetInstalledRelease<&'a str, &'a str> {
        GetInstalledRelease {
            canonical_name: self.canonical_name,
            namespace: self.namespace,
        }
    }
}
