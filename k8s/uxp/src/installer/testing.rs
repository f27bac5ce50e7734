//! In-memory collaborators which record every call, for exercising the lifecycle manager
//! without a cluster, a chart repository or a disk.

use crate::{
    common::{
        constants::{ALL_VERSIONS, CHART_ARCHIVE_EXTENSION, DEFAULT_CHART_NAME, DEFAULT_NAMESPACE},
        error::{
            Error, HelmInstallCommand, HelmPullCommand, HelmRollbackCommand, HelmStatusCommand,
            HelmUpgradeCommand, OpeningArchive, ReadingArchive, ReleaseNotFound, Result,
        },
        fs::Filesystem,
    },
    helm::{
        chart::{Chart, ChartMetadata},
        client::{ReleaseInfo, UninstallResponse},
        values::Parameters,
    },
    installer::collaborators::{ChartLoader, ChartPuller, Collaborators, ReleaseStore},
};
use snafu::IntoError;
use std::{
    cell::{RefCell, RefMut},
    collections::{BTreeMap, BTreeSet},
    io,
    path::{Path, PathBuf},
    rc::Rc,
};

/// The state shared by the fake collaborators of one Harness.
pub(crate) struct World {
    pub(crate) chart_name: String,
    pub(crate) files: BTreeSet<PathBuf>,
    pub(crate) dirs: BTreeSet<PathBuf>,
    pub(crate) releases: BTreeMap<String, ReleaseInfo>,
    /// The archive names a catch-all pull drops into its destination.
    pub(crate) latest_files: Vec<String>,

    pub(crate) fail_get: bool,
    pub(crate) fail_pull: bool,
    pub(crate) fail_load: bool,
    pub(crate) fail_install: bool,
    pub(crate) fail_upgrade: bool,
    pub(crate) fail_rollback: bool,
    pub(crate) fail_rename: bool,

    pub(crate) pulls: Vec<(String, String, PathBuf)>,
    pub(crate) loads: Vec<PathBuf>,
    pub(crate) gets: Vec<String>,
    pub(crate) installs: Vec<String>,
    pub(crate) upgrades: Vec<String>,
    pub(crate) uninstalls: Vec<String>,
    pub(crate) rollbacks: Vec<String>,
    pub(crate) renames: Vec<(PathBuf, PathBuf)>,
    pub(crate) created_dirs: Vec<PathBuf>,
    pub(crate) removed_dirs: Vec<PathBuf>,
    temp_dirs: usize,
}

impl Default for World {
    fn default() -> Self {
        Self {
            chart_name: DEFAULT_CHART_NAME.to_string(),
            files: BTreeSet::new(),
            dirs: BTreeSet::new(),
            releases: BTreeMap::new(),
            latest_files: vec![format!("{DEFAULT_CHART_NAME}-1.6.0-up.1.{CHART_ARCHIVE_EXTENSION}")],
            fail_get: false,
            fail_pull: false,
            fail_load: false,
            fail_install: false,
            fail_upgrade: false,
            fail_rollback: false,
            fail_rename: false,
            pulls: Vec::new(),
            loads: Vec::new(),
            gets: Vec::new(),
            installs: Vec::new(),
            upgrades: Vec::new(),
            uninstalls: Vec::new(),
            rollbacks: Vec::new(),
            renames: Vec::new(),
            created_dirs: Vec::new(),
            removed_dirs: Vec::new(),
            temp_dirs: 0,
        }
    }
}

impl World {
    /// Number of calls which changed the release-state store.
    pub(crate) fn store_mutations(&self) -> usize {
        self.installs.len() + self.upgrades.len() + self.uninstalls.len() + self.rollbacks.len()
    }
}

/// Hands out fake collaborators which share one World.
#[derive(Clone, Default)]
pub(crate) struct Harness {
    world: Rc<RefCell<World>>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn world(&self) -> RefMut<'_, World> {
        self.world.borrow_mut()
    }

    /// Adds a deployed release of the chart at `version`.
    pub(crate) fn with_release(self, name: &str, version: &str) -> Self {
        let chart_name = self.world().chart_name.clone();
        self.world().releases.insert(
            name.to_string(),
            ReleaseInfo::new(
                name,
                DEFAULT_NAMESPACE,
                1,
                Some(ChartMetadata::new(chart_name, version)),
            ),
        );
        self
    }

    /// Adds a release which carries no chart metadata.
    pub(crate) fn with_broken_release(self, name: &str) -> Self {
        self.world().releases.insert(
            name.to_string(),
            ReleaseInfo::new(name, DEFAULT_NAMESPACE, 1, None),
        );
        self
    }

    /// Adds a file, and its parent directory.
    pub(crate) fn with_file<P: Into<PathBuf>>(self, path: P) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.world().dirs.insert(parent.to_path_buf());
        }
        self.world().files.insert(path);
        self
    }

    pub(crate) fn puller(&self) -> FakePuller {
        FakePuller(self.world.clone())
    }

    pub(crate) fn loader(&self) -> FakeLoader {
        FakeLoader(self.world.clone())
    }

    pub(crate) fn store(&self) -> FakeStore {
        FakeStore(self.world.clone())
    }

    pub(crate) fn fs(&self) -> FakeFs {
        FakeFs(self.world.clone())
    }

    pub(crate) fn collaborators(&self) -> Collaborators {
        Collaborators {
            puller: Box::new(self.puller()),
            loader: Box::new(self.loader()),
            store: Box::new(self.store()),
            fs: Box::new(self.fs()),
        }
    }
}

pub(crate) struct FakePuller(Rc<RefCell<World>>);

impl ChartPuller for FakePuller {
    fn pull(&self, chart_name: &str, version: &str, dest_dir: &Path) -> Result<()> {
        let mut world = self.0.borrow_mut();
        world.pulls.push((
            chart_name.to_string(),
            version.to_string(),
            dest_dir.to_path_buf(),
        ));
        if world.fail_pull {
            return HelmPullCommand {
                command: "helm",
                args: vec!["pull".to_string(), chart_name.to_string()],
                std_err: "Error: chart \"universal-crossplane\" version not found",
            }
            .fail();
        }

        let names = if version == ALL_VERSIONS {
            world.latest_files.clone()
        } else {
            vec![format!("{chart_name}-{version}.{CHART_ARCHIVE_EXTENSION}")]
        };
        for name in names {
            world.files.insert(dest_dir.join(name));
        }
        Ok(())
    }
}

pub(crate) struct FakeLoader(Rc<RefCell<World>>);

impl ChartLoader for FakeLoader {
    fn load(&self, path: &Path) -> Result<Chart> {
        let mut world = self.0.borrow_mut();
        world.loads.push(path.to_path_buf());
        if !world.files.contains(path) {
            return Err(OpeningArchive {
                path: path.to_path_buf(),
            }
            .into_error(io::Error::from(io::ErrorKind::NotFound)));
        }
        if world.fail_load {
            return Err(ReadingArchive {
                path: path.to_path_buf(),
            }
            .into_error(io::Error::from(io::ErrorKind::InvalidData)));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let version = file_name
            .trim_start_matches(&format!("{}-", world.chart_name))
            .trim_end_matches(&format!(".{CHART_ARCHIVE_EXTENSION}"))
            .to_string();
        Ok(Chart::new(
            path.to_path_buf(),
            ChartMetadata::new(world.chart_name.clone(), version),
        ))
    }
}

pub(crate) struct FakeStore(Rc<RefCell<World>>);

fn not_found(name: &str) -> Error {
    ReleaseNotFound {
        name,
        namespace: DEFAULT_NAMESPACE,
    }
    .build()
}

impl ReleaseStore for FakeStore {
    fn get(&self, release_name: &str) -> Result<ReleaseInfo> {
        let mut world = self.0.borrow_mut();
        world.gets.push(release_name.to_string());
        if world.fail_get {
            return HelmStatusCommand {
                command: "helm",
                args: vec!["status".to_string(), release_name.to_string()],
                std_err: "Error: Kubernetes cluster unreachable",
            }
            .fail();
        }
        world
            .releases
            .get(release_name)
            .cloned()
            .ok_or_else(|| not_found(release_name))
    }

    fn install(
        &self,
        release_name: &str,
        chart: &Chart,
        _parameters: &Parameters,
    ) -> Result<ReleaseInfo> {
        let mut world = self.0.borrow_mut();
        world.installs.push(release_name.to_string());
        if world.fail_install {
            return HelmInstallCommand {
                command: "helm",
                args: vec!["install".to_string(), release_name.to_string()],
                std_err: "Error: INSTALLATION FAILED: timed out waiting for the condition",
            }
            .fail();
        }
        let release = ReleaseInfo::new(
            release_name,
            DEFAULT_NAMESPACE,
            1,
            Some(chart.metadata().clone()),
        );
        world
            .releases
            .insert(release_name.to_string(), release.clone());
        Ok(release)
    }

    fn upgrade(
        &self,
        release_name: &str,
        chart: &Chart,
        _parameters: &Parameters,
    ) -> Result<ReleaseInfo> {
        let mut world = self.0.borrow_mut();
        world.upgrades.push(release_name.to_string());
        if world.fail_upgrade {
            return HelmUpgradeCommand {
                command: "helm",
                args: vec!["upgrade".to_string(), release_name.to_string()],
                std_err: "Error: UPGRADE FAILED: timed out waiting for the condition",
            }
            .fail();
        }
        let revision = match world.releases.get(release_name) {
            Some(release) => release.revision() + 1,
            None => return Err(not_found(release_name)),
        };
        let release = ReleaseInfo::new(
            release_name,
            DEFAULT_NAMESPACE,
            revision,
            Some(chart.metadata().clone()),
        );
        world
            .releases
            .insert(release_name.to_string(), release.clone());
        Ok(release)
    }

    fn uninstall(&self, release_name: &str) -> Result<UninstallResponse> {
        let mut world = self.0.borrow_mut();
        world.uninstalls.push(release_name.to_string());
        match world.releases.remove(release_name) {
            Some(_) => Ok(UninstallResponse::new(format!(
                "release \"{release_name}\" uninstalled"
            ))),
            None => Err(not_found(release_name)),
        }
    }

    fn rollback(&self, release_name: &str) -> Result<()> {
        let mut world = self.0.borrow_mut();
        world.rollbacks.push(release_name.to_string());
        if world.fail_rollback {
            return HelmRollbackCommand {
                command: "helm",
                args: vec!["rollback".to_string(), release_name.to_string()],
                std_err: "Error: release has no 0 version",
            }
            .fail();
        }
        Ok(())
    }
}

pub(crate) struct FakeFs(Rc<RefCell<World>>);

impl Filesystem for FakeFs {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        let world = self.0.borrow();
        Ok(world.files.contains(path) || world.dirs.contains(path))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut world = self.0.borrow_mut();
        world.created_dirs.push(path.to_path_buf());
        world.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut world = self.0.borrow_mut();
        world.renames.push((from.to_path_buf(), to.to_path_buf()));
        if world.fail_rename {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        if !world.files.remove(from) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        world.files.insert(to.to_path_buf());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut world = self.0.borrow_mut();
        world.removed_dirs.push(path.to_path_buf());
        world.files.retain(|f| !f.starts_with(path));
        world.dirs.retain(|d| !d.starts_with(path));
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let world = self.0.borrow();
        if !world.dirs.contains(path) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        Ok(world
            .files
            .iter()
            .chain(world.dirs.iter())
            .filter(|entry| entry.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn temp_dir_in(&self, dir: &Path, prefix: &str) -> io::Result<PathBuf> {
        let mut world = self.0.borrow_mut();
        world.temp_dirs += 1;
        let tmp = dir.join(format!("{prefix}{}", world.temp_dirs));
        world.dirs.insert(tmp.clone());
        Ok(tmp)
    }
}
