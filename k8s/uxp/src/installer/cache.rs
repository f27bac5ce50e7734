use crate::{
    common::{
        constants::{ALL_VERSIONS, CHART_ARCHIVE_EXTENSION, LATEST_PULL_DIR_PREFIX},
        error::{
            CacheWriteFailed, CorruptCacheState, CreateCacheDir, CreateTempDir, LoadChart,
            PullChart, ReadPulledChart, Result, StatCachePath,
        },
        fs::Filesystem,
    },
    helm::chart::Chart,
    installer::{
        collaborators::{ChartLoader, ChartPuller},
        version::trim_version_prefix,
    },
};
use snafu::{ensure, ResultExt};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A directory of pulled chart archives, named `<chart-name>-<version>.tgz`. Charts are pulled
/// from the repository only if the requested version is not in the cache yet.
pub struct ChartCache<'a> {
    chart_name: &'a str,
    cache_dir: &'a Path,
    puller: &'a dyn ChartPuller,
    loader: &'a dyn ChartLoader,
    fs: &'a dyn Filesystem,
}

impl<'a> ChartCache<'a> {
    pub fn new(
        chart_name: &'a str,
        cache_dir: &'a Path,
        puller: &'a dyn ChartPuller,
        loader: &'a dyn ChartLoader,
        fs: &'a dyn Filesystem,
    ) -> Self {
        Self {
            chart_name,
            cache_dir,
            puller,
            loader,
            fs,
        }
    }

    /// The path a concrete version of the chart is cached at.
    pub fn archive_path(&self, version: &str) -> PathBuf {
        self.cache_dir.join(format!(
            "{}-{}.{CHART_ARCHIVE_EXTENSION}",
            self.chart_name,
            trim_version_prefix(version)
        ))
    }

    /// Returns the loaded chart for `version`, pulling it first if it is not cached. An empty
    /// version stands for the latest version in the repository, which is always pulled.
    pub fn pull_and_load(&self, version: &str) -> Result<Chart> {
        self.ensure_cache_dir()?;

        let version = trim_version_prefix(version);
        let archive = if version.is_empty() {
            self.pull_latest()?
        } else {
            self.pull_version(version)?
        };

        debug!(path = %archive.display(), "Loading chart");
        self.loader
            .load(archive.as_path())
            .context(LoadChart { path: archive })
    }

    /// Creates the cache directory if it does not exist.
    fn ensure_cache_dir(&self) -> Result<()> {
        let exists = self.fs.exists(self.cache_dir).context(StatCachePath {
            path: self.cache_dir.to_path_buf(),
        })?;
        if !exists {
            info!(path = %self.cache_dir.display(), "Creating chart cache directory");
            self.fs
                .create_dir_all(self.cache_dir)
                .context(CreateCacheDir {
                    path: self.cache_dir.to_path_buf(),
                })?;
        }
        Ok(())
    }

    /// Pulls a concrete version straight into the cache, unless it is already there.
    fn pull_version(&self, version: &str) -> Result<PathBuf> {
        let archive = self.archive_path(version);
        let cached = self.fs.exists(archive.as_path()).context(StatCachePath {
            path: archive.clone(),
        })?;

        if cached {
            debug!(path = %archive.display(), "Found chart in cache");
        } else {
            info!(chart = self.chart_name, %version, "Pulling chart");
            self.pull(version, self.cache_dir)?;
        }
        Ok(archive)
    }

    /// Pulls the latest version into a temporary directory inside the cache, and moves the
    /// single archive found there into the cache. The temporary directory is removed on return.
    fn pull_latest(&self) -> Result<PathBuf> {
        let tmp = ScopedTempDir::new(self.fs, self.cache_dir)?;

        info!(chart = self.chart_name, "Pulling latest chart");
        self.pull("", tmp.path())?;

        let files = self.fs.read_dir(tmp.path()).context(ReadPulledChart {
            path: tmp.path().to_path_buf(),
        })?;
        ensure!(
            files.len() == 1,
            CorruptCacheState {
                cache_dir: self.cache_dir.to_path_buf(),
                file_count: files.len(),
            }
        );

        let pulled = &files[0];
        let archive = match pulled.file_name() {
            Some(name) => self.cache_dir.join(name),
            None => {
                return CorruptCacheState {
                    cache_dir: self.cache_dir.to_path_buf(),
                    file_count: files.len(),
                }
                .fail()
            }
        };
        self.fs
            .rename(pulled.as_path(), archive.as_path())
            .context(CacheWriteFailed {
                from: pulled.clone(),
                to: archive.clone(),
            })?;

        Ok(archive)
    }

    /// An empty version matches every release. The stable and unstable repositories are
    /// separate, so the newest release of either is the one to use.
    fn pull(&self, version: &str, dest_dir: &Path) -> Result<()> {
        let constraint = if version.is_empty() {
            ALL_VERSIONS
        } else {
            version
        };
        self.puller
            .pull(self.chart_name, constraint, dest_dir)
            .context(PullChart)
    }
}

/// A temporary directory which is removed through the filesystem when dropped.
struct ScopedTempDir<'a> {
    fs: &'a dyn Filesystem,
    path: PathBuf,
}

impl<'a> ScopedTempDir<'a> {
    fn new(fs: &'a dyn Filesystem, parent: &Path) -> Result<Self> {
        let path = fs
            .temp_dir_in(parent, LATEST_PULL_DIR_PREFIX)
            .context(CreateTempDir {
                path: parent.to_path_buf(),
            })?;
        Ok(Self { fs, path })
    }

    fn path(&self) -> &Path {
        self.path.as_path()
    }
}

impl Drop for ScopedTempDir<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.fs.remove_dir_all(self.path.as_path()) {
            debug!(%error, path = %self.path.display(), "Failed to clean up temporary directory");
        }
    }
}
