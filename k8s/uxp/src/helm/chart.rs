use crate::{
    common::error::{
        ChartYamlNotFound, OpeningArchive, ReadingArchive, Result, YamlParseFromFile,
    },
    installer::collaborators::ChartLoader,
};
use flate2::read::GzDecoder;
use serde::Deserialize;
use snafu::ResultExt;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};
use tar::Archive;

/// This is the name of the file which carries a helm chart's metadata.
const CHART_YAML: &str = "Chart.yaml";

/// This struct is used to deserialize helm charts' Chart.yaml file, and the chart metadata
/// which helm stores alongside a release.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    /// This is the name of the helm chart.
    #[serde(default)]
    name: String,
    /// This is the version of the helm chart. Kept as it was published, the version resolver
    /// decides how to interpret it.
    #[serde(default)]
    version: String,
    /// This is the version of the application packaged by the chart.
    #[serde(default)]
    app_version: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl ChartMetadata {
    /// Metadata for a chart with the given name and version.
    pub fn new<N, V>(name: N, version: V) -> Self
    where
        N: ToString,
        V: ToString,
    {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }

    /// This is a getter for the helm chart name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// This is a getter for the helm chart version.
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    /// This is a getter for the packaged application's version.
    pub fn app_version(&self) -> Option<&str> {
        self.app_version.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A chart archive from the cache, loaded and ready to be installed.
#[derive(Clone, Debug, PartialEq)]
pub struct Chart {
    path: PathBuf,
    metadata: ChartMetadata,
}

impl Chart {
    pub fn new(path: PathBuf, metadata: ChartMetadata) -> Self {
        Self { path, metadata }
    }

    /// This is the path to the chart archive.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn metadata(&self) -> &ChartMetadata {
        &self.metadata
    }
}

/// Loads packaged (.tgz) helm charts by reading the Chart.yaml at the top level directory of
/// the archive.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArchiveLoader;

impl ChartLoader for ArchiveLoader {
    fn load(&self, path: &Path) -> Result<Chart> {
        let metadata = read_chart_metadata(path)?;
        Ok(Chart::new(path.to_path_buf(), metadata))
    }
}

/// Reads `<chart-name>/Chart.yaml` from a gzip compressed tar archive.
fn read_chart_metadata(archive_path: &Path) -> Result<ChartMetadata> {
    let file = File::open(archive_path).context(OpeningArchive {
        path: archive_path.to_path_buf(),
    })?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let read_ctx = ReadingArchive {
        path: archive_path.to_path_buf(),
    };
    for entry in archive.entries().context(read_ctx.clone())? {
        let mut entry = entry.context(read_ctx.clone())?;
        let entry_path = entry.path().context(read_ctx.clone())?.into_owned();

        // Packaged charts hold exactly one top level directory, named after the chart.
        // Chart.yaml files of sub-charts sit deeper and must be skipped.
        if entry_path.components().count() != 2 || !entry_path.ends_with(CHART_YAML) {
            continue;
        }

        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).context(read_ctx.clone())?;

        return serde_yaml::from_slice(buf.as_slice()).context(YamlParseFromFile {
            filepath: archive_path.join(entry_path),
        });
    }

    ChartYamlNotFound {
        path: archive_path.to_path_buf(),
    }
    .fail()
}
