use crate::{
    common::{
        constants::{HELM_COMMAND, HELM_RELEASE_NOT_FOUND},
        error::{
            HelmClientNs, HelmCommand, HelmInstallCommand, HelmRollbackCommand, HelmStatusCommand,
            HelmUninstallCommand, HelmUpgradeCommand, JsonParseFromSlice, ReleaseNotFound, Result,
            U8VectorToString, YamlSerialize,
        },
        file::write_to_tempfile,
    },
    helm::{
        chart::{Chart, ChartMetadata},
        values::Parameters,
    },
    installer::collaborators::ReleaseStore,
};
use serde::Deserialize;
use snafu::{ensure, ResultExt};
use std::{
    process::{Command, Output},
    str,
};
use tracing::debug;

/// This struct is used to deserialize the output of `helm status <release> -n <namespace> -o
/// json`, and of install and upgrade commands run with `-o json`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ReleaseInfo {
    name: String,
    #[serde(default)]
    namespace: String,
    /// This is the revision number of the release.
    #[serde(default)]
    version: u32,
    #[serde(default)]
    chart: Option<ReleaseChart>,
}

/// The chart a release was installed from, as helm records it.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ReleaseChart {
    #[serde(default)]
    metadata: Option<ChartMetadata>,
}

impl ReleaseInfo {
    /// Release info for a release of a chart with the given metadata.
    pub fn new<N, S>(name: N, namespace: S, revision: u32, metadata: Option<ChartMetadata>) -> Self
    where
        N: ToString,
        S: ToString,
    {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            version: revision,
            chart: Some(ReleaseChart { metadata }),
        }
    }

    /// This is a getter for the name of the release.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// This is a getter for the revision number of the release.
    pub fn revision(&self) -> u32 {
        self.version
    }

    /// This is the metadata of the installed chart, if helm recorded any.
    pub fn chart_metadata(&self) -> Option<&ChartMetadata> {
        self.chart.as_ref().and_then(|c| c.metadata.as_ref())
    }

    /// This is the version of the installed chart. None if the release carries no chart
    /// metadata, or if the version is empty.
    pub fn chart_version(&self) -> Option<&str> {
        self.chart_metadata()
            .map(ChartMetadata::version)
            .filter(|version| !version.is_empty())
    }
}

/// The output of a successful `helm uninstall`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UninstallResponse {
    info: String,
}

impl UninstallResponse {
    pub fn new<I: ToString>(info: I) -> Self {
        Self {
            info: info.to_string(),
        }
    }

    /// This is what helm printed after uninstalling the release.
    pub fn info(&self) -> &str {
        self.info.as_str()
    }
}

/// This is a builder for HelmReleaseClient.
#[derive(Default)]
pub struct HelmReleaseClientBuilder {
    namespace: Option<String>,
}

impl HelmReleaseClientBuilder {
    /// This is a builder option to add Namespace. This is mandatory,
    /// because all helm releases are tied to a Namespace.
    #[must_use]
    pub fn with_namespace<J>(mut self, ns: J) -> Self
    where
        J: ToString,
    {
        self.namespace = Some(ns.to_string());
        self
    }

    /// Build the HelmReleaseClient.
    pub fn build(self) -> Result<HelmReleaseClient> {
        let ns = self.namespace.ok_or(HelmClientNs.build())?;
        Ok(HelmReleaseClient { namespace: ns })
    }
}

/// This type has functions which execute helm commands to fetch info about and modify helm
/// releases. It is the release-state store of the lifecycle manager.
#[derive(Clone, Debug)]
pub struct HelmReleaseClient {
    namespace: String,
}

impl HelmReleaseClient {
    /// This creates an empty builder.
    pub fn builder() -> HelmReleaseClientBuilder {
        HelmReleaseClientBuilder::default()
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// Runs command `helm <args>`, returns its output and its standard output as a string.
    fn run(&self, args: &[String]) -> Result<(Output, String)> {
        debug!(command = %HELM_COMMAND, ?args, "Helm command");

        let output = Command::new(HELM_COMMAND)
            .args(args)
            .output()
            .context(HelmCommand {
                command: HELM_COMMAND.to_string(),
                args: args.to_vec(),
            })?;

        let stdout_str = str::from_utf8(output.stdout.as_slice())
            .context(U8VectorToString)?
            .to_string();
        debug!(stdout=%stdout_str, "Helm command standard output");

        Ok((output, stdout_str))
    }

    /// Runs command `helm <install|upgrade> <release_name> <chart> -n <namespace> -f <values> -o
    /// json` and deserializes the resulting release.
    fn apply(
        &self,
        action: &str,
        release_name: &str,
        chart: &Chart,
        parameters: &Parameters,
    ) -> Result<ReleaseInfo> {
        let values = serde_yaml::to_string(parameters).context(YamlSerialize)?;
        // The values file has to outlive the helm command.
        let values_file = write_to_tempfile(".yaml", values.as_bytes())?;

        let args: Vec<String> = helm_args![
            action,
            release_name,
            chart.path().to_string_lossy(),
            "-n",
            self.namespace.as_str(),
            "-f",
            values_file.path().to_string_lossy(),
            "-o",
            "json"
        ];
        let (output, stdout_str) = self.run(args.as_slice())?;

        if !output.status.success() {
            let std_err = std_err(&output)?;
            return match action {
                "install" => HelmInstallCommand {
                    command: HELM_COMMAND,
                    args,
                    std_err,
                }
                .fail(),
                _ => HelmUpgradeCommand {
                    command: HELM_COMMAND,
                    args,
                    std_err,
                }
                .fail(),
            };
        }

        parse_release(stdout_str)
    }

    /// Returns a ReleaseNotFound error if helm reported the release as missing, else the
    /// error built from the given context.
    fn not_found_or<F>(&self, release_name: &str, std_err: String, fallback: F) -> Result<()>
    where
        F: FnOnce(String) -> Result<()>,
    {
        if std_err.contains(HELM_RELEASE_NOT_FOUND) {
            return ReleaseNotFound {
                name: release_name,
                namespace: self.namespace.as_str(),
            }
            .fail();
        }
        fallback(std_err)
    }
}

impl ReleaseStore for HelmReleaseClient {
    /// Runs command `helm status <release_name> -n <namespace> -o json`.
    fn get(&self, release_name: &str) -> Result<ReleaseInfo> {
        let args: Vec<String> = helm_args![
            "status",
            release_name,
            "-n",
            self.namespace.as_str(),
            "-o",
            "json"
        ];
        let (output, stdout_str) = self.run(args.as_slice())?;

        if !output.status.success() {
            self.not_found_or(release_name, std_err(&output)?, |std_err| {
                HelmStatusCommand {
                    command: HELM_COMMAND,
                    args,
                    std_err,
                }
                .fail()
            })?;
        }

        parse_release(stdout_str)
    }

    fn install(
        &self,
        release_name: &str,
        chart: &Chart,
        parameters: &Parameters,
    ) -> Result<ReleaseInfo> {
        self.apply("install", release_name, chart, parameters)
    }

    fn upgrade(
        &self,
        release_name: &str,
        chart: &Chart,
        parameters: &Parameters,
    ) -> Result<ReleaseInfo> {
        self.apply("upgrade", release_name, chart, parameters)
    }

    /// Runs command `helm uninstall <release_name> -n <namespace>`.
    fn uninstall(&self, release_name: &str) -> Result<UninstallResponse> {
        let args: Vec<String> =
            helm_args!["uninstall", release_name, "-n", self.namespace.as_str()];
        let (output, stdout_str) = self.run(args.as_slice())?;

        if !output.status.success() {
            self.not_found_or(release_name, std_err(&output)?, |std_err| {
                HelmUninstallCommand {
                    command: HELM_COMMAND,
                    args,
                    std_err,
                }
                .fail()
            })?;
        }

        Ok(UninstallResponse::new(stdout_str.trim()))
    }

    /// Runs command `helm rollback <release_name> -n <namespace>`, which rolls the release back
    /// to its previous revision.
    fn rollback(&self, release_name: &str) -> Result<()> {
        let args: Vec<String> =
            helm_args!["rollback", release_name, "-n", self.namespace.as_str()];
        let (output, _) = self.run(args.as_slice())?;

        ensure!(
            output.status.success(),
            HelmRollbackCommand {
                command: HELM_COMMAND,
                args,
                std_err: std_err(&output)?
            }
        );

        Ok(())
    }
}

/// Standard error of a helm command as a string.
fn std_err(output: &Output) -> Result<String> {
    Ok(str::from_utf8(output.stderr.as_slice())
        .context(U8VectorToString)?
        .to_string())
}

/// Deserializes a release from the JSON output of a helm command.
fn parse_release(stdout_str: String) -> Result<ReleaseInfo> {
    serde_json::from_str(stdout_str.as_str()).context(JsonParseFromSlice {
        input_json: stdout_str,
    })
}
