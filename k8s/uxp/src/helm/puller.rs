use crate::{
    common::{
        constants::HELM_COMMAND,
        error::{HelmCommand, HelmPullCommand, Result, U8VectorToString},
    },
    installer::collaborators::ChartPuller,
};
use snafu::{ensure, ResultExt};
use std::{path::Path, process::Command, str};
use tracing::debug;
use url::Url;

/// Pulls packaged charts from a helm repository with `helm pull`.
#[derive(Clone, Debug)]
pub struct HelmPuller {
    repo_url: Url,
    devel: bool,
}

impl HelmPuller {
    /// A puller for the repository at `repo_url`. If `devel` is set, development versions are
    /// considered when resolving a version constraint.
    pub fn new(repo_url: Url, devel: bool) -> Self {
        Self { repo_url, devel }
    }

    /// The arguments of the `helm pull` command for one chart, version and destination.
    fn args(&self, chart_name: &str, version: &str, dest_dir: &Path) -> Vec<String> {
        let mut args: Vec<String> = helm_args![
            "pull",
            chart_name,
            "--repo",
            self.repo_url.as_str(),
            "--destination",
            dest_dir.to_string_lossy()
        ];
        if !version.is_empty() {
            args.extend(helm_args!["--version", version]);
        }
        if self.devel {
            args.push("--devel".to_string());
        }
        args
    }
}

impl ChartPuller for HelmPuller {
    /// Runs command `helm pull <chart> --repo <url> --destination <dir> --version <version>`.
    fn pull(&self, chart_name: &str, version: &str, dest_dir: &Path) -> Result<()> {
        let args = self.args(chart_name, version, dest_dir);

        debug!(command = %HELM_COMMAND, ?args, "Helm pull command");

        let output = Command::new(HELM_COMMAND)
            .args(args.clone())
            .output()
            .context(HelmCommand {
                command: HELM_COMMAND.to_string(),
                args: args.clone(),
            })?;

        ensure!(
            output.status.success(),
            HelmPullCommand {
                command: HELM_COMMAND.to_string(),
                args,
                std_err: str::from_utf8(output.stderr.as_slice())
                    .context(U8VectorToString)?
                    .to_string()
            }
        );

        Ok(())
    }
}
