use crate::common::{
    constants::HELM_COMMAND,
    error::{HelmCommand, HelmVersion, HelmVersionCommand, RegexCompile, Result, U8VectorToString},
};
use regex::bytes::Regex;
use snafu::{ensure, ResultExt};
use std::{process::Command, str};
use tracing::debug;

/// Validate that the helm v3 binary is present in the shell's $PATH.
pub fn validate_helmv3_in_path() -> Result<()> {
    let args: Vec<String> = helm_args!["version", "--short"];

    debug!(command = %HELM_COMMAND, ?args, "Helm version command");

    // Execute `helm version` to verify if the binary exists.
    let output = Command::new(HELM_COMMAND)
        .args(args.clone())
        .output()
        .context(HelmCommand {
            command: HELM_COMMAND.to_string(),
            args: args.clone(),
        })?;

    let stdout_str = str::from_utf8(output.stdout.as_slice()).context(U8VectorToString)?;
    debug!(stdout=%stdout_str, "Helm version command standard output");
    ensure!(
        output.status.success(),
        HelmVersionCommand {
            command: HELM_COMMAND.to_string(),
            args,
            std_err: str::from_utf8(output.stderr.as_slice())
                .context(U8VectorToString)?
                .to_string()
        }
    );

    ensure!(
        is_helm_v3(output.stdout.as_slice())?,
        HelmVersion {
            version: stdout_str.trim().to_string(),
        }
    );

    Ok(())
}

/// Checks the output of `helm version --short` for a v3.x.y version.
fn is_helm_v3(version_output: &[u8]) -> Result<bool> {
    let regex: &str = r"^(v3\.[0-9]+\.[0-9]+)";
    Ok(Regex::new(regex)
        .context(RegexCompile {
            expression: regex.to_string(),
        })?
        .is_match(version_output))
}
