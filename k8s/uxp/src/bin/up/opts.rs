use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use url::Url;
use uxp::{
    common::{
        constants::{DEFAULT_NAMESPACE, PRODUCT},
        error::Result,
    },
    helm::values::{ParameterParser, Parameters},
    installer::config::{InstallerConfig, InstallerConfigBuilder},
};

/// Formatting style of the logs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum FmtStyle {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// These are the supported cli configuration options.
#[derive(Parser)]
#[command(name = "up", version)]
#[command(about = format!("Installs and manages {}", PRODUCT), long_about = None)]
pub(crate) struct CliArgs {
    /// This is the Kubernetes Namespace of the release.
    #[arg(short, long, global = true, env = "UXP_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Formatting style to be used while logging.
    #[arg(long, global = true, value_enum, default_value_t = FmtStyle::Pretty)]
    fmt_style: FmtStyle,

    /// Use ANSI colors for the logs.
    #[arg(long, global = true, action = ArgAction::Set, default_value_t = true)]
    ansi_colours: bool,

    /// This is the directory pulled charts are cached in. Defaults to ~/.cache/up/charts.
    #[arg(long, global = true, env = "UP_CHART_CACHE_DIR", value_name = "DIR_PATH")]
    cache_dir: Option<PathBuf>,

    /// This overrides the helm repository charts are pulled from.
    #[arg(long, global = true)]
    repo_url: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

impl CliArgs {
    /// This returns the Kubernetes Namespace of the release.
    pub(crate) fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// This returns formatting style to be used.
    pub(crate) fn fmt_style(&self) -> FmtStyle {
        self.fmt_style
    }

    /// This returns ansi_colours arg.
    pub(crate) fn ansi_colours(&self) -> bool {
        self.ansi_colours
    }

    pub(crate) fn command(&self) -> &Command {
        &self.command
    }

    /// Builds the installer configuration for the subcommand.
    pub(crate) fn installer_config(&self) -> Result<InstallerConfig> {
        let mut builder = InstallerConfig::builder().with_namespace(self.namespace.as_str());
        if let Some(dir) = &self.cache_dir {
            builder = builder.with_cache_dir(dir.clone());
        }
        if let Some(url) = &self.repo_url {
            builder = builder.with_repo_url(url.clone());
        }
        self.command.configure(builder).build()
    }
}

/// The lifecycle operations.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Install the chart into the Namespace.
    Install(InstallArgs),
    /// Upgrade the installed release.
    Upgrade(UpgradeArgs),
    /// Uninstall the release.
    Uninstall,
}

impl Command {
    fn configure(&self, builder: InstallerConfigBuilder) -> InstallerConfigBuilder {
        match self {
            Command::Install(args) => builder.with_unstable_versions(args.values.unstable),
            Command::Upgrade(args) => builder
                .with_unstable_versions(args.values.unstable)
                .with_rollback_on_error(args.rollback)
                .with_force(args.force),
            Command::Uninstall => builder,
        }
    }
}

/// Options shared by the commands which take a chart version and chart values.
#[derive(Args)]
pub(crate) struct ValuesArgs {
    /// The chart version. The latest version is used if not set.
    #[arg(default_value = "")]
    version: String,

    /// Allow installing unstable versions.
    #[arg(long, default_value_t = false)]
    unstable: bool,

    /// Set parameters (can specify multiple or separate values with commas: key1=val1,key2=val2).
    #[arg(long)]
    set: Vec<String>,

    /// Parameters file, in YAML.
    #[arg(short, long, value_name = "FILE_PATH")]
    file: Option<PathBuf>,
}

impl ValuesArgs {
    pub(crate) fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Merges the parameters file and the --set overrides.
    pub(crate) fn parameters(&self) -> Result<Parameters> {
        let parser = match &self.file {
            Some(path) => ParameterParser::from_file(path, self.set.clone())?,
            None => ParameterParser::new(Parameters::new(), self.set.clone()),
        };
        parser.parse()
    }
}

#[derive(Args)]
pub(crate) struct InstallArgs {
    #[command(flatten)]
    pub(crate) values: ValuesArgs,
}

#[derive(Args)]
pub(crate) struct UpgradeArgs {
    #[command(flatten)]
    pub(crate) values: ValuesArgs,

    /// Rollback to the previous revision if the upgrade fails.
    #[arg(long, default_value_t = false)]
    rollback: bool,

    /// Force upgrade even if versions are incompatible.
    #[arg(long, default_value_t = false)]
    force: bool,
}
