use crate::opts::{CliArgs, Command, FmtStyle};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use uxp::{
    common::{
        constants::PRODUCT,
        error::{Error, Result},
    },
    helm::{helm_collaborators, version::validate_helmv3_in_path},
    installer::LifecycleManager,
};

mod kube_client;
mod opts;

fn main() -> Result<()> {
    let opts = CliArgs::parse();
    init_logging(&opts);

    run(&opts).map_err(|error| {
        error!(%error, "Failed to manage {}", PRODUCT);
        error
    })
}

/// Initialize logging components -- tracing.
fn init_logging(opts: &CliArgs) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_ansi(opts.ansi_colours())
        .with_writer(std::io::stderr);

    match opts.fmt_style() {
        FmtStyle::Pretty => builder.pretty().init(),
        FmtStyle::Compact => builder.compact().init(),
        FmtStyle::Json => builder.json().init(),
    }
}

fn run(opts: &CliArgs) -> Result<()> {
    validate_helmv3_in_path()?;

    let config = opts.installer_config()?;
    let clients = helm_collaborators(&config)?;
    let manager = LifecycleManager::new(config, clients);

    match opts.command() {
        Command::Install(args) => {
            let parameters = args.values.parameters()?;
            console_logger::info(&format!(
                "Installing {} in Namespace {}",
                PRODUCT,
                opts.namespace()
            ));
            kube_client::ensure_namespace(opts.namespace())?;

            let release = manager.install(args.values.version(), &parameters)?;
            info!(release = release.name(), revision = release.revision(), "Installed");
            console_logger::success(&format!(
                "{} {} installed in Namespace {}",
                PRODUCT,
                release.chart_version().unwrap_or_default(),
                opts.namespace()
            ));
        }
        Command::Upgrade(args) => {
            let parameters = args.values.parameters()?;
            console_logger::info(&format!("Upgrading {}", PRODUCT));

            let release = match manager.upgrade(args.values.version(), &parameters) {
                Ok(release) => release,
                Err(error @ Error::UpgradeRolledBack { .. }) => {
                    console_logger::warn(
                        "Upgrade failed and was rolled back",
                        "The release is back at its previous revision",
                    );
                    return Err(error);
                }
                Err(error) => return Err(error),
            };
            info!(release = release.name(), revision = release.revision(), "Upgraded");
            console_logger::success(&format!(
                "{} upgraded to {}",
                PRODUCT,
                release.chart_version().unwrap_or_default()
            ));
        }
        Command::Uninstall => {
            let response = manager.uninstall()?;
            info!(info = response.info(), "Uninstalled");
            console_logger::success(&format!("{} uninstalled", PRODUCT));
        }
    }

    Ok(())
}
