use crate::{
    common::{error::Result, fs::OsFs},
    installer::{collaborators::Collaborators, config::InstallerConfig},
};

/// Converts a list of helm arguments (each of whom implement ToString) to a Vec<String>.
macro_rules! helm_args {
    ($($x:expr),* $(,)?) => (vec![$($x.to_string()),*]);
}

/// Contains the chart archive loader and the chart metadata types.
pub mod chart;

/// Contains the helm release client, which reads and modifies releases in a Namespace.
pub mod client;

/// Contains the helm chart puller.
pub mod puller;

/// Contains the install parameter parser.
pub mod values;

/// Contains a check for the helm v3 binary.
pub mod version;

/// Builds the production collaborators for a lifecycle manager: every chart and release
/// operation is carried out by the helm v3 binary, and the chart cache lives on the host
/// filesystem.
pub fn helm_collaborators(config: &InstallerConfig) -> Result<Collaborators> {
    let store = client::HelmReleaseClient::builder()
        .with_namespace(config.namespace())
        .build()?;

    Ok(Collaborators {
        puller: Box::new(puller::HelmPuller::new(
            config.repo_url().clone(),
            config.unstable(),
        )),
        loader: Box::new(chart::ArchiveLoader),
        store: Box::new(store),
        fs: Box::new(OsFs),
    })
}
