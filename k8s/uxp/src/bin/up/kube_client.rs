use k8s_openapi::{api::core::v1::Namespace, apimachinery::pkg::apis::meta::v1::ObjectMeta};
use kube::{
    api::{Api, PostParams},
    Client,
};
use snafu::ResultExt;
use tracing::{debug, info};
use uxp::common::error::{AsyncRuntime, CreateNamespace, K8sClientGeneration, Result};

/// Generate a new kube::Client.
async fn client() -> Result<Client> {
    Client::try_default().await.context(K8sClientGeneration)
}

/// Creates the Namespace if it does not exist yet. The Kubernetes API is async, so the request
/// runs on a runtime which lives only as long as this call.
pub(crate) fn ensure_namespace(namespace: &str) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context(AsyncRuntime)?;

    runtime.block_on(create_namespace(namespace))
}

async fn create_namespace(namespace: &str) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client().await?);
    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            info!(namespace, "Created Namespace");
            Ok(())
        }
        Err(kube::Error::Api(response)) if response.reason == "AlreadyExists" => {
            debug!(namespace, "Namespace already exists");
            Ok(())
        }
        Err(error) => Err(error).context(CreateNamespace { namespace }),
    }
}
