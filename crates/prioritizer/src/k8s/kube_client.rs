//! Kubernetes client construction for the node-scoped workload listing.

use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use kube::Client;
use kube::Config;

use crate::k8s::KubernetesError;

/// Builds the client the pod listing queries through.
///
/// An explicit `--kubeconfig` wins; without one kube's default chain
/// applies (in-cluster service account, then `~/.kube/config`), so the
/// tool works both as a pod on the node and from an operator shell.
pub async fn init_kube_client(
    kubeconfig: Option<PathBuf>,
) -> Result<Client, Report<KubernetesError>> {
    let client = match kubeconfig {
        Some(kubeconfig_path) => {
            let kubeconfig = Kubeconfig::read_from(&kubeconfig_path).change_context(
                KubernetesError::ConnectionFailed {
                    message: format!("Cannot read kubeconfig at {}", kubeconfig_path.display()),
                },
            )?;

            let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .change_context(KubernetesError::ConnectionFailed {
                    message: format!(
                        "Kubeconfig at {} did not yield a usable client config",
                        kubeconfig_path.display()
                    ),
                })?;

            Client::try_from(config).change_context(KubernetesError::ConnectionFailed {
                message: "Failed to build Kubernetes client from kubeconfig".to_string(),
            })?
        }
        None => Client::try_default()
            .await
            .change_context(KubernetesError::ConnectionFailed {
                message: "Failed to build Kubernetes client from the default config chain"
                    .to_string(),
            })?,
    };
    Ok(client)
}
