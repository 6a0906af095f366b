use error_stack::Report;
use error_stack::ResultExt;
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::Api;
use kube::Client;
use tracing::debug;

use crate::k8s::KubernetesError;

/// A running container as the orchestrator sees it.
///
/// The `container_id` is runtime-qualified, e.g. `containerd://abc123` or
/// `docker://abc123`; the prefix decides which containerd namespace the
/// task lookup goes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeWorkload {
    pub namespace: String,
    pub pod_name: String,
    pub container_name: String,
    pub container_id: String,
}

/// Lists the running containers scheduled on `node_name`.
///
/// Only pods in the `Running` phase contribute, and within them only
/// container statuses that report a `running` state and carry a runtime
/// ID. Containers still being created have no ID yet and cannot be
/// resolved to a task, so they are skipped.
///
/// # Errors
///
/// - [`KubernetesError::ListFailed`] if the pod list query fails
pub async fn list_node_workloads(
    client: Client,
    node_name: &str,
) -> Result<Vec<KubeWorkload>, Report<KubernetesError>> {
    let pods: Api<Pod> = Api::all(client);
    let params = ListParams::default().fields(&format!("spec.nodeName={node_name}"));

    let pod_list = pods
        .list(&params)
        .await
        .change_context(KubernetesError::ListFailed {
            node_name: node_name.to_string(),
            message: "pod list query failed".to_string(),
        })?;

    let workloads = running_workloads(pod_list.items);
    debug!(
        node_name = %node_name,
        count = workloads.len(),
        "Listed running containers"
    );
    Ok(workloads)
}

/// Keeps only containers that are actually running and carry a runtime ID.
fn running_workloads(pods: Vec<Pod>) -> Vec<KubeWorkload> {
    let mut workloads = Vec::new();

    for pod in pods {
        let Some(status) = pod.status else {
            continue;
        };
        if status.phase.as_deref() != Some("Running") {
            continue;
        }

        let pod_name = pod.metadata.name.unwrap_or_default();
        let namespace = pod.metadata.namespace.unwrap_or_default();

        for container in status.container_statuses.unwrap_or_default() {
            let running = container
                .state
                .as_ref()
                .is_some_and(|state| state.running.is_some());
            if !running {
                continue;
            }

            let Some(container_id) = container.container_id else {
                continue;
            };
            if container_id.is_empty() {
                continue;
            }

            workloads.push(KubeWorkload {
                namespace: namespace.clone(),
                pod_name: pod_name.clone(),
                container_name: container.name,
                container_id,
            });
        }
    }

    workloads
}
