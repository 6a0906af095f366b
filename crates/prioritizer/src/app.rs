//! Single-shot pipeline driver.
//!
//! The whole run is strictly linear: list → select → resolve host PID →
//! resolve cgroup identity → publish. Every stage either fully succeeds
//! or fails the invocation; there is no retry, no fallback, and no state
//! carried between runs. A wrong guess at any layer would silently
//! prioritize the wrong workload, so failures stay loud.

use error_stack::Report;
use error_stack::ResultExt;
use tracing::info;

use crate::bpf;
use crate::cgroup;
use crate::config::ListArgs;
use crate::config::PrioritizeArgs;
use crate::k8s;
use crate::runtime;
use crate::selector;

/// Stage markers for pipeline failures; the causing stage error stays
/// attached underneath.
#[derive(Debug, derive_more::Display)]
pub enum PipelineError {
    #[display("Failed to determine the node name")]
    NodeResolution,
    #[display("Failed to list running containers")]
    WorkloadListing,
    #[display("Failed to select a workload")]
    Selection,
    #[display("Failed to resolve the container's host process")]
    ProcessResolution,
    #[display("Failed to resolve the process's cgroup identity")]
    CgroupResolution,
    #[display("Failed to publish the priority hint")]
    Publication,
}

impl core::error::Error for PipelineError {}

/// Marks one running container as priority for the sched_ext scheduler.
pub async fn run_prioritize(args: PrioritizeArgs) -> Result<(), Report<PipelineError>> {
    let node_name = resolve_node_name(args.node_name.clone())?;

    let client = k8s::init_kube_client(args.kubeconfig.clone())
        .await
        .change_context(PipelineError::WorkloadListing)?;
    let workloads = k8s::list_node_workloads(client, &node_name)
        .await
        .change_context(PipelineError::WorkloadListing)?;

    let selected = selector::select_workload(
        &workloads,
        args.pod.as_deref(),
        args.container.as_deref(),
        &node_name,
    )
    .change_context(PipelineError::Selection)?
    .clone();

    info!(
        namespace = %selected.namespace,
        pod_name = %selected.pod_name,
        container_name = %selected.container_name,
        container_id = %selected.container_id,
        "Selected workload"
    );

    let process = runtime::resolve_host_process(&args.paths, &selected.container_id)
        .await
        .change_context(PipelineError::ProcessResolution)?;
    info!(pid = process.pid, "Found host PID");

    let identity = cgroup::resolve_cgroup_identity(&args.paths, process.pid)
        .await
        .change_context(PipelineError::CgroupResolution)?;
    info!(
        pid = process.pid,
        cgroup_inode = identity.inode,
        cgroup_path = %identity.path.display(),
        "Resolved cgroup identity"
    );

    bpf::publish_priority_hint(&args.paths, process.pid, identity.inode)
        .change_context(PipelineError::Publication)?;

    info!(
        pid = process.pid,
        cgroup_inode = identity.inode,
        "Priority hint published; the scheduler will now prefer this workload"
    );
    Ok(())
}

/// Prints the running containers on the node without selecting one.
pub async fn run_list(args: ListArgs) -> Result<(), Report<PipelineError>> {
    let node_name = resolve_node_name(args.node_name.clone())?;

    let client = k8s::init_kube_client(args.kubeconfig.clone())
        .await
        .change_context(PipelineError::WorkloadListing)?;
    let workloads = k8s::list_node_workloads(client, &node_name)
        .await
        .change_context(PipelineError::WorkloadListing)?;

    if workloads.is_empty() {
        info!(node_name = %node_name, "No running containers on this node");
        return Ok(());
    }

    for workload in &workloads {
        println!(
            "{}/{}\t{}\t{}",
            workload.namespace,
            workload.pod_name,
            workload.container_name,
            workload.container_id
        );
    }
    Ok(())
}

/// Uses the flag/env value when given, the local hostname otherwise.
fn resolve_node_name(node_name: Option<String>) -> Result<String, Report<PipelineError>> {
    match node_name {
        Some(name) => Ok(name),
        None => {
            let name = hostname::get()
                .change_context(PipelineError::NodeResolution)
                .attach_printable("no --node-name given and hostname lookup failed")?;
            let name = name.to_string_lossy().to_string();
            info!(node_name = %name, "No node name given, falling back to hostname");
            Ok(name)
        }
    }
}
