use core::error::Error;

pub mod kube_client;
pub mod workload;

pub use kube_client::init_kube_client;
pub use workload::{list_node_workloads, KubeWorkload};

/// Errors that can occur during Kubernetes operations.
#[derive(Debug, derive_more::Display)]
pub enum KubernetesError {
    #[display("Failed to connect to Kubernetes API: {message}")]
    ConnectionFailed { message: String },
    #[display("Failed to list pods on node {node_name}: {message}")]
    ListFailed { node_name: String, message: String },
}

impl Error for KubernetesError {}
