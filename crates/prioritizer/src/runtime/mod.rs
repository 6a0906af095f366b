use core::error::Error;

pub mod flavor;
pub mod task;

pub use flavor::RuntimeFlavor;
pub use task::{resolve_host_process, HostProcess};

/// Errors that can occur while resolving a container to its host task.
#[derive(Debug, derive_more::Display)]
pub enum RuntimeError {
    #[display("Container ID {container_id} carries no known runtime prefix")]
    UnknownRuntime { container_id: String },
    #[display("Failed to connect to containerd at {socket}")]
    Unreachable { socket: String },
    #[display("Container {container_id} not found in namespace {namespace}")]
    ContainerNotFound {
        container_id: String,
        namespace: String,
    },
    #[display("Container {container_id} has no task in namespace {namespace}")]
    TaskNotFound {
        container_id: String,
        namespace: String,
    },
    #[display("Failed to query task status for container {container_id}")]
    StatusUnavailable { container_id: String },
    #[display("Task of container {container_id} is {status}, not running")]
    TaskNotRunning {
        container_id: String,
        status: String,
    },
}

impl Error for RuntimeError {}
