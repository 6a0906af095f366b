use containerd_client::services::v1::containers_client::ContainersClient;
use containerd_client::services::v1::tasks_client::TasksClient;
use containerd_client::services::v1::GetContainerRequest;
use containerd_client::services::v1::GetRequest;
use containerd_client::tonic::metadata::MetadataValue;
use containerd_client::tonic::Code;
use containerd_client::tonic::Request;
use containerd_client::types::v1::Status;
use error_stack::Report;
use error_stack::ResultExt;
use tracing::debug;

use crate::config::Paths;
use crate::runtime::RuntimeError;
use crate::runtime::RuntimeFlavor;

/// The host-side main process of a resolved container task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostProcess {
    pub pid: u32,
}

/// Resolves a runtime-qualified container ID to its host PID.
///
/// Strictly sequential: dispatch on the ID prefix, connect to containerd,
/// load the container object, fetch its task, and require the task to be
/// in the running state. Each failure aborts the resolution; nothing is
/// retried here. The gRPC channel is dropped on every exit path.
///
/// # Errors
///
/// - [`RuntimeError::UnknownRuntime`] if the ID prefix matches no flavor
/// - [`RuntimeError::Unreachable`] if containerd cannot be reached
/// - [`RuntimeError::ContainerNotFound`] if the container does not exist
/// - [`RuntimeError::TaskNotFound`] if the container has no task (e.g. it
///   already exited and was reaped)
/// - [`RuntimeError::StatusUnavailable`] if the task status cannot be read
/// - [`RuntimeError::TaskNotRunning`] if the task exists but is not running
pub async fn resolve_host_process(
    paths: &Paths,
    container_id: &str,
) -> Result<HostProcess, Report<RuntimeError>> {
    let (flavor, task_id) = RuntimeFlavor::parse_container_id(container_id)?;

    debug!(
        container_id = %container_id,
        flavor = %flavor,
        namespace = flavor.namespace(),
        "Resolving container task"
    );

    let channel = containerd_client::connect(&paths.containerd_socket)
        .await
        .change_context(RuntimeError::Unreachable {
            socket: paths.containerd_socket.display().to_string(),
        })?;

    // Load the container first so "container gone" and "task gone" stay
    // distinguishable for the operator.
    let mut containers = ContainersClient::new(channel.clone());
    let request = scoped(
        GetContainerRequest {
            id: task_id.to_string(),
        },
        flavor,
    );
    containers
        .get(request)
        .await
        .map_err(|status| container_error(&status, paths, task_id, flavor))?;

    let mut tasks = TasksClient::new(channel);
    let request = scoped(
        GetRequest {
            container_id: task_id.to_string(),
            exec_id: String::new(),
        },
        flavor,
    );
    let response = tasks
        .get(request)
        .await
        .map_err(|status| task_error(&status, task_id, flavor))?
        .into_inner();

    let Some(process) = response.process else {
        return Err(Report::new(RuntimeError::TaskNotFound {
            container_id: task_id.to_string(),
            namespace: flavor.namespace().to_string(),
        }));
    };

    require_running(process.status, task_id)?;

    debug!(pid = process.pid, "Resolved host process");
    Ok(HostProcess { pid: process.pid })
}

/// Wraps a message into a request scoped to the flavor's namespace.
fn scoped<T>(message: T, flavor: RuntimeFlavor) -> Request<T> {
    let mut request = Request::new(message);
    request.metadata_mut().insert(
        "containerd-namespace",
        MetadataValue::from_static(flavor.namespace()),
    );
    request
}

fn container_error(
    status: &containerd_client::tonic::Status,
    paths: &Paths,
    task_id: &str,
    flavor: RuntimeFlavor,
) -> Report<RuntimeError> {
    let context = if status.code() == Code::NotFound {
        RuntimeError::ContainerNotFound {
            container_id: task_id.to_string(),
            namespace: flavor.namespace().to_string(),
        }
    } else {
        RuntimeError::Unreachable {
            socket: paths.containerd_socket.display().to_string(),
        }
    };
    Report::new(context).attach_printable(status.to_string())
}

fn task_error(
    status: &containerd_client::tonic::Status,
    task_id: &str,
    flavor: RuntimeFlavor,
) -> Report<RuntimeError> {
    let context = if status.code() == Code::NotFound {
        RuntimeError::TaskNotFound {
            container_id: task_id.to_string(),
            namespace: flavor.namespace().to_string(),
        }
    } else {
        RuntimeError::StatusUnavailable {
            container_id: task_id.to_string(),
        }
    };
    Report::new(context).attach_printable(status.to_string())
}

/// A task in any state other than running yields no usable host PID.
fn require_running(status_code: i32, container_id: &str) -> Result<(), Report<RuntimeError>> {
    let status = Status::try_from(status_code).map_err(|_| {
        Report::new(RuntimeError::StatusUnavailable {
            container_id: container_id.to_string(),
        })
        .attach_printable(format!("unknown task status code {status_code}"))
    })?;

    if status != Status::Running {
        return Err(Report::new(RuntimeError::TaskNotRunning {
            container_id: container_id.to_string(),
            status: format!("{status:?}").to_lowercase(),
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_status_passes() {
        assert!(require_running(Status::Running as i32, "abc123").is_ok());
    }

    #[test]
    fn non_running_statuses_are_terminal() {
        for status in [
            Status::Created,
            Status::Stopped,
            Status::Paused,
            Status::Pausing,
            Status::Unknown,
        ] {
            let err = require_running(status as i32, "abc123").unwrap_err();
            assert!(matches!(
                err.current_context(),
                RuntimeError::TaskNotRunning { .. } | RuntimeError::StatusUnavailable { .. }
            ));
        }
    }

    #[test]
    fn stopped_status_names_the_state() {
        let err = require_running(Status::Stopped as i32, "abc123").unwrap_err();
        match err.current_context() {
            RuntimeError::TaskNotRunning {
                container_id,
                status,
            } => {
                assert_eq!(container_id, "abc123");
                assert_eq!(status, "stopped");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_status_code_is_unavailable() {
        let err = require_running(99, "abc123").unwrap_err();
        assert!(matches!(
            err.current_context(),
            RuntimeError::StatusUnavailable { .. }
        ));
    }
}
