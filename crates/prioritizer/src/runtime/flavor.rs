use error_stack::Report;

use crate::runtime::RuntimeError;

/// The two front-ends that register containers with the local containerd.
///
/// Kubernetes' native CRI integration and the Docker engine both run on
/// top of the same containerd instance, but each keeps its containers in
/// its own namespace and stamps its own scheme onto the container IDs the
/// orchestrator reports. A flavor is plain configuration data (prefix +
/// namespace) feeding one shared resolution path, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum RuntimeFlavor {
    #[display("containerd")]
    Containerd,
    #[display("docker")]
    Docker,
}

impl RuntimeFlavor {
    const ALL: [RuntimeFlavor; 2] = [RuntimeFlavor::Containerd, RuntimeFlavor::Docker];

    /// Scheme the orchestrator prepends to container IDs of this flavor.
    pub const fn id_prefix(self) -> &'static str {
        match self {
            RuntimeFlavor::Containerd => "containerd://",
            RuntimeFlavor::Docker => "docker://",
        }
    }

    /// containerd namespace the flavor registers its containers under.
    pub const fn namespace(self) -> &'static str {
        match self {
            RuntimeFlavor::Containerd => "k8s.io",
            RuntimeFlavor::Docker => "moby",
        }
    }

    /// Dispatches on the ID prefix and strips it for the runtime lookup.
    ///
    /// The prefix exists only to pick the namespace; containerd itself
    /// never sees it. Unknown prefixes fail here, before any socket is
    /// touched.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::UnknownRuntime`] if the ID matches neither flavor
    pub fn parse_container_id(container_id: &str) -> Result<(Self, &str), Report<RuntimeError>> {
        for flavor in Self::ALL {
            if let Some(stripped) = container_id.strip_prefix(flavor.id_prefix()) {
                return Ok((flavor, stripped));
            }
        }

        Err(Report::new(RuntimeError::UnknownRuntime {
            container_id: container_id.to_string(),
        }))
    }
}
