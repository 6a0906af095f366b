use std::path::PathBuf;

use clap::Args;

/// Default containerd control socket on the host.
pub const DEFAULT_CONTAINERD_SOCKET: &str = "/run/containerd/containerd.sock";

/// Default cgroup v2 filesystem mount root.
pub const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Default proc filesystem root.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Default pin path of the scheduler's priority map.
///
/// The map is created and owned by the kernel-side scheduler; this tool
/// only writes entries into it. For local testing it can be created with
/// `bpftool map create /sys/fs/bpf/priority_pids type hash key 4 value 8 entries 1024 name priority_pids`.
pub const DEFAULT_PRIORITY_MAP_PATH: &str = "/sys/fs/bpf/priority_pids";

/// Well-known host paths every pipeline stage resolves against.
///
/// Carried explicitly instead of as module globals so tests can point the
/// resolvers at fixture trees.
#[derive(Args, Debug, Clone)]
pub struct Paths {
    #[arg(
        long,
        env = "CONTAINERD_SOCKET",
        default_value = DEFAULT_CONTAINERD_SOCKET,
        help = "Path to the containerd control socket"
    )]
    pub containerd_socket: PathBuf,

    #[arg(
        long,
        default_value = DEFAULT_CGROUP_ROOT,
        help = "Mount root of the unified cgroup v2 hierarchy"
    )]
    pub cgroup_root: PathBuf,

    #[arg(
        long,
        default_value = DEFAULT_PROC_ROOT,
        help = "Root of the proc filesystem"
    )]
    pub proc_root: PathBuf,

    #[arg(
        long,
        env = "PRIORITY_MAP_PATH",
        default_value = DEFAULT_PRIORITY_MAP_PATH,
        help = "Pin path of the scheduler's priority map"
    )]
    pub priority_map_path: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            containerd_socket: PathBuf::from(DEFAULT_CONTAINERD_SOCKET),
            cgroup_root: PathBuf::from(DEFAULT_CGROUP_ROOT),
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            priority_map_path: PathBuf::from(DEFAULT_PRIORITY_MAP_PATH),
        }
    }
}
