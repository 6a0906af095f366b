use std::path::PathBuf;

use clap::Parser;

use crate::config::paths::Paths;

#[derive(Parser, Clone)]
pub struct PrioritizeArgs {
    #[arg(
        long,
        env = "NODE_NAME",
        help = "Node whose containers are candidates; defaults to the local hostname"
    )]
    pub node_name: Option<String>,

    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file, defaults to in-cluster config or ~/.kube/config"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        long,
        help = "Pod name to prioritize; omit to select interactively"
    )]
    pub pod: Option<String>,

    #[arg(
        long,
        requires = "pod",
        help = "Container name within --pod; defaults to the pod's first running container"
    )]
    pub container: Option<String>,

    #[command(flatten)]
    pub paths: Paths,
}

#[derive(Parser, Clone)]
pub struct ListArgs {
    #[arg(
        long,
        env = "NODE_NAME",
        help = "Node whose containers are listed; defaults to the local hostname"
    )]
    pub node_name: Option<String>,

    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file, defaults to in-cluster config or ~/.kube/config"
    )]
    pub kubeconfig: Option<PathBuf>,
}
