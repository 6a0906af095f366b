pub mod app;
pub mod bpf;
pub mod cgroup;
pub mod config;
pub mod k8s;
pub mod runtime;
pub mod selector;
