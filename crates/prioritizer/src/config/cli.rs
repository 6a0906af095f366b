use clap::{Parser, Subcommand};
use utils::version;

use crate::config::prioritize::{ListArgs, PrioritizeArgs};

#[derive(Parser)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mark one running container as priority for the sched_ext scheduler
    Prioritize(Box<PrioritizeArgs>),
    /// List running containers on this node
    List(ListArgs),
}
