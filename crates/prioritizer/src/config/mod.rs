pub mod cli;
pub mod paths;
pub mod prioritize;

pub use cli::*;
pub use paths::*;
pub use prioritize::*;
