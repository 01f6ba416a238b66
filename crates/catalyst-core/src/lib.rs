pub mod error;
pub mod host_config;
pub mod identity;
pub mod io;
pub mod paths;
pub mod prereq;
pub mod project_config;
pub mod prompt;
pub mod secrets;
pub mod settings;
pub mod thoughts;
pub mod toolchain;
pub mod validate;
pub mod workflow;
pub mod worktrees;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{CatalystError, Result};
