pub mod builtin;
pub mod config;
pub mod error;
pub mod execute;
pub mod interp;
pub mod jobs;
pub mod prelude;
pub mod prompt;
pub mod shellenv;
pub mod signal;
pub mod utils;

#[cfg(test)]
mod tests;

pub use error::{OxErr, OxResult};
pub use shellenv::Shell;
