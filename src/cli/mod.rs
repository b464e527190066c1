//! CLI module - argument parsing, conversion and interactive prompts

mod args;
pub mod convert;
mod prompts;

pub use args::{Cli, Commands};
pub use prompts::*;
