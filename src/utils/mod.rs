//! Terminal helpers: spinners, styled output, logging

pub mod logging;
pub mod progress;
pub mod styling;

pub use logging::init_logging;
pub use progress::*;
pub use styling::*;
