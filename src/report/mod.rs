//! Report module - terminal tables, run summary and exports

pub mod export;
pub mod summary;
pub mod tables;

pub use export::*;
pub use summary::*;
pub use tables::*;
