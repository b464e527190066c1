//! dropstat: withdrawal analytics library
//!
//! Loads course-enrollment exports, filters the withdrawn students and
//! aggregates them into zero-filled monthly series and category breakdowns.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
