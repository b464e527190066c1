//! Pipeline module - load, normalize, filter and aggregate withdrawal records

pub mod aggregate;
pub mod breakdown;
pub mod canonical;
pub mod dates;
pub mod error;
pub mod filter;
pub mod loader;
pub mod period;
pub mod schema;
pub mod views;

pub use aggregate::*;
pub use breakdown::*;
pub use dates::{coerce_date, DateValue};
pub use error::{PipelineError, PipelineResult};
pub use filter::*;
pub use loader::*;
pub use period::{LabelStyle, Period, DEFAULT_BASELINE};
pub use schema::{records_from_frame, Dimension, EnrollmentRecord};
pub use views::{View, ViewOutput, ViewSettings};
