//! CLI library components for the DBF tool.

pub mod convert;
pub mod logging;
pub mod summary;
pub mod tabular;
