//! The benchmark harness of `tweeners-bench`.

pub mod options;
pub mod registry;
pub mod scenarios;
