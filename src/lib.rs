pub mod config;
pub mod predict;
pub mod report;
pub mod tle;
