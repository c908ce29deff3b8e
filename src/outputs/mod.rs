//! Output generation.
//!
//! - [`json`]: archives each run's [`PostRecord`](crate::models::PostRecord)
//!   as a JSON file

pub mod json;
