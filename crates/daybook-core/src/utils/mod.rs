//! Utility functions for formatting and lenient deserialization.

pub mod format;
pub mod lenient;

pub use format::{format_date, format_optional, truncate_string};
