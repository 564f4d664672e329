//! Shared utilities for the panel workspace.
//!
//! Value parsing, date handling, small statistics and digests used by more
//! than one crate.

pub mod dates;
pub mod hash;
pub mod polars;
pub mod stats;

pub use dates::{ISO_DATE_FORMAT, format_date, parse_date, parse_iso_date};
pub use hash::sha256_hex;
pub use polars::{any_to_string, format_numeric, parse_f64};
pub use stats::{median, round_half_even};
