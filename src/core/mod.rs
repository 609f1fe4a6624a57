//! Core types shared by the decode and thumbnail layers.
//! All time values are in nanoseconds (i64).

pub mod time;

pub use time::{Time, ZERO};
