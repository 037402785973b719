//! Test support for the encoder session
//!
//! This crate provides test signal generation and an MPEG audio frame
//! scanner used to check that encoded streams are structurally valid.

pub mod error;
pub mod frame_scan;
pub mod signal;

// Re-export commonly used functions and types
pub use error::*;
pub use frame_scan::*;
pub use signal::*;
