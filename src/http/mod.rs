//! HTTP protocol layer module
//!
//! Response builders and content-type detection, independent of how a path was classified.

pub mod mime;
pub mod response;

// Re-export commonly used functions
pub use response::{build_405_response, build_response};
