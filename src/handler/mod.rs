//! Request handler module
//!
//! Resolves request paths and serves them through the ordered case chain:
//! file content, directory index, directory listing, script output, or an error page.

pub mod cases;
pub mod content;
pub mod error;
pub mod error_page;
mod html;
pub mod listing;
pub mod outcome;
pub mod resolve;
pub mod router;
pub mod script;

// Re-export main entry point and shared types
pub use cases::CaseChain;
pub use error::ServeError;
pub use router::handle_request;
