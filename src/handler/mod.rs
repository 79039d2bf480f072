//! Request handler module
//!
//! Routing dispatch plus the password endpoint and its query parsing.

pub mod params;
pub mod password;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
