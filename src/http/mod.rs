//! HTTP protocol layer module
//!
//! Response builders shared by the router and the password handler.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_envelope_response, build_health_response,
    build_options_response, build_output_response,
};
