//! Request handler module
//!
//! Responsible for request routing dispatch and mapping file deliveries onto responses.

pub mod files;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
