//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the delivery logic.

pub mod body;
pub mod cache;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use cache::CachePolicy;
pub use range::{parse_range_header, RangeParseResult, RangeSpec};
pub use response::{
    build_404_response, build_405_response, build_416_response, build_500_response,
    build_error_payload, build_health_response,
};
