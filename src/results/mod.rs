//! Record and page types
//!
//! The values that flow out of the API layer and into the collected output.

mod types;

pub use types::*;
