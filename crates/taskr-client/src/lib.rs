/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public TaskR client crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod http;
pub mod types;

// Re-export commonly used types from http
pub use http::{ClientConfig, DEFAULT_BASE_URL, Result, TaskGateway, TaskrClient, TaskrError};

// Re-export all types
pub use types::*;
