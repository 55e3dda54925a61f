/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - PHP backend communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod account;
pub mod client;
pub mod error;
pub mod gateway;
pub mod tasks;

pub use error::{Result, TaskrError};
pub use gateway::TaskGateway;

pub use client::{ClientConfig, DEFAULT_BASE_URL, TaskrClient};
