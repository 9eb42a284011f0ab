//! # Quill Shared
//!
//! Wire types of the HTTP API: request bodies and query strings, response
//! payloads, and the success/error envelopes every endpoint returns.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, FieldErrorBody, PaginationMeta};
