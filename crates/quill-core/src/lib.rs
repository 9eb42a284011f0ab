//! # Quill Core
//!
//! The domain layer of the Quill blogging backend: entities, derivation
//! rules, repository ports and the services built on top of them.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::{DomainError, DomainResult, FieldError};
