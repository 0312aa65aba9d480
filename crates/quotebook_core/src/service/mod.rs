//! Facade and use-case services.
//!
//! # Responsibility
//! - Compose the author and quote stores behind one API.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod quote_repository;
pub mod quote_service;
