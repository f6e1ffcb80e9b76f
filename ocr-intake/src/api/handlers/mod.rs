//! HTTP request handlers.
//!
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Business logic execution via the storage backend
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`uploads`]: File upload intake for OCR processing
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes and JSON error responses.

pub mod uploads;
