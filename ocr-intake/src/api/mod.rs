//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **OCR intake** (`/ocr/upload`): File upload for downstream OCR processing
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
