//! API request and response data models.
//!
//! These models define the public API contract. They are distinct from any
//! storage representation and are annotated with `utoipa` for the generated
//! API docs.
//!
//! - [`uploads`]: Upload results and status values

pub mod uploads;
