//! HTTP REST API
//!
//! - `common`: response envelope and validated JSON extractor
//! - `modules`: handlers, DTOs and middleware per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc};
