//! Read-only access to the loaded tax rules

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
