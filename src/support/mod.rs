//! Cross-cutting helpers

pub mod errors;
pub mod shutdown;

pub use errors::{AppError, AppResult, DomainError, DomainResult, InfraError};
