//! Core business entities and the congestion tax engine

pub mod rules;
pub mod tax;
pub mod vehicle;

// Re-export commonly used types
pub use rules::{city_key, RuleRepository, RuleSet, RuleSource, TimeRange, TimeRangeSource};
pub use tax::TaxResult;
pub use vehicle::VehicleType;

// Re-export DomainError from support for convenience
pub use crate::support::errors::{DomainError, DomainResult};
