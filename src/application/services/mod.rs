//! Application services

mod tax;

pub use tax::{TaxAssessment, TaxService};
