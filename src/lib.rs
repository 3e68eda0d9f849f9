//! # Congestion Tax Service
//!
//! Calculates the congestion tax owed by a vehicle for its passages through
//! toll stations, using per-city rule sets (fee schedule, single-charge
//! window, daily cap, toll-free vehicles and dates).
//!
//! ## Architecture
//!
//! - **domain**: vehicle types, rule sets and the pure tax engine
//! - **application**: `TaxService`, resolving a city's rules and running the engine
//! - **infrastructure**: rule registry and rule file loading
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime bootstrap and graceful shutdown
//! - **support**: errors and shutdown signalling

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod support;

pub use application::{TaxAssessment, TaxService};
pub use config::{default_config_path, AppConfig};
pub use domain::{RuleSet, TaxResult, VehicleType};
pub use infrastructure::{RuleLoader, RuleRegistry};
pub use interfaces::create_api_router;
