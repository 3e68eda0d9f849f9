//! Rule source interface

use std::sync::Arc;

use super::model::RuleSet;

/// Read access to the rule sets known to the process.
///
/// Lookups are synchronous: rule sets are loaded up front and only read
/// while requests are being served.
pub trait RuleRepository: Send + Sync {
    /// Case-insensitive lookup by city name
    fn find_by_city(&self, city: &str) -> Option<Arc<RuleSet>>;

    /// Keys of every loaded city, sorted
    fn list_cities(&self) -> Vec<String>;
}
