//! Rule set aggregate
//!
//! Contains the per-city rule set, its file representation and the
//! repository interface used to look rule sets up.

pub mod model;
pub mod repository;

pub use model::{city_key, RuleSet, RuleSource, TimeRange, TimeRangeSource};
pub use repository::RuleRepository;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{RuleSet, RuleSource};

    const GOTHENBURG_2013: &str = include_str!("../../../rules/gothenburg-2013.json");

    /// The bundled Gothenburg 2013 rules.
    pub fn gothenburg() -> RuleSet {
        let source: RuleSource = serde_json::from_str(GOTHENBURG_2013).unwrap();
        RuleSet::try_from(source).unwrap()
    }
}
