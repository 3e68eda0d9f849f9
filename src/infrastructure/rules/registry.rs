//! In-memory registry of loaded rule sets

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};

use crate::domain::{city_key, RuleRepository, RuleSet};

/// Thread-safe registry of rule sets keyed by lower-cased city name.
///
/// Each rule set is fully built before it is inserted and is shared
/// read-only afterwards.
pub struct RuleRegistry {
    rules: DashMap<String, Arc<RuleSet>>,
}

/// Shared, reference-counted rule registry
pub type SharedRuleRegistry = Arc<RuleRegistry>;

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: DashMap::new(),
        }
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared() -> SharedRuleRegistry {
        Arc::new(Self::new())
    }

    /// Register a rule set, replacing any previous one for the same city.
    /// Returns the replaced rule set.
    pub fn register(&self, rules: impl Into<Arc<RuleSet>>) -> Option<Arc<RuleSet>> {
        let rules = rules.into();
        let key = rules.key().to_string();
        let city = rules.city().to_string();
        let year = rules.year();

        let previous = self.rules.insert(key, rules);
        match &previous {
            Some(old) => warn!(
                city = city.as_str(),
                year,
                replaced_year = old.year(),
                "Replaced tax rules for city"
            ),
            None => info!(city = city.as_str(), year, "Registered tax rules for city"),
        }
        previous
    }

    pub fn find(&self, city: &str) -> Option<Arc<RuleSet>> {
        self.rules
            .get(&city_key(city))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, city: &str) -> bool {
        self.rules.contains_key(&city_key(city))
    }

    /// Registered city keys, sorted
    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self.rules.iter().map(|r| r.key().clone()).collect();
        cities.sort();
        cities
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRepository for RuleRegistry {
    fn find_by_city(&self, city: &str) -> Option<Arc<RuleSet>> {
        self.find(city)
    }

    fn list_cities(&self) -> Vec<String> {
        self.cities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RuleSource;

    fn rules(city: &str, year: i32) -> RuleSet {
        RuleSet::try_from(RuleSource {
            city: city.into(),
            year,
            currency: "SEK".into(),
            max_daily_tax: 60,
            single_charge_window_minutes: 60,
            toll_free_vehicle_types: vec![],
            toll_free_months: vec![],
            time_ranges: vec![],
            public_holidays: vec![],
        })
        .unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = RuleRegistry::new();
        registry.register(rules("Gothenburg", 2013));

        assert!(registry.find("gothenburg").is_some());
        assert!(registry.find("GOTHENBURG").is_some());
        assert!(registry.find(" Gothenburg ").is_some());
        assert!(registry.find("stockholm").is_none());
    }

    #[test]
    fn register_replaces_same_city() {
        let registry = RuleRegistry::new();
        assert!(registry.register(rules("Gothenburg", 2013)).is_none());

        let replaced = registry.register(rules("gothenburg", 2014)).unwrap();
        assert_eq!(replaced.year(), 2013);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("Gothenburg").unwrap().year(), 2014);
    }

    #[test]
    fn cities_are_sorted_keys() {
        let registry = RuleRegistry::new();
        registry.register(rules("Stockholm", 2013));
        registry.register(rules("Gothenburg", 2013));
        assert_eq!(registry.cities(), vec!["gothenburg", "stockholm"]);
        assert_eq!(registry.list_cities(), registry.cities());
    }

    #[test]
    fn isolated_registries_do_not_share_state() {
        let a = RuleRegistry::new();
        let b = RuleRegistry::new();
        a.register(rules("Gothenburg", 2013));
        assert!(b.is_empty());
        assert!(!b.contains("gothenburg"));
    }

    #[test]
    fn concurrent_readers_see_same_rules() {
        let registry = RuleRegistry::shared();
        registry.register(rules("Gothenburg", 2013));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.find_by_city("gothenburg").map(|r| r.year()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(2013));
        }
    }
}
