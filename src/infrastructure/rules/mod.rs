//! Rule storage: the in-memory registry and the JSON file loader

pub mod loader;
pub mod registry;

pub use loader::{parse_rule_set, RuleLoader, BUILTIN_GOTHENBURG_2013};
pub use registry::{RuleRegistry, SharedRuleRegistry};
