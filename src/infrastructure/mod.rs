//! Infrastructure layer - external concerns

pub mod rules;

pub use rules::{RuleLoader, RuleRegistry, SharedRuleRegistry};
