//! Rule file loading
//!
//! Rule files are JSON documents in the [`RuleSource`] shape, one city per
//! file. The Gothenburg 2013 rules ship inside the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::registry::SharedRuleRegistry;
use crate::domain::{RuleSet, RuleSource};
use crate::support::errors::{AppResult, InfraError};

/// Rules bundled with the binary
pub const BUILTIN_GOTHENBURG_2013: &str = include_str!("../../../rules/gothenburg-2013.json");

/// Parse and validate a rule document.
pub fn parse_rule_set(json: &str) -> AppResult<RuleSet> {
    let source: RuleSource = serde_json::from_str(json).map_err(InfraError::from)?;
    Ok(RuleSet::try_from(source)?)
}

/// Loads rule files into a registry
pub struct RuleLoader {
    registry: SharedRuleRegistry,
}

impl RuleLoader {
    pub fn new(registry: SharedRuleRegistry) -> Self {
        Self { registry }
    }

    /// Register the bundled Gothenburg rules.
    pub fn load_builtin(&self) -> AppResult<Arc<RuleSet>> {
        let rules = parse_rule_set(BUILTIN_GOTHENBURG_2013)?;
        Ok(self.install(rules, "<builtin>"))
    }

    /// Load a single rule file.
    pub fn load_file(&self, path: &Path) -> AppResult<Arc<RuleSet>> {
        let json = fs::read_to_string(path).map_err(|source| InfraError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source: RuleSource =
            serde_json::from_str(&json).map_err(|source| InfraError::RuleFile {
                path: path.to_path_buf(),
                source,
            })?;
        let rules = RuleSet::try_from(source)?;
        Ok(self.install(rules, &path.display().to_string()))
    }

    /// Load every `*.json` file in `dir`, in file-name order.
    pub fn load_dir(&self, dir: &Path) -> AppResult<Vec<Arc<RuleSet>>> {
        let io_err = |source| InfraError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(io_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        debug!(dir = %dir.display(), count = files.len(), "Found rule files");

        files.iter().map(|file| self.load_file(file)).collect()
    }

    /// Load each path as a directory or a single file. Returns the number of
    /// rule sets loaded.
    pub fn load_paths(&self, paths: &[PathBuf]) -> AppResult<usize> {
        let mut loaded = 0;
        for path in paths {
            if path.is_dir() {
                loaded += self.load_dir(path)?.len();
            } else {
                self.load_file(path)?;
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    fn install(&self, rules: RuleSet, origin: &str) -> Arc<RuleSet> {
        info!(
            city = rules.city(),
            year = rules.year(),
            ranges = rules.time_ranges().len(),
            origin,
            "Loaded tax rules"
        );
        let rules = Arc::new(rules);
        self.registry.register(Arc::clone(&rules));
        rules
    }
}
