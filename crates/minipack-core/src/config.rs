use crate::errors::BundleError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the finished artifact is written.
///
/// Consumed by the emission collaborator (the CLI), not by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    /// Output directory (default: ./dist)
    #[serde(default = "default_output_path")]
    pub path: String,

    /// Artifact file name (default: bundle.js)
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_output_path() -> String {
    "./dist".to_string()
}

fn default_filename() -> String {
    "bundle.js".to_string()
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_filename(),
        }
    }
}

/// One loader rule: a glob over canonical identifiers plus the ordered
/// loader names to run. `use` is applied right to left: the last entry
/// runs first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Glob pattern matched against canonical identifiers, e.g. "*.css"
    pub test: String,

    /// Loader names, resolved against the loader registry
    #[serde(rename = "use")]
    pub use_: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleOptions {
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Main bundler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerConfig {
    /// Entry module, relative to the project root (e.g. ./src/app.js)
    pub entry: String,

    #[serde(default)]
    pub output: OutputOptions,

    #[serde(default)]
    pub module: ModuleOptions,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            entry: "./src/app.js".to_string(),
            output: OutputOptions::default(),
            module: ModuleOptions::default(),
        }
    }
}

impl BundlerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, BundleError> {
        let content = std::fs::read_to_string(path)?;
        let config: BundlerConfig =
            serde_json::from_str(&content).map_err(|e| BundleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration and write it to a file
    pub fn init_file(path: &Path) -> Result<(), BundleError> {
        let config = BundlerConfig::default();
        let json = serde_json::to_string_pretty(&config)
            .map_err(|e| BundleError::Config(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), BundleError> {
        if self.entry.trim().is_empty() {
            return Err(BundleError::Config("entry must not be empty".to_string()));
        }
        for rule in &self.module.rules {
            if rule.use_.is_empty() {
                return Err(BundleError::Config(format!(
                    "rule '{}' has an empty use list",
                    rule.test
                )));
            }
        }
        Ok(())
    }
}
