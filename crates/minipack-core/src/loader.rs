use crate::config::RuleConfig;
use crate::errors::LoaderError;
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;

/// A loader is a pure content transform. Failures propagate through
/// the pipeline untouched; a loader is never retried.
pub type LoaderFn = Arc<dyn Fn(&str) -> anyhow::Result<String> + Send + Sync>;

/// Named loader functions available to rule configuration.
///
/// Rules reference loaders by name; every name is resolved against this
/// registry once, when the configuration is loaded, so a missing loader
/// fails the build before traversal begins.
pub struct LoaderRegistry {
    loaders: HashMap<String, LoaderFn>,
}

impl LoaderRegistry {
    /// An empty registry with no loaders
    pub fn empty() -> Self {
        LoaderRegistry {
            loaders: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in loaders
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("css-loader", Arc::new(|content| css_loader(content)));
        registry.register("json-loader", Arc::new(|content| json_loader(content)));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, loader: LoaderFn) {
        self.loaders.insert(name.into(), loader);
    }

    pub fn get(&self, name: &str) -> Option<LoaderFn> {
        self.loaders.get(name).cloned()
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A rule with its predicate compiled and its loaders resolved
pub struct ResolvedRule {
    pattern: glob::Pattern,
    /// (name, loader) pairs in configured `use` order
    chain: Vec<(String, LoaderFn)>,
}

impl std::fmt::Debug for ResolvedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedRule")
            .field("pattern", &self.pattern)
            .field(
                "chain",
                &self.chain.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}


impl ResolvedRule {
    pub fn matches(&self, identifier: &str) -> bool {
        self.pattern.matches(identifier)
    }
}

/// Resolve every configured rule against the registry.
///
/// Loader-name and pattern failures surface here, before any module is
/// read.
pub fn resolve_rules(
    rules: &[RuleConfig],
    registry: &LoaderRegistry,
) -> Result<Vec<ResolvedRule>, LoaderError> {
    rules
        .iter()
        .map(|rule| {
            let pattern =
                glob::Pattern::new(&rule.test).map_err(|e| LoaderError::InvalidPattern {
                    pattern: rule.test.clone(),
                    message: e.msg.to_string(),
                })?;
            let chain = rule
                .use_
                .iter()
                .map(|name| {
                    registry
                        .get(name)
                        .map(|loader| (name.clone(), loader))
                        .ok_or_else(|| LoaderError::Unknown {
                            name: name.clone(),
                            rule: rule.test.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ResolvedRule { pattern, chain })
        })
        .collect()
}

/// Run a module's raw content through every matching rule.
///
/// Rules are cumulative in configured order; within one rule the `use`
/// chain applies right to left, so `use: [X, Y]` computes `X(Y(raw))`.
pub fn apply_loaders(
    identifier: &str,
    raw: String,
    rules: &[ResolvedRule],
) -> Result<String, LoaderError> {
    let mut content = raw;
    for rule in rules {
        if !rule.matches(identifier) {
            continue;
        }
        for (name, loader) in rule.chain.iter().rev() {
            tracing::debug!(loader = %name, module = %identifier, "applying loader");
            content = loader(&content).map_err(|source| LoaderError::Failed {
                name: name.clone(),
                identifier: identifier.to_string(),
                source,
            })?;
        }
    }
    Ok(content)
}

/// Built-in: wrap CSS text in JavaScript that injects a style element
fn css_loader(content: &str) -> anyhow::Result<String> {
    let escaped = serde_json::to_string(content).context("css content is not valid UTF-8 text")?;
    Ok(format!(
        "var style = document.createElement(\"style\");\n\
         style.innerHTML = {escaped};\n\
         document.head.appendChild(style);"
    ))
}

/// Built-in: expose a JSON document as a module's exports
fn json_loader(content: &str) -> anyhow::Result<String> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("module content is not valid JSON")?;
    Ok(format!("module.exports = {value};"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appending(tag: &'static str) -> LoaderFn {
        Arc::new(move |content| Ok(format!("{content}+{tag}")))
    }

    fn rule(test: &str, use_: &[&str]) -> RuleConfig {
        RuleConfig {
            test: test.to_string(),
            use_: use_.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn registry_with(names: &[&'static str]) -> LoaderRegistry {
        let mut registry = LoaderRegistry::empty();
        for name in names {
            registry.register(*name, appending(name));
        }
        registry
    }

    #[test]
    fn test_use_chain_applies_right_to_left() {
        let registry = registry_with(&["X", "Y"]);
        let rules = resolve_rules(&[rule("*.js", &["X", "Y"])], &registry).unwrap();

        // X(Y(raw)): Y runs first, X last
        let output = apply_loaders("./m.js", "raw".to_string(), &rules).unwrap();
        assert_eq!(output, "raw+Y+X");
    }

    #[test]
    fn test_rules_apply_in_config_order() {
        let registry = registry_with(&["R1", "R2"]);
        let rules = resolve_rules(
            &[rule("*.js", &["R1"]), rule("*.js", &["R2"])],
            &registry,
        )
        .unwrap();

        let output = apply_loaders("./m.js", "raw".to_string(), &rules).unwrap();
        assert_eq!(output, "raw+R1+R2");
    }

    #[test]
    fn test_non_matching_rule_is_skipped() {
        let registry = registry_with(&["X"]);
        let rules = resolve_rules(&[rule("*.css", &["X"])], &registry).unwrap();

        let output = apply_loaders("./m.js", "raw".to_string(), &rules).unwrap();
        assert_eq!(output, "raw");
    }

    #[test]
    fn test_pattern_matches_nested_identifier() {
        let registry = registry_with(&["X"]);
        let rules = resolve_rules(&[rule("*.css", &["X"])], &registry).unwrap();
        assert!(rules[0].matches("./style/index.css"));
    }

    #[test]
    fn test_unknown_loader_fails_resolution() {
        let registry = LoaderRegistry::empty();
        let err = resolve_rules(&[rule("*.css", &["nope-loader"])], &registry).unwrap_err();
        assert!(matches!(err, LoaderError::Unknown { name, .. } if name == "nope-loader"));
    }

    #[test]
    fn test_invalid_pattern_fails_resolution() {
        let registry = registry_with(&["X"]);
        let err = resolve_rules(&[rule("[", &["X"])], &registry).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidPattern { .. }));
    }

    #[test]
    fn test_loader_failure_propagates() {
        let mut registry = LoaderRegistry::empty();
        registry.register("bad", Arc::new(|_| Err(anyhow::anyhow!("boom"))));
        let rules = resolve_rules(&[rule("*.js", &["bad"])], &registry).unwrap();

        let err = apply_loaders("./m.js", "raw".to_string(), &rules).unwrap_err();
        match err {
            LoaderError::Failed { name, source, .. } => {
                assert_eq!(name, "bad");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_css_loader_wraps_content() {
        let output = css_loader("body { color: red; }").unwrap();
        assert!(output.contains("document.createElement(\"style\")"));
        assert!(output.contains("body { color: red; }"));
    }

    #[test]
    fn test_json_loader_exports_value() {
        let output = json_loader(r#"{"a": 1}"#).unwrap();
        assert_eq!(output, "module.exports = {\"a\":1};");
        assert!(json_loader("not json").is_err());
    }
}
