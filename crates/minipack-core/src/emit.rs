use crate::graph::ModuleRegistry;
use crate::resolver::RUNTIME_REQUIRE;

/// Synthesizes the final self-invoking bundle from a module registry.
pub struct RuntimeEmitter;

impl RuntimeEmitter {
    /// Emit the bundle text: a module table of factory functions passed
    /// to an IIFE that installs the memoizing loader and boots the entry.
    ///
    /// The cache entry is created with an empty `exports` object before
    /// the factory runs, so a cyclic import observes the partial exports
    /// instead of re-executing the module.
    pub fn emit(registry: &ModuleRegistry, entry: &str) -> String {
        let mut output = String::new();

        output.push_str("(function (modules) {\n");
        output.push_str("  var installedModules = {};\n\n");
        output.push_str(&format!("  function {RUNTIME_REQUIRE}(id) {{\n"));
        output.push_str("    if (installedModules[id]) {\n");
        output.push_str("      return installedModules[id].exports;\n");
        output.push_str("    }\n");
        output.push_str("    if (!modules[id]) {\n");
        output.push_str("      throw new Error(\"Cannot find module '\" + id + \"'\");\n");
        output.push_str("    }\n");
        output.push_str("    var module = (installedModules[id] = { exports: {} });\n");
        output.push_str(&format!(
            "    modules[id].call(module.exports, module, module.exports, {RUNTIME_REQUIRE});\n"
        ));
        output.push_str("    return module.exports;\n");
        output.push_str("  }\n\n");
        output.push_str(&format!(
            "  return {RUNTIME_REQUIRE}({});\n",
            encode_identifier(entry)
        ));
        output.push_str("})({\n");

        for record in registry.values() {
            output.push_str(&format!(
                "  {}: function (module, exports, {RUNTIME_REQUIRE}) {{\n",
                encode_identifier(&record.identifier)
            ));
            for line in record.content.lines() {
                if line.is_empty() {
                    output.push('\n');
                } else {
                    output.push_str("    ");
                    output.push_str(line);
                    output.push('\n');
                }
            }
            output.push_str("  },\n");
        }

        output.push_str("});\n");
        output
    }
}

/// Identifier keys go through JSON string encoding so quotes and
/// backslashes in paths cannot break the table syntax.
fn encode_identifier(identifier: &str) -> String {
    serde_json::to_string(identifier).unwrap_or_else(|_| format!("\"{identifier}\""))
}
