//! Runtime context
//!
//! Everything executed code can see besides its own source: the `print` log, the
//! multi-value assignment helper and the module table behind `require`. A
//! [`RuntimeContext`] is built fresh for every run and handed to the execute stage.
//!
//! The helpers themselves run inside the JavaScript engine, so this module renders them
//! as a JavaScript prelude ([`RuntimeContext::prelude`]). Their contracts:
//!
//!     $assign(v)        -> v
//!     $assign(a, b, c)  -> [a, b, c]
//!     print(...args)    -> writes to stdout, appends the formatted args to the log
//!     require(name)     -> the module table registered under `name`, or undefined

use std::sync::Arc;

/// Ordered log of everything a run printed, followed by any error it ended with.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogSink {
    entries: Vec<String>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Functions a module can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Numeric coercion.
    Float,
    /// Numeric coercion.
    Number,
    /// Numeric coercion rounded down.
    Int,
    /// String coercion.
    String,
    /// Type-name lookup.
    Type,
    /// The logging `print`.
    Print,
}

impl Builtin {
    pub fn js_source(&self) -> &'static str {
        match self {
            Builtin::Float | Builtin::Number => "(v) => +v",
            Builtin::Int => "(v) => Math.floor(+v)",
            Builtin::String => "(v) => v + \"\"",
            Builtin::Type => "(v) => typeof v",
            Builtin::Print => "__unv_print",
        }
    }
}

/// A named table of exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: String,
    exports: Vec<(String, Builtin)>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            exports: Vec::new(),
        }
    }

    pub fn export(mut self, name: impl Into<String>, builtin: Builtin) -> Self {
        self.exports.push((name.into(), builtin));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, export: &str) -> Option<Builtin> {
        self.exports
            .iter()
            .find(|(name, _)| name == export)
            .map(|(_, builtin)| *builtin)
    }

    pub fn exports(&self) -> impl Iterator<Item = (&str, Builtin)> {
        self.exports.iter().map(|(name, b)| (name.as_str(), *b))
    }
}

/// Resolves the argument of `require`.
pub trait ModuleResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<&Module>;

    /// Every module, in registration order.
    fn modules(&self) -> Vec<&Module>;
}

/// The fixed module table: `standard` plus anything registered on top.
#[derive(Debug, Clone)]
pub struct StandardModules {
    modules: Vec<Module>,
}

impl StandardModules {
    pub fn new() -> Self {
        let standard = Module::new("standard")
            .export("float", Builtin::Float)
            .export("number", Builtin::Number)
            .export("int", Builtin::Int)
            .export("string", Builtin::String)
            .export("type", Builtin::Type)
            .export("print", Builtin::Print);
        StandardModules {
            modules: vec![standard],
        }
    }

    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.retain(|m| m.name != module.name);
        self.modules.push(module);
        self
    }
}

impl Default for StandardModules {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleResolver for StandardModules {
    fn resolve(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    fn modules(&self) -> Vec<&Module> {
        self.modules.iter().collect()
    }
}

/// Per-run state passed to the execute stage.
pub struct RuntimeContext {
    pub log: LogSink,
    resolver: Arc<dyn ModuleResolver>,
    assign_helper: String,
}

impl RuntimeContext {
    pub fn new(resolver: Arc<dyn ModuleResolver>) -> Self {
        RuntimeContext {
            log: LogSink::new(),
            resolver,
            assign_helper: crate::unv::transpiling::ASSIGN_HELPER.to_string(),
        }
    }

    /// Context over [`StandardModules`].
    pub fn standard() -> Self {
        Self::new(Arc::new(StandardModules::new()))
    }

    /// Name the multi-value helper is bound to in executed code.
    pub fn with_assign_helper(mut self, name: impl Into<String>) -> Self {
        self.assign_helper = name.into();
        self
    }

    pub fn assign_helper(&self) -> &str {
        &self.assign_helper
    }

    pub fn resolver(&self) -> &dyn ModuleResolver {
        self.resolver.as_ref()
    }

    /// JavaScript defining the runtime helpers and `__unv_run(code)`, which evaluates
    /// `code` as a sloppy-mode function body with `require` and the assign helper bound
    /// as parameters. `print` is a global so an imported `print` can shadow it.
    ///
    /// Every `print` call writes exactly one stdout line: the formatted arguments as a
    /// JSON string. Errors thrown by the code go to stderr and set a failing exit code.
    pub fn prelude(&self) -> String {
        let mut prelude = String::from(PRELUDE_HEAD);

        prelude.push_str("const __unv_modules = {\n");
        for module in self.resolver.modules() {
            prelude.push_str(&format!("  {}: {{\n", js_string(module.name())));
            for (name, builtin) in module.exports() {
                prelude.push_str(&format!("    {}: {},\n", js_string(name), builtin.js_source()));
            }
            prelude.push_str("  },\n");
        }
        prelude.push_str("};\n");
        prelude.push_str("const __unv_require = (path) => __unv_modules[path];\n");

        prelude.push_str(&format!(
            "const __unv_run = (code) => {{\n  try {{\n    new Function(\"require\", {}, code)(__unv_require, __unv_assign);\n  }} catch (error) {{\n    process.stderr.write(String((error && error.stack) || error) + \"\\n\");\n    process.exitCode = 1;\n  }}\n}};\n",
            js_string(&self.assign_helper)
        ));

        prelude
    }
}

const PRELUDE_HEAD: &str = r#"const __unv_format = (value) => {
  if (typeof value === "string") return JSON.stringify(value);
  if (typeof value === "function") return "[Function " + (value.name || "anonymous") + "]";
  if (value === undefined) return "undefined";
  if (value === null || typeof value !== "object") return String(value);
  if (value instanceof Error) return "[" + String(value) + "]";
  try {
    return JSON.stringify(value, null, 2);
  } catch (error) {
    return String(value);
  }
};
const __unv_print = (...args) => {
  process.stdout.write(JSON.stringify(args.map(__unv_format).join(" ")) + "\n");
};
const __unv_assign = (...args) => (args.length == 1 ? args[0] : args);
globalThis.print = __unv_print;
"#;

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_module_table() {
        let modules = StandardModules::new();
        let standard = modules.resolve("standard").expect("standard module");
        assert_eq!(standard.get("int"), Some(Builtin::Int));
        assert_eq!(standard.get("print"), Some(Builtin::Print));
        assert_eq!(standard.get("missing"), None);
        assert!(modules.resolve("other").is_none());
    }

    #[test]
    fn test_registered_module_replaces_same_name() {
        let modules = StandardModules::new()
            .with_module(Module::new("standard").export("print", Builtin::Print));
        assert_eq!(modules.modules().len(), 1);
        assert_eq!(modules.resolve("standard").and_then(|m| m.get("int")), None);
    }

    #[test]
    fn test_log_sink_keeps_order() {
        let mut log = LogSink::new();
        log.push("\"a\"");
        log.push("2");
        assert_eq!(log.entries(), ["\"a\"", "2"]);
        assert_eq!(log.take(), vec!["\"a\"".to_string(), "2".to_string()]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_prelude_lists_modules_and_helper() {
        let context = RuntimeContext::standard().with_assign_helper("$assign");
        let prelude = context.prelude();
        assert!(prelude.contains("  \"standard\": {\n"));
        assert!(prelude.contains("    \"int\": (v) => Math.floor(+v),\n"));
        assert!(prelude.contains("    \"print\": __unv_print,\n"));
        assert!(prelude.contains("new Function(\"require\", \"$assign\", code)"));
    }
}
