#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result, anyhow};
use rhai::{Dynamic, Engine, Module, Scope};

use crate::{display::Display, error::HarnessError, mute};

/// The embedded expression engine student submissions are bound into.
///
/// Student script files are compiled to modules and registered globally, so a
/// test expression can call their functions unqualified (or qualified by the
/// module name). Each test evaluates against its own fresh [`Scope`], which
/// is what makes preamble state private to a single test case.
pub struct Evaluator {
    /// The engine carrying all registered student modules.
    engine: Engine,
}

impl Evaluator {
    /// Creates an evaluator with student `print` output routed through the
    /// mute gate.
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.on_print(|text| mute::print_line(text));
        Evaluator { engine }
    }

    /// Registers the display surface as `draw`/`pause`/`finish` functions
    /// callable from test scripts.
    pub fn with_display(mut self, display: Arc<dyn Display>) -> Self {
        let d = Arc::clone(&display);
        self.engine.register_fn("draw", move |state: &str| d.draw(state));
        let d = Arc::clone(&display);
        self.engine.register_fn("pause", move || d.pause());
        self.engine.register_fn("finish", move || display.finish());
        self
    }

    /// Compiles a student script file and registers it under `name`, both as
    /// a qualified module and into the global namespace.
    ///
    /// Failures here happen during discovery and are fatal to the run.
    pub fn load_module(&mut self, name: &str, path: &Path) -> Result<()> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("could not read student module {}", path.display()))?;
        let ast = self
            .engine
            .compile(&source)
            .with_context(|| format!("could not compile student module {}", path.display()))?;
        let module = Module::eval_ast_as_new(Scope::new(), &ast, &self.engine)
            .map_err(|err| anyhow!("could not load student module {}: {err}", path.display()))?;

        let shared: rhai::Shared<Module> = module.into();
        self.engine.register_static_module(name, shared.clone());
        self.engine.register_global_module(shared);
        Ok(())
    }

    /// Runs a setup snippet (statements, no result) against the given scope.
    pub fn run_snippet(&self, scope: &mut Scope, code: &str) -> Result<(), HarnessError> {
        self.engine
            .run_with_scope(scope, code)
            .map_err(HarnessError::from_rhai)
    }

    /// Evaluates an expression against the given scope and stringifies the
    /// result.
    pub fn evaluate(&self, scope: &mut Scope, expr: &str) -> Result<String, HarnessError> {
        self.engine
            .eval_with_scope::<Dynamic>(scope, expr)
            .map(|value| value.to_string())
            .map_err(HarnessError::from_rhai)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_expressions_in_a_scope() {
        let evaluator = Evaluator::new();
        let mut scope = Scope::new();
        evaluator
            .run_snippet(&mut scope, "let x = 2;")
            .expect("snippet");
        let result = evaluator.evaluate(&mut scope, "x + 3").expect("eval");
        assert_eq!(result, "5");
    }

    #[test]
    fn division_by_zero_is_an_arithmetic_error() {
        let evaluator = Evaluator::new();
        let mut scope = Scope::new();
        let err = evaluator.evaluate(&mut scope, "1 / 0").expect_err("division");
        assert_eq!(err.eval_kind(), Some("Arithmetic"));
    }

    #[test]
    fn unknown_variables_are_classified() {
        let evaluator = Evaluator::new();
        let mut scope = Scope::new();
        let err = evaluator.evaluate(&mut scope, "nope + 1").expect_err("unknown");
        assert_eq!(err.eval_kind(), Some("VariableNotFound"));
    }
}
