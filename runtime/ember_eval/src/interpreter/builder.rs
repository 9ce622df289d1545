//! `InterpreterBuilder` for creating Interpreter instances.

use std::sync::Arc;

use ember_ir::AstGraph;

use super::{Interpreter, DEFAULT_MAX_CALL_DEPTH};
use crate::environment::Environment;
use crate::resolver::{resolve, ResolvedVariableMap};

/// Builder for [`Interpreter`].
///
/// Without an explicit hop-count map the graph is resolved against the
/// given environment, which is what a host running a fresh script wants.
pub struct InterpreterBuilder {
    env: Environment,
    graph: Arc<AstGraph>,
    resolved: Option<Arc<ResolvedVariableMap>>,
    max_call_depth: usize,
}

impl InterpreterBuilder {
    pub fn new(env: Environment, graph: Arc<AstGraph>) -> Self {
        Self {
            env,
            graph,
            resolved: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Use a hop-count map computed earlier, e.g. by the script cache.
    #[must_use]
    pub fn resolved(mut self, resolved: Arc<ResolvedVariableMap>) -> Self {
        self.resolved = Some(resolved);
        self
    }

    /// Limit on nested script calls before `StackOverflow` is raised.
    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn build(self) -> Interpreter {
        let resolved = self
            .resolved
            .unwrap_or_else(|| resolve(&self.graph, Some(&self.env)));
        let mut interpreter = Interpreter::new(self.env, self.graph, resolved);
        interpreter.max_call_depth = self.max_call_depth;
        interpreter
    }
}
