//! Per-asset state.

use std::sync::Arc;

use ember_eval::{Environment, Interpreter, InterpreterBuilder, ResolvedVariableMap};
use ember_ir::AstGraph;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::ids::{AssetGuid, FunctionGuid};
use crate::listener::ListenerSet;
use crate::loader::CompiledFunction;

/// An AST graph ready to run: resolved once, against the environment it
/// executes in.
#[derive(Clone, Debug)]
pub struct LoadedGraph {
    pub graph: Arc<AstGraph>,
    pub resolved: Arc<ResolvedVariableMap>,
    /// Child of the cache's intermediate environment; the script's
    /// top-level locals live here.
    pub environment: Environment,
}

impl LoadedGraph {
    /// An interpreter over this graph with the default call depth.
    pub fn interpreter(&self) -> Interpreter {
        InterpreterBuilder::new(self.environment.clone(), Arc::clone(&self.graph))
            .resolved(Arc::clone(&self.resolved))
            .build()
    }
}

/// Both tracks of one asset.
///
/// Each track's listener mutex also orders its state transitions: commits
/// and registrations take it, so a listener either sees the loaded state
/// or is in the batch the commit notifies.
#[derive(Debug)]
pub(crate) struct ScriptEntry {
    pub(crate) guid: AssetGuid,
    pub(crate) graph: RwLock<Option<LoadedGraph>>,
    pub(crate) interpreted: Mutex<ListenerSet>,
    pub(crate) functions: RwLock<FxHashMap<FunctionGuid, Arc<CompiledFunction>>>,
    pub(crate) compiled: Mutex<FxHashMap<FunctionGuid, ListenerSet>>,
}

impl ScriptEntry {
    pub(crate) fn new(guid: AssetGuid) -> Self {
        ScriptEntry {
            guid,
            graph: RwLock::new(None),
            interpreted: Mutex::new(ListenerSet::default()),
            functions: RwLock::new(FxHashMap::default()),
            compiled: Mutex::new(FxHashMap::default()),
        }
    }

    pub(crate) fn has_graph(&self) -> bool {
        self.graph.read().is_some()
    }

    pub(crate) fn has_function(&self, function: FunctionGuid) -> bool {
        self.functions.read().contains_key(&function)
    }
}
