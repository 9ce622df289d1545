//! The script cache.
//!
//! Every registered asset has two independent tracks: an interpreted AST
//! graph and a set of compiled functions. Each track moves through
//! unloaded, loading and loaded; a failed load drops back to unloaded so
//! the next request retries. At most one load per track is in flight at a
//! time, tracked in the `loading_*` sets.
//!
//! # Ordering
//!
//! A listener registered before a load commits is notified exactly once for
//! that load. A listener registered after it is notified inline, by the
//! registering call. Both hold because registration and commit take the
//! same per-track mutex.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use ember_eval::{resolve, Environment, ScriptContext};
use ember_ir::AstGraph;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::config::ScriptCacheConfig;
use crate::error::LoadError;
use crate::ids::{AssetGuid, FunctionGuid, ScriptId};
use crate::job::{LoadJob, LoadKind};
use crate::listener::{notify_all, ListenerId, ListenerSet, LoadListener, LoadOutcome};
use crate::loader::{CompiledFunction, FunctionLoader, RawFunctionLoader};
use crate::script::{LoadedGraph, ScriptEntry};
use crate::source::AssetSource;

/// Per-asset lifecycle manager for script graphs and compiled functions.
///
/// Loading entry points take `self: &Arc<Self>` because the jobs they hand
/// out keep the cache alive until they commit.
pub struct ScriptCache {
    config: ScriptCacheConfig,
    context: ScriptContext,
    intermediate: Environment,
    source: Arc<dyn AssetSource>,
    loader: Arc<dyn FunctionLoader>,
    assets: DashMap<AssetGuid, ScriptId>,
    scripts: RwLock<Vec<Arc<ScriptEntry>>>,
    loading_graphs: DashSet<ScriptId>,
    loading_functions: DashSet<(ScriptId, FunctionGuid)>,
}

impl ScriptCache {
    pub fn new(context: ScriptContext, source: Arc<dyn AssetSource>) -> Self {
        Self::with_config(context, source, ScriptCacheConfig::default())
    }

    pub fn with_config(
        context: ScriptContext,
        source: Arc<dyn AssetSource>,
        config: ScriptCacheConfig,
    ) -> Self {
        let intermediate = Environment::create(context.clone());
        ScriptCache {
            config,
            context,
            intermediate,
            source,
            loader: Arc::new(RawFunctionLoader),
            assets: DashMap::new(),
            scripts: RwLock::new(Vec::new()),
            loading_graphs: DashSet::new(),
            loading_functions: DashSet::new(),
        }
    }

    /// Replace the compiled-function loader.
    #[must_use]
    pub fn with_function_loader(mut self, loader: Arc<dyn FunctionLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn config(&self) -> &ScriptCacheConfig {
        &self.config
    }

    pub fn context(&self) -> &ScriptContext {
        &self.context
    }

    /// Cache-wide environment every loaded script runs beneath.
    pub fn intermediate_environment(&self) -> &Environment {
        &self.intermediate
    }

    // Registration

    /// Register an asset, returning its existing id if it is already known.
    pub fn register_asset(&self, guid: AssetGuid) -> ScriptId {
        *self.assets.entry(guid).or_insert_with(|| {
            let mut scripts = self.scripts.write();
            let id = ScriptId::new(u32::try_from(scripts.len()).unwrap_or(u32::MAX));
            scripts.push(Arc::new(ScriptEntry::new(guid)));
            tracing::debug!(asset = %guid, script = ?id, "registered script asset");
            id
        })
    }

    /// Like [`register_asset`](Self::register_asset), skipping the entry
    /// lock when the asset is already registered.
    pub fn find_or_register_asset(&self, guid: AssetGuid) -> ScriptId {
        self.find_asset(guid)
            .unwrap_or_else(|| self.register_asset(guid))
    }

    pub fn find_asset(&self, guid: AssetGuid) -> Option<ScriptId> {
        self.assets.get(&guid).map(|id| *id)
    }

    pub fn asset_guid(&self, id: ScriptId) -> Option<AssetGuid> {
        self.entry(id).map(|entry| entry.guid)
    }

    fn entry(&self, id: ScriptId) -> Option<Arc<ScriptEntry>> {
        self.scripts.read().get(id.index()).cloned()
    }

    // Lookup

    pub fn find_ast_graph(&self, id: ScriptId) -> Option<LoadedGraph> {
        self.entry(id)?.graph.read().clone()
    }

    pub fn find_function(&self, id: ScriptId, function: FunctionGuid) -> Option<Arc<CompiledFunction>> {
        self.entry(id)?.functions.read().get(&function).cloned()
    }

    pub fn is_loading_ast_graph(&self, id: ScriptId) -> bool {
        self.loading_graphs.contains(&id)
    }

    pub fn is_loading_function(&self, id: ScriptId, function: FunctionGuid) -> bool {
        self.loading_functions.contains(&(id, function))
    }

    /// Listeners still waiting on either track of a script.
    pub fn listener_count(&self, id: ScriptId) -> usize {
        self.entry(id).map_or(0, |entry| {
            let compiled: usize = entry.compiled.lock().values().map(ListenerSet::len).sum();
            entry.interpreted.lock().len() + compiled
        })
    }

    /// Path of a compiled function's payload: next to the asset, named by
    /// the function guid.
    pub fn function_path(&self, id: ScriptId, function: FunctionGuid) -> Option<PathBuf> {
        let guid = self.asset_guid(id)?;
        let asset_path = self.source.asset_path(guid)?;
        Some(compiled_function_path(
            &asset_path,
            function,
            &self.config.function_extension,
        ))
    }

    // Loading

    /// Request the script's AST graph.
    ///
    /// Returns a job when this call started the load; `None` when the graph
    /// is already loaded (the listener has then already run) or another
    /// load is in flight (the listener waits for it).
    pub fn try_load_ast_graph(
        self: &Arc<Self>,
        id: ScriptId,
        listener: Option<LoadListener>,
    ) -> Option<LoadJob> {
        let Some(entry) = self.entry(id) else {
            reject_unknown(id, listener);
            return None;
        };

        let mut listeners = entry.interpreted.lock();
        if entry.has_graph() {
            drop(listeners);
            if let Some(listener) = listener {
                if let Some(kept) = listener.notify(id, LoadOutcome::Loaded) {
                    entry.interpreted.lock().push(kept);
                }
            }
            return None;
        }

        if let Some(listener) = listener {
            listeners.push(listener);
        }
        if self.loading_graphs.insert(id) {
            tracing::debug!(script = ?id, "queueing AST graph load");
            Some(LoadJob::new(Arc::clone(self), id, LoadKind::Interpreted))
        } else {
            None
        }
    }

    /// Request one compiled function of the script. Same contract as
    /// [`try_load_ast_graph`](Self::try_load_ast_graph), per function.
    pub fn try_load_script(
        self: &Arc<Self>,
        id: ScriptId,
        function: FunctionGuid,
        listener: Option<LoadListener>,
    ) -> Option<LoadJob> {
        let Some(entry) = self.entry(id) else {
            reject_unknown(id, listener);
            return None;
        };

        let mut compiled = entry.compiled.lock();
        if entry.has_function(function) {
            drop(compiled);
            if let Some(listener) = listener {
                if let Some(kept) = listener.notify(id, LoadOutcome::Loaded) {
                    entry.compiled.lock().entry(function).or_default().push(kept);
                }
            }
            return None;
        }

        if let Some(listener) = listener {
            compiled.entry(function).or_default().push(listener);
        }
        if self.loading_functions.insert((id, function)) {
            tracing::debug!(script = ?id, %function, "queueing compiled function load");
            Some(LoadJob::new(
                Arc::clone(self),
                id,
                LoadKind::Compiled(function),
            ))
        } else {
            None
        }
    }

    /// Drop a listener from every track of the script. Safe to call while
    /// its batch is being notified; it is then not kept for later loads.
    pub fn remove_listener(&self, id: ScriptId, listener: ListenerId) -> bool {
        let Some(entry) = self.entry(id) else {
            return false;
        };
        let mut removed = entry.interpreted.lock().remove(listener);
        for set in entry.compiled.lock().values_mut() {
            removed |= set.remove(listener);
        }
        removed
    }

    // Commit

    /// Commit the result of an AST graph load, clear the in-flight flag and
    /// notify the track's listeners. A failure keeps the previous graph, if
    /// any, and leaves the track free for a retry.
    pub fn assign_ast_graph(&self, id: ScriptId, result: Result<AstGraph, LoadError>) {
        let Some(entry) = self.entry(id) else {
            self.loading_graphs.remove(&id);
            return;
        };

        let loaded = match result {
            Ok(graph) => Some(self.prepare(graph)),
            Err(error) => {
                tracing::warn!(asset = %entry.guid, script = ?id, %error, "AST graph load failed");
                None
            }
        };

        let (batch, outcome) = {
            let mut listeners = entry.interpreted.lock();
            let outcome = match loaded {
                Some(loaded) => {
                    *entry.graph.write() = Some(loaded);
                    LoadOutcome::Loaded
                }
                None => LoadOutcome::Failed,
            };
            self.loading_graphs.remove(&id);
            (listeners.begin_fire(), outcome)
        };
        tracing::debug!(script = ?id, ?outcome, listeners = batch.len(), "AST graph track settled");

        let kept = notify_all(batch, id, outcome);
        entry.interpreted.lock().end_fire(kept);
    }

    /// Commit the result of a compiled-function load. Same contract as
    /// [`assign_ast_graph`](Self::assign_ast_graph).
    pub fn assign_compiled_function(
        &self,
        id: ScriptId,
        function: FunctionGuid,
        result: Result<CompiledFunction, LoadError>,
    ) {
        let loaded = match result {
            Ok(compiled) => Some(Arc::new(compiled)),
            Err(error) => {
                tracing::warn!(script = ?id, %function, %error, "compiled function load failed");
                None
            }
        };
        self.settle_function(id, function, |functions| match loaded {
            Some(compiled) => {
                functions.insert(function, compiled);
                LoadOutcome::Loaded
            }
            None => LoadOutcome::Failed,
        });
    }

    /// Inject a graph from outside the load path, e.g. an editor that just
    /// compiled it. Refused while a load for the graph is in flight.
    pub fn replace_ast_graph(&self, id: ScriptId, graph: AstGraph) -> bool {
        if self.entry(id).is_none() || !self.loading_graphs.insert(id) {
            return false;
        }
        self.assign_ast_graph(id, Ok(graph));
        true
    }

    /// Inject a compiled function. Refused while a load for it is in flight.
    pub fn replace_compiled_function(
        &self,
        id: ScriptId,
        function: FunctionGuid,
        compiled: CompiledFunction,
    ) -> bool {
        if self.entry(id).is_none() || !self.loading_functions.insert((id, function)) {
            return false;
        }
        self.assign_compiled_function(id, function, Ok(compiled));
        true
    }

    /// Unload one compiled function; its listeners are told it is gone.
    /// Refused while a load for it is in flight.
    pub fn remove_compiled_function(&self, id: ScriptId, function: FunctionGuid) -> bool {
        if self.entry(id).is_none() || !self.loading_functions.insert((id, function)) {
            return false;
        }
        self.settle_function(id, function, |functions| {
            functions.remove(&function);
            LoadOutcome::Unloaded
        });
        true
    }

    fn settle_function(
        &self,
        id: ScriptId,
        function: FunctionGuid,
        update: impl FnOnce(&mut FxHashMap<FunctionGuid, Arc<CompiledFunction>>) -> LoadOutcome,
    ) {
        let Some(entry) = self.entry(id) else {
            self.loading_functions.remove(&(id, function));
            return;
        };

        let (batch, outcome) = {
            let mut compiled = entry.compiled.lock();
            let outcome = update(&mut *entry.functions.write());
            self.loading_functions.remove(&(id, function));
            let batch = compiled
                .get_mut(&function)
                .map(ListenerSet::begin_fire)
                .unwrap_or_default();
            (batch, outcome)
        };
        tracing::debug!(script = ?id, %function, ?outcome, listeners = batch.len(), "compiled track settled");

        let kept = notify_all(batch, id, outcome);
        let mut compiled = entry.compiled.lock();
        if let Some(set) = compiled.get_mut(&function) {
            set.end_fire(kept);
        }
    }

    /// Resolve a freshly loaded graph against a new child of the
    /// intermediate environment.
    fn prepare(&self, graph: AstGraph) -> LoadedGraph {
        let environment = self.intermediate.child();
        let graph = Arc::new(graph);
        let resolved = resolve(&graph, Some(&environment));
        LoadedGraph {
            graph,
            resolved,
            environment,
        }
    }

    // Hot reload

    /// The asset system saw `guid` change on disk. Returns one job per
    /// loaded track that is not already reloading: the AST graph, and each
    /// compiled function.
    pub fn on_asset_modified(self: &Arc<Self>, guid: AssetGuid) -> Vec<LoadJob> {
        if !self.config.hot_reload {
            return Vec::new();
        }
        let Some(id) = self.find_asset(guid) else {
            return Vec::new();
        };
        let Some(entry) = self.entry(id) else {
            return Vec::new();
        };

        let mut jobs = Vec::new();
        if entry.has_graph() && self.loading_graphs.insert(id) {
            jobs.push(LoadJob::new(Arc::clone(self), id, LoadKind::Interpreted));
        }
        let functions: Vec<FunctionGuid> = entry.functions.read().keys().copied().collect();
        for function in functions {
            if self.loading_functions.insert((id, function)) {
                jobs.push(LoadJob::new(
                    Arc::clone(self),
                    id,
                    LoadKind::Compiled(function),
                ));
            }
        }
        tracing::debug!(asset = %guid, script = ?id, jobs = jobs.len(), "asset modified");
        jobs
    }

    // Job support

    /// Fail a load whose job was dropped unrun. A track that is no longer
    /// loading was already settled by an external commit and is left alone.
    pub(crate) fn cancel_load(&self, id: ScriptId, kind: LoadKind) {
        match kind {
            LoadKind::Interpreted if self.loading_graphs.contains(&id) => {
                self.assign_ast_graph(id, Err(LoadError::Cancelled));
            }
            LoadKind::Compiled(function) if self.loading_functions.contains(&(id, function)) => {
                self.assign_compiled_function(id, function, Err(LoadError::Cancelled));
            }
            LoadKind::Interpreted | LoadKind::Compiled(_) => {}
        }
    }

    pub(crate) fn read_ast_graph(&self, id: ScriptId) -> Result<AstGraph, LoadError> {
        let guid = self.asset_guid(id).ok_or(LoadError::UnknownScript(id))?;
        let bytes = self.source.read_metadata(guid)?;
        if bytes.is_empty() {
            return Err(LoadError::EmptyPayload);
        }
        Ok(AstGraph::from_bytes(&bytes)?)
    }

    pub(crate) fn read_compiled_function(
        &self,
        id: ScriptId,
        function: FunctionGuid,
    ) -> Result<CompiledFunction, LoadError> {
        let guid = self.asset_guid(id).ok_or(LoadError::UnknownScript(id))?;
        let path = self
            .function_path(id, function)
            .ok_or(LoadError::UnknownAsset(guid))?;
        let code = self.source.read_file(&path)?;
        self.loader.load(code)
    }
}

impl std::fmt::Debug for ScriptCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptCache")
            .field("config", &self.config)
            .field("scripts", &self.scripts.read().len())
            .field("loading_graphs", &self.loading_graphs.len())
            .field("loading_functions", &self.loading_functions.len())
            .finish_non_exhaustive()
    }
}

/// `parent(asset_path)/{function}.{extension}`
pub fn compiled_function_path(asset_path: &Path, function: FunctionGuid, extension: &str) -> PathBuf {
    let file = format!("{function}.{extension}");
    match asset_path.parent() {
        Some(parent) => parent.join(file),
        None => PathBuf::from(file),
    }
}

fn reject_unknown(id: ScriptId, listener: Option<LoadListener>) {
    tracing::warn!(script = ?id, "load requested for unregistered script");
    if let Some(listener) = listener {
        let _ = listener.notify(id, LoadOutcome::Failed);
    }
}
