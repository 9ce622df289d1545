//! Asynchronous load work.

use std::fmt;
use std::sync::Arc;

use crate::cache::ScriptCache;
use crate::ids::{FunctionGuid, ScriptId};

/// Which track a job loads.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum LoadKind {
    Interpreted,
    Compiled(FunctionGuid),
}

/// One pending load, handed out by the cache to the caller's scheduler.
///
/// The job owns the in-flight flag of its track: running it always commits
/// a result, success or failure, which clears the flag and notifies the
/// track's listeners. Dropping a job without running it commits
/// [`LoadError::Cancelled`](crate::LoadError::Cancelled) instead, so waiting
/// listeners hear `Failed` and the next request can retry.
#[must_use = "a load job does nothing until it is run or spawned"]
pub struct LoadJob {
    cache: Arc<ScriptCache>,
    script: ScriptId,
    kind: LoadKind,
    committed: bool,
}

impl LoadJob {
    pub(crate) fn new(cache: Arc<ScriptCache>, script: ScriptId, kind: LoadKind) -> Self {
        LoadJob {
            cache,
            script,
            kind,
            committed: false,
        }
    }

    pub fn script(&self) -> ScriptId {
        self.script
    }

    pub fn kind(&self) -> LoadKind {
        self.kind
    }

    /// Fetch, decode and commit on the current thread.
    pub fn run(mut self) {
        let _span = tracing::debug_span!("load_script", script = ?self.script, kind = ?self.kind).entered();
        match self.kind {
            LoadKind::Interpreted => {
                let result = self.cache.read_ast_graph(self.script);
                self.committed = true;
                self.cache.assign_ast_graph(self.script, result);
            }
            LoadKind::Compiled(function) => {
                let result = self.cache.read_compiled_function(self.script, function);
                self.committed = true;
                self.cache
                    .assign_compiled_function(self.script, function, result);
            }
        }
    }

    /// Run on the rayon pool.
    pub fn spawn(self) {
        rayon::spawn(move || self.run());
    }
}

impl Drop for LoadJob {
    fn drop(&mut self) {
        if !self.committed {
            tracing::debug!(script = ?self.script, kind = ?self.kind, "load job dropped before committing");
            self.cache.cancel_load(self.script, self.kind);
        }
    }
}

impl fmt::Debug for LoadJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadJob")
            .field("script", &self.script)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
