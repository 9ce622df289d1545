//! Shared runtime context.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::function::{FunctionCache, FunctionHandle, ScriptFunction};
use crate::native::NativeRegistry;
use crate::pool::Handle;
use crate::table::{Table, TableCache, TableHandle};

/// Pools and native registry shared by every environment and interpreter
/// that belongs to one runtime. Cloning is cheap and shares the pools.
///
/// Tests build an isolated context each; hosts usually build one and hand
/// it to their script cache.
#[derive(Clone, Debug)]
pub struct ScriptContext {
    tables: Arc<TableCache>,
    functions: Arc<FunctionCache>,
    natives: Arc<NativeRegistry>,
}

impl ScriptContext {
    pub fn new(natives: NativeRegistry) -> Self {
        ScriptContext {
            tables: Arc::new(TableCache::new()),
            functions: Arc::new(FunctionCache::new()),
            natives: Arc::new(natives),
        }
    }

    /// Context with only the core natives registered.
    pub fn with_core_natives() -> Self {
        Self::new(NativeRegistry::with_core_natives())
    }

    pub fn tables(&self) -> &Arc<TableCache> {
        &self.tables
    }

    pub fn functions(&self) -> &Arc<FunctionCache> {
        &self.functions
    }

    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    /// Move a table into the pool.
    pub fn new_table(&self, table: Table) -> TableHandle {
        Handle::insert(&self.tables, RwLock::new(table))
    }

    /// Move a script closure into the pool.
    pub fn new_function(&self, function: ScriptFunction) -> FunctionHandle {
        Handle::insert(&self.functions, function)
    }
}
