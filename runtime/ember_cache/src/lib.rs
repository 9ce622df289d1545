//! Ember Cache - per-asset lifecycle for Ember scripts.
//!
//! A [`ScriptCache`] owns the script context and an intermediate
//! environment shared by every loaded script. Assets are registered by
//! guid and loaded on demand, either as an interpreted AST graph or as
//! individual compiled functions. Loads are [`LoadJob`]s handed to the
//! caller, who runs them inline or spawns them on the rayon pool; at most
//! one load per track is ever in flight.
//!
//! Asset bytes come from an [`AssetSource`]; compiled payloads become
//! [`CompiledFunction`]s through a [`FunctionLoader`].

mod cache;
mod config;
mod error;
mod ids;
mod job;
mod listener;
mod loader;
mod script;
mod source;

pub use cache::{compiled_function_path, ScriptCache};
pub use config::{ScriptCacheConfig, DEFAULT_FUNCTION_EXTENSION};
pub use error::LoadError;
pub use ids::{AssetGuid, FunctionGuid, ScriptId};
pub use job::{LoadJob, LoadKind};
pub use listener::{ListenerId, ListenerResult, LoadListener, LoadOutcome};
pub use loader::{CompiledFunction, FunctionLoader, RawFunctionLoader};
pub use script::LoadedGraph;
pub use source::{AssetSource, FileSystemSource, MemorySource};
