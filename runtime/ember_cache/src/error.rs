//! Load failures.

use std::io;
use std::path::PathBuf;

use ember_ir::GraphError;
use thiserror::Error;

use crate::ids::{AssetGuid, ScriptId};

/// Why an asset track failed to load.
///
/// A failed load leaves the track unloaded, so the next request retries.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode AST graph: {0}")]
    Decode(#[from] GraphError),

    #[error("asset payload is empty")]
    EmptyPayload,

    #[error("asset {0} is not known to the asset source")]
    UnknownAsset(AssetGuid),

    #[error("{0:?} is not registered with the cache")]
    UnknownScript(ScriptId),

    #[error("load job was dropped before it ran")]
    Cancelled,
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}
