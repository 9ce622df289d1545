//! Where asset bytes come from.
//!
//! The cache never touches the file system directly; it asks an
//! [`AssetSource`] for an asset's path and bytes. Hosts plug in their own
//! asset manager, and the two sources here cover a plain directory tree and
//! in-memory assets.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::LoadError;
use crate::ids::AssetGuid;

/// Provider of asset paths and payloads.
pub trait AssetSource: Send + Sync {
    /// Path of the asset's main file, if the asset is known.
    fn asset_path(&self, guid: AssetGuid) -> Option<PathBuf>;

    /// Read a file by path.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, LoadError>;

    /// Read the asset's serialized AST graph.
    fn read_metadata(&self, guid: AssetGuid) -> Result<Vec<u8>, LoadError> {
        let path = self
            .asset_path(guid)
            .ok_or(LoadError::UnknownAsset(guid))?;
        self.read_file(&path)
    }
}

/// Assets laid out under a root directory.
#[derive(Debug)]
pub struct FileSystemSource {
    root: PathBuf,
    paths: RwLock<FxHashMap<AssetGuid, PathBuf>>,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSystemSource {
            root: root.into(),
            paths: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an asset to a path relative to the root.
    pub fn insert(&self, guid: AssetGuid, relative: impl AsRef<Path>) {
        let path = self.root.join(relative);
        self.paths.write().insert(guid, path);
    }
}

impl AssetSource for FileSystemSource {
    fn asset_path(&self, guid: AssetGuid) -> Option<PathBuf> {
        self.paths.read().get(&guid).cloned()
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, LoadError> {
        fs::read(path).map_err(|source| LoadError::io(path, source))
    }
}

/// Assets held in memory. Used by hosts that pack assets and by tests.
#[derive(Debug, Default)]
pub struct MemorySource {
    paths: RwLock<FxHashMap<AssetGuid, PathBuf>>,
    files: RwLock<FxHashMap<PathBuf, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset at `path` with `bytes` as its main file.
    pub fn insert_asset(&self, guid: AssetGuid, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        let path = path.into();
        self.files.write().insert(path.clone(), bytes);
        self.paths.write().insert(guid, path);
    }

    /// Add or overwrite a file.
    pub fn insert_file(&self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.files.write().insert(path.into(), bytes);
    }

    pub fn remove_file(&self, path: &Path) -> bool {
        self.files.write().remove(path).is_some()
    }
}

impl AssetSource for MemorySource {
    fn asset_path(&self, guid: AssetGuid) -> Option<PathBuf> {
        self.paths.read().get(&guid).cloned()
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, LoadError> {
        self.files.read().get(path).cloned().ok_or_else(|| {
            LoadError::io(path, io::Error::from(io::ErrorKind::NotFound))
        })
    }
}
