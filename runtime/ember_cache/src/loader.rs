//! Compiled-function payloads.
//!
//! The bytecode format belongs to the compiler; the cache only moves the
//! bytes from the asset source into a [`CompiledFunction`] through a
//! [`FunctionLoader`].

use std::fmt;
use std::sync::Arc;

use crate::error::LoadError;

/// A loaded compiled function. Shared by everyone that looks it up.
#[derive(Clone, PartialEq, Eq)]
pub struct CompiledFunction {
    code: Arc<[u8]>,
}

impl CompiledFunction {
    pub fn new(code: impl Into<Arc<[u8]>>) -> Self {
        CompiledFunction { code: code.into() }
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }
}

impl fmt::Debug for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompiledFunction({} bytes)", self.code.len())
    }
}

/// Turns a compiled payload into a function object.
pub trait FunctionLoader: Send + Sync {
    fn load(&self, code: Vec<u8>) -> Result<CompiledFunction, LoadError>;
}

/// Keeps the payload as-is. Rejects empty payloads, which is what a
/// missing or truncated file reads as.
#[derive(Copy, Clone, Debug, Default)]
pub struct RawFunctionLoader;

impl FunctionLoader for RawFunctionLoader {
    fn load(&self, code: Vec<u8>) -> Result<CompiledFunction, LoadError> {
        if code.is_empty() {
            return Err(LoadError::EmptyPayload);
        }
        Ok(CompiledFunction::new(code))
    }
}
