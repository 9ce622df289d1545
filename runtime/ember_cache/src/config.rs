//! Cache configuration.

/// Extension of compiled function payloads written next to their asset.
pub const DEFAULT_FUNCTION_EXTENSION: &str = "ebc";

/// Options for a [`ScriptCache`](crate::ScriptCache).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptCacheConfig {
    /// Extension of compiled function files, without the dot.
    pub function_extension: String,
    /// Requeue loads for already-loaded tracks when an asset changes.
    pub hot_reload: bool,
}

impl Default for ScriptCacheConfig {
    fn default() -> Self {
        ScriptCacheConfig {
            function_extension: DEFAULT_FUNCTION_EXTENSION.to_string(),
            hot_reload: true,
        }
    }
}

impl ScriptCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn function_extension(mut self, extension: impl Into<String>) -> Self {
        self.function_extension = extension.into();
        self
    }

    #[must_use]
    pub fn hot_reload(mut self, enabled: bool) -> Self {
        self.hot_reload = enabled;
        self
    }
}
