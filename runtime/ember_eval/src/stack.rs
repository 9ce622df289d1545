//! Stack safety for deep script recursion.
//!
//! Each script call and each nested expression recurses on the Rust stack.
//! `ensure_sufficient_stack` grows the stack on demand so deeply nested
//! scripts hit the interpreter's call-depth limit instead of overflowing.

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Headroom required before entering another evaluation frame.
    const RED_ZONE: usize = 128 * 1024;

    /// Size of each newly allocated stack segment.
    const SEGMENT: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
