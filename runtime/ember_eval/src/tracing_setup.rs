//! Tracing initialization for hosts and tests.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset or a subscriber was already
/// installed, so embedding hosts keep control of their own logging.
///
/// ```text
/// RUST_LOG=ember_eval=debug          # call dispatch
/// RUST_LOG=ember_cache=debug         # asset load state transitions
/// RUST_LOG=ember::script=info        # script `print` output
/// ```
pub fn init_tracing() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .with(EnvFilter::from_default_env())
            .try_init();
    });
}
