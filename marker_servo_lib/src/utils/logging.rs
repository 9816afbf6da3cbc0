//! Tracing initialization for the marker servo node.
//!
//! The control loop logs every cycle at `debug` (deviation, commands, lost
//! marker) and the node logs state changes at `info`, so the default filter
//! shows only acquisitions and losses of the marker. Run with
//! `RUST_LOG=debug` to see per-cycle output. The subscriber is thread-local
//! so it does not fight with the global one the dora runtime installs.

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with a thread-local subscriber.
///
/// - Respects the `RUST_LOG` environment variable (defaults to "info")
/// - Compact output without target, file or line metadata
///
/// The returned guard must stay in scope for as long as logging is wanted.
///
/// # Example
/// ```no_run
/// use marker_servo_lib::init_tracing;
///
/// fn main() {
///     let _guard = init_tracing();
///     // Node code here
/// }
/// ```
pub fn init_tracing() -> DefaultGuard {
    use tracing_subscriber::layer::SubscriberExt;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(fmt_layer);

    tracing::subscriber::set_default(subscriber)
}
