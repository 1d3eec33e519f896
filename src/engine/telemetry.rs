// ── Emotebank: Logging Setup ───────────────────────────────────────────────
// The crate logs through the `log` facade. Hosts that do not install their
// own logger can call `init_logging` once at startup; `RUST_LOG` overrides
// the default directive.

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber. Safe to call more than once.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // try_init also installs the log → tracing bridge
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
