use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize tracing on stderr so stdout stays clean for `--query-features`.
///
/// Safe to call again when the entry point is re-entered in-process; only
/// the first call has any effect.
pub fn init(verbose: bool) {
    INIT.call_once(|| {
        let default_filter = if verbose {
            "nest=debug,nest_core=debug"
        } else {
            "nest=info,nest_core=info"
        };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init();
    });
}
