//! Subscriber setup for the `eci` binary and integration tests.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "ECI_LOG";

/// Targets logged at `info` when `ECI_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "eci_cli=info,eci_analysis=info,eci_storage=info";

/// Install the global fmt subscriber once per process.
///
/// Directives in `ECI_LOG` use `EnvFilter` syntax keyed by crate target, so
/// `ECI_LOG=eci_analysis::evaluation=debug` adds the bootstrap interval
/// detail while `eci_storage=warn` quiets table loading. Later calls are
/// no-ops.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
