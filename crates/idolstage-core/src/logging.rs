//! Console logging setup for native hosts.
//!
//! The browser front-end installs its own console layer; the simulator and
//! tests use the `fmt` subscriber configured here.
//!
//! ```ignore
//! idolstage_core::logging::init(1)?; // info and above
//! ```

use tracing_subscriber::EnvFilter;

/// Map a `-v` count to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a global `fmt` subscriber writing to stderr.
///
/// `RUST_LOG` overrides the verbosity-derived directive when set.
pub fn init(verbosity: u8) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
}
