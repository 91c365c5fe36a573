//! Log output to stderr.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "tally=info,tally_data=info,tally_recode=info,tally_output=info";
const VERBOSE_FILTER: &str = "tally=debug,tally_data=debug,tally_recode=debug,tally_output=debug";

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbose`.
pub(crate) fn init(verbose: bool) {
    let default = if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
