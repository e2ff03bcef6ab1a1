// ABOUTME: Shared logging setup for tarmak binaries
// ABOUTME: Logs to stderr so command output on stdout stays machine readable

use tracing_subscriber::EnvFilter;

/// Crates whose debug output `--verbose` turns on.
const TARMAK_CRATES: &[&str] = &["tarmak", "tarmak_ssh", "tarmak_cli"];

/// Build the filter: INFO by default, DEBUG for tarmak crates when verbose.
/// Directives in RUST_LOG are applied on top.
pub fn filter(verbose: bool) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    if verbose {
        for name in TARMAK_CRATES {
            if let Ok(directive) = format!("{name}=debug").parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    filter
}

/// Standard logging to stderr. Used by the `tarmak` binary.
pub fn init(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
