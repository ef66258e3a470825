//! Tracing setup for applications built on this crate

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "dear_application=info,dear_application_winit_wgpu=info,warn";
const DEV_FILTER: &str = "dear_application=debug,dear_application_winit_wgpu=debug,info";

/// Install the fmt subscriber. `verbose` adds thread ids and source locations.
fn install(filter: EnvFilter, verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .init();
}

fn env_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log framework lifecycle events at info and everything else at warn.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    install(env_or(DEFAULT_FILTER), false);
}

/// Log with an explicit `EnvFilter` directive string, ignoring `RUST_LOG`
pub fn init_tracing_with_filter(filter: &str) {
    install(EnvFilter::new(filter), false);
}

/// Per-frame and pixel density events, with thread ids and file:line
pub fn init_tracing_dev() {
    install(env_or(DEV_FILTER), true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_parse() {
        for directives in [DEFAULT_FILTER, DEV_FILTER] {
            assert!(EnvFilter::try_new(directives).is_ok(), "{directives}");
        }
    }
}
