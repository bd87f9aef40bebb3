//! Logging setup.
//!
//! Structured logging via the `tracing` ecosystem. The walkthrough
//! narrates each step at info level; `--verbose` adds debug detail from
//! the browser layer and `--quiet` reduces output to errors.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Level resolution order: `--verbose` (debug), `--quiet` (errors only),
/// the `RUST_LOG` environment variable, then info for walkshot crates.
/// Call once, before any logging happens.
pub fn init(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("walkshot=debug,walkshot_cli=debug,walkshot_browser=debug")
    } else if quiet {
        EnvFilter::new("walkshot=error,walkshot_cli=error,walkshot_browser=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("walkshot=info,walkshot_cli=info,walkshot_browser=info")
        })
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // The subscriber is global and can only be installed once per process,
    // so these only verify that the filters themselves are well-formed.

    #[test]
    fn verbose_filter_parses() {
        let _ = EnvFilter::new("walkshot=debug,walkshot_cli=debug,walkshot_browser=debug");
    }

    #[test]
    fn quiet_filter_parses() {
        let _ = EnvFilter::new("walkshot=error,walkshot_cli=error,walkshot_browser=error");
    }
}
