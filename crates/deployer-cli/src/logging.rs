//! Logging setup
//!
//! Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
//! overrides the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATES: [&str; 5] = [
    "deployer_cli",
    "deployer_client",
    "deployer_form",
    "deployer_ui",
    "deployer_validation",
];

/// Filter for `level`: our crates at `level`, everything else at warn
#[must_use]
pub fn filter_directives(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATES.iter().map(|krate| format!("{krate}={level}")));
    directives.join(",")
}

/// Install the global subscriber
///
/// Returns false if a subscriber was already installed.
pub fn init_logging(level: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_scope_level_to_our_crates() {
        let directives = filter_directives(" DEBUG ");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("deployer_validation=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
