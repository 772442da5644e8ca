//! Tracing setup for embedding applications.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const MAX_FILTER_LEN: usize = 4096;

/// Build the filter from a raw `RUST_LOG` value.
///
/// Tracing is opt-in: missing, empty, oversized or invalid filters turn
/// logging off rather than failing startup.
pub fn filter_from(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|raw| !raw.is_empty() && raw.len() <= MAX_FILTER_LEN)
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("off"))
}

/// Install a global fmt subscriber filtered by `RUST_LOG`.
///
/// Returns false if a global subscriber was already set.
pub fn init() -> bool {
    let raw = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter_from(raw.as_deref()))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_bad_filters_are_off() {
        assert_eq!(filter_from(None).to_string(), "off");
        assert_eq!(filter_from(Some("   ")).to_string(), "off");
        let huge = "a".repeat(MAX_FILTER_LEN + 1);
        assert_eq!(filter_from(Some(&huge)).to_string(), "off");
    }

    #[test]
    fn valid_filter_is_kept() {
        assert_eq!(filter_from(Some(" taskdeck=debug ")).to_string(), "taskdeck=debug");
    }
}
