//! Tracing subscriber setup for hosts embedding brainz.

use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber. `RUST_LOG` wins over
/// `default_level`; `json` switches to one JSON object per event.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(default_level: &str, json: bool) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_reports_false() {
        let _ = init_tracing("warn", false);
        assert!(!init_tracing("debug", true));
    }
}
