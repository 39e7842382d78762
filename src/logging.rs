use tracing_subscriber::EnvFilter;

/// HTTP stack crates held at `warn` so fetch loops stay readable.
const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let mut directives = String::from(log_level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }
    EnvFilter::new(directives)
}

/// Install the global subscriber. `RUST_LOG` overrides `log_level`;
/// `log_format` is "json" or anything else for human-readable output.
pub fn init_logging(log_level: &str, log_format: &str) {
    let builder = tracing_subscriber::fmt().with_env_filter(build_filter(log_level));
    let _ = if log_format == "json" {
        builder.json().with_target(true).try_init()
    } else {
        builder.with_target(false).try_init()
    };
}
