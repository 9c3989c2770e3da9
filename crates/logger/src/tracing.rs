use std::env::var;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives appended to the filter unless `RUST_LOG` mentions the crate
const QUIET_DEPENDENCIES: [&str; 3] = ["hyper_util=warn", "reqwest=warn", "surge_ping=warn"];

pub fn init() {
    init_with_level(LevelFilter::INFO);
}

/// Install the global subscriber.
///
/// `RUST_LOG` refines the filter, `RUST_LOG_FORMAT=json` switches to JSON lines.
/// Calling this twice is a no-op for the second call.
pub fn init_with_level(level: LevelFilter) {
    let rust_log = var("RUST_LOG").unwrap_or_default();
    let mut env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
    for directive in QUIET_DEPENDENCIES {
        let target = directive.split('=').next().unwrap_or(directive);
        if rust_log.contains(target) {
            continue;
        }
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    let log_format = var("RUST_LOG_FORMAT")
        .inspect_err(|error| {
            warn!("Failed to read RUST_LOG_FORMAT, falling back to default: {error}")
        })
        .unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_filter(env_filter)
            .boxed(),
    };

    if tracing_subscriber::registry().with(log_layer).try_init().is_err() {
        warn!("Tracing subscriber already installed");
    }
}
