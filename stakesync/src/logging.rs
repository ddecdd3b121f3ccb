use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::settings::{LogFormat, LogSettings};

static INITED: OnceLock<()> = OnceLock::new();

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs the global tracing subscriber, once.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(settings: &LogSettings) {
    if INITED.get().is_some() {
        return;
    }

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    let console_layer = match settings.format {
        LogFormat::Json => fmt_layer.json().boxed(),
        LogFormat::Pretty => fmt_layer.pretty().boxed(),
    };

    let _ = Registry::default()
        .with(env_filter(&settings.level))
        .with(console_layer)
        .try_init();

    let _ = INITED.set(());
}
