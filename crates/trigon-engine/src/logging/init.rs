use std::sync::Once;

use env_logger::Builder;

/// Where log records are written.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LogTarget {
    /// Same stream as the rest of the program output, including shader diagnostics.
    #[default]
    Stdout,
    Stderr,
}

impl From<LogTarget> for env_logger::Target {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Stdout => env_logger::Target::Stdout,
            LogTarget::Stderr => env_logger::Target::Stderr,
        }
    }
}

/// Logger configuration.
///
/// `env_filter` uses `env_logger` filter syntax, e.g.
/// "trigon_engine=debug,wgpu_core=warn". Without it `RUST_LOG` is consulted.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    pub target: LogTarget,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            target: LogTarget::default(),
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(config.env_filter, std::env::var("RUST_LOG").ok());

        let mut builder = Builder::new();
        apply_filter(&mut builder, filter.as_deref());
        builder
            .write_style(config.write_style)
            .target(config.target.into())
            .init();

        log::debug!("logging initialized ({:?})", config.target);
    });
}

/// An explicit filter wins over `RUST_LOG`.
fn resolve_filter(explicit: Option<String>, env: Option<String>) -> Option<String> {
    explicit.or(env)
}

fn apply_filter(builder: &mut Builder, filter: Option<&str>) {
    match filter {
        Some(filter) => {
            builder.parse_filters(filter);
        }
        None => {
            builder.filter_level(log::LevelFilter::Info);
            // GPU stack internals stay quiet at info.
            for module in ["wgpu_core", "wgpu_hal", "naga"] {
                builder.filter_module(module, log::LevelFilter::Warn);
            }
        }
    }
}
