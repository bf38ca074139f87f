//! Log subscriber setup
//!
//! Per-target filtering over the mosaic-core targets, written to stderr so
//! command output on stdout stays clean.

use crate::config::{LogConfig, TARGETS};
use clap::ValueEnum;
use std::io;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, colored (development)
    Pretty,
    /// One line per event
    Compact,
    /// JSON objects (tool integration)
    Json,
}

/// Build the target filter for `config`
pub fn targets(config: &LogConfig) -> Targets {
    TARGETS
        .iter()
        .fold(Targets::new().with_default(config.global), |targets, target| {
            targets.with_target(*target, config.level_for(target))
        })
}

/// Install the global subscriber
pub fn init(config: &LogConfig, format: LogFormat) {
    let layer = create_format_layer(format, io::stderr).with_filter(targets(config));
    // A subscriber may already be installed (e.g. by a test harness)
    let _ = tracing_subscriber::registry().with(layer).try_init();
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(format: LogFormat, make_writer: F) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
    }
}
