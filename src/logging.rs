//! Tracing subscriber setup

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level`. The returned guards flush the non-blocking
/// writers and must be held until the program exits.
pub fn init(config: &LoggingConfig, level: &str) -> Result<Vec<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = config.format == "json";

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guards = Vec::new();

    if matches!(config.output.as_str(), "console" | "both") {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        layers.push(fmt_layer(writer, json, true));
        guards.push(guard);
    }

    if matches!(config.output.as_str(), "file" | "both") {
        let path = Path::new(&config.file_path);
        let directory = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(directory)
            .with_context(|| format!("failed to create log directory `{}`", directory.display()))?;
        let file_name = path
            .file_name()
            .with_context(|| format!("log file path `{}` has no file name", path.display()))?;

        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
        layers.push(fmt_layer(writer, json, false));
        guards.push(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(guards)
}

fn fmt_layer<W>(writer: W, json: bool, ansi: bool) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .boxed()
    }
}
