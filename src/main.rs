//! multiprops CLI
//!
//! Resolves the layered configuration, then sets up logging, then replays the
//! diagnostics produced while resolving.

use anyhow::Result;
use clap::Parser;
use multiprops::cli::{Cli, Command, LOG_FILTER_ENV};
use multiprops::config::{ConfigView, VmConfigResolver, parse_all};
use multiprops::format::{format_paths, format_properties, format_value};
use multiprops::logging::{DeferredLogQueue, TracingSink};
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Resolve first; nothing may log until the subscriber below exists.
    let mut log = DeferredLogQueue::new();
    let resolver = VmConfigResolver::new(cli.source_loader());
    let defaults = cli.default_ids();
    let preempting = cli.preempting_ids();

    let (view, paths): (Arc<ConfigView>, _) = match cli.command {
        Some(Command::Read { ref ids }) => {
            let ids = parse_all(ids);
            let view = ConfigView::read(&ids, resolver.loader());
            (Arc::new(view), ids)
        }
        Some(Command::Paths) => {
            let paths = resolver.resolve_paths(&defaults, &preempting, &mut log);
            (Arc::new(ConfigView::empty()), paths)
        }
        _ => {
            let view = resolver.read_vm_config(&defaults, &preempting, &mut log);
            let paths = view.resource_paths().to_vec();
            (view, paths)
        }
    };
    log.extend(view.delayed_log_items().iter().cloned());

    init_logging(&cli)?;
    let sink = TracingSink::new()
        .with_min_level(cli.diagnostic_level())
        .with_name("multiprops::config");
    log.drain_into(&sink);
    if matches!(cli.command, None | Some(Command::Show)) {
        if resolver.found_vm_config() {
            debug!(sources = view.sources_found(), "Default configuration resolved");
        } else {
            info!("No configuration sources found");
        }
    }

    let output = match cli.command {
        None | Some(Command::Show) | Some(Command::Read { .. }) => {
            format_properties(view.effective_properties(), cli.format)
        }
        Some(Command::Get { ref key }) => format_value(key, view.property(key), cli.format),
        Some(Command::Prefix { ref prefix }) => format_properties(
            view.properties_by_prefix(prefix).unwrap_or(&Default::default()),
            cli.format,
        ),
        Some(Command::Source { ref id }) => format_properties(
            view.properties_by_resource_path(id)
                .unwrap_or(&Default::default()),
            cli.format,
        ),
        Some(Command::Paths) => format_paths(&paths, cli.format),
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    // A missing key is a failed lookup for scripting purposes.
    if let Some(Command::Get { ref key }) = cli.command
        && view.property(key).is_none()
    {
        std::process::exit(1);
    }
    Ok(())
}

/// Install the global tracing subscriber based on `--log` and `--verbose`.
fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::TRACE
    } else {
        Level::INFO
    };
    let filter = std::env::var(LOG_FILTER_ENV)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str()));

    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}
