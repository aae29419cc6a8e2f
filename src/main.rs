//! Binary entrypoint: runs configured galleries over headless surfaces.
//!
//! Reads JSON control requests from stdin (see `slide_gallery::control`) and logs every gallery
//! event. EOF or Ctrl-C shuts down.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use slide_gallery::bootstrap;
use slide_gallery::config::Configuration;
use slide_gallery::control;
use slide_gallery::registry::Registry;
use slide_gallery::surface::HeadlessSurface;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "slide-gallery", version, about = "Slideshow galleries driven from stdin")]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(
            format!("slide_gallery={level}")
                .parse()
                .context("invalid log directive")?,
        );
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let cfg = Configuration::from_yaml_file(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?
        .validated()
        .context("invalid configuration values")?;
    debug!("Loaded configuration from {}:\n{:#?}", args.config.display(), cfg);

    let cancel = CancellationToken::new();
    let bootstrap::Started {
        registry,
        mut tasks,
    } = bootstrap::start(&cfg, |gallery| Ok(HeadlessSurface::from_config(gallery)), &cancel)?;
    let registry = Arc::new(registry);

    spawn_event_loggers(&registry, &cancel);

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    // Plain thread: a blocked stdin read must not hold up runtime shutdown.
    {
        let cancel = cancel.clone();
        let registry = Arc::clone(&registry);
        std::thread::spawn(move || {
            read_requests(io::stdin().lock(), &registry);
            info!("stdin closed; initiating shutdown");
            cancel.cancel();
        });
    }

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
    }

    Ok(())
}

fn spawn_event_loggers(registry: &Registry, cancel: &CancellationToken) {
    for id in registry.ids() {
        let Some(handle) = registry.get_instance(id) else {
            continue;
        };
        let mut events = handle.subscribe();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = events.recv() => match received {
                        Ok(event) => info!(
                            event = %event.kind,
                            gallery = %event.gallery,
                            index = ?event.current_index,
                            page = event.current_page,
                            "gallery event"
                        ),
                        Err(RecvError::Lagged(skipped)) => warn!(skipped, "event logger lagged"),
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        });
    }
}

fn read_requests(input: impl BufRead, registry: &Registry) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("stdin read failed: {err}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let (display, command) = match control::parse_line(&line) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("{err:#}");
                continue;
            }
        };
        match registry.get_instance(&display) {
            Some(handle) => {
                if let Err(err) = handle.blocking_send(command) {
                    warn!("{err:#}");
                }
            }
            None => {
                let requested = &display;
                warn!(display = %requested, "no gallery registered for display")
            }
        }
    }
}
