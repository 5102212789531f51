//! CLI for the SDM Steam download monitor.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sdm_core::config::{self, MonitorConfig, Overrides};
use sdm_core::control::ShutdownToken;
use sdm_core::install;
use sdm_core::report::Reporter;
use sdm_core::sampler::{RunOutcome, Sampler};

/// Top-level CLI for the SDM Steam download monitor.
#[derive(Debug, Parser)]
#[command(name = "sdm")]
#[command(about = "SDM: Steam download monitor", long_about = None)]
pub struct Cli {
    /// Seconds between samples.
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Samples to take before exiting; 0 = unbounded (requires --daemon).
    #[arg(long, value_name = "COUNT")]
    pub samples: Option<u32>,

    /// Write the report to this file (with rotation) instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Run unbounded until interrupted.
    #[arg(long)]
    pub daemon: bool,

    /// Steam installation root; skips platform autodetection.
    #[arg(long, value_name = "DIR")]
    pub steam_path: Option<PathBuf>,
}

impl Cli {
    fn into_overrides(self) -> Overrides {
        Overrides {
            interval: self.interval,
            samples: self.samples,
            log_file: self.log_file,
            steam_path: self.steam_path,
            daemon: self.daemon,
        }
    }
}

pub fn run_from_args() -> Result<()> {
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let file_cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", file_cfg);
    let cfg = MonitorConfig::resolve(&file_cfg, cli.into_overrides())?;

    let resolver = install::default_resolver();
    let steam = install::resolve_install(cfg.steam_path.as_deref(), resolver.as_ref())
        .context("locating the Steam installation")?;

    let reporter = match &cfg.log_file {
        Some(path) => Reporter::to_file(path)
            .with_context(|| format!("opening report file {}", path.display()))?,
        None => Reporter::stdout(),
    };

    let shutdown = ShutdownToken::new();
    let handler_token = shutdown.clone();
    ctrlc::set_handler(move || {
        handler_token.signal();
    })
    .context("installing the interrupt handler")?;

    let mut sampler = Sampler::new(steam, reporter, &cfg, shutdown);
    match sampler.run()? {
        RunOutcome::Completed => tracing::info!("run complete"),
        RunOutcome::Interrupted => tracing::info!("run interrupted"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_parse_defaults() {
        let cli = parse(&["sdm"]);
        assert!(cli.interval.is_none());
        assert!(cli.samples.is_none());
        assert!(cli.log_file.is_none());
        assert!(cli.steam_path.is_none());
        assert!(!cli.daemon);
    }

    #[test]
    fn cli_parse_interval_and_samples() {
        let cli = parse(&["sdm", "--interval", "5", "--samples", "12"]);
        assert_eq!(cli.interval, Some(5));
        assert_eq!(cli.samples, Some(12));
    }

    #[test]
    fn cli_parse_log_file() {
        let cli = parse(&["sdm", "--log-file", "/var/log/sdm.log"]);
        assert_eq!(cli.log_file, Some(PathBuf::from("/var/log/sdm.log")));
    }

    #[test]
    fn cli_parse_daemon() {
        assert!(parse(&["sdm", "--daemon"]).daemon);
    }

    #[test]
    fn cli_parse_steam_path() {
        let cli = parse(&["sdm", "--steam-path", "/opt/steam"]);
        assert_eq!(cli.steam_path, Some(PathBuf::from("/opt/steam")));
    }

    #[test]
    fn cli_parse_rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["sdm", "--what"]).is_err());
    }

    #[test]
    fn cli_parse_rejects_non_numeric_interval() {
        assert!(Cli::try_parse_from(["sdm", "--interval", "soon"]).is_err());
    }

    #[test]
    fn overrides_carry_every_flag() {
        let cli = parse(&[
            "sdm",
            "--interval",
            "1",
            "--samples",
            "2",
            "--log-file",
            "out.log",
            "--daemon",
            "--steam-path",
            "/opt/steam",
        ]);
        let overrides = cli.into_overrides();
        assert_eq!(overrides.interval, Some(1));
        assert_eq!(overrides.samples, Some(2));
        assert_eq!(overrides.log_file, Some(PathBuf::from("out.log")));
        assert_eq!(overrides.steam_path, Some(PathBuf::from("/opt/steam")));
        assert!(overrides.daemon);
    }
}
