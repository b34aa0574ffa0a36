use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use std::path::PathBuf;
use tickpair::PipelineConfig;

/// Runtime configuration for the `tickpair` binary.
///
/// All values are parsed from CLI arguments or environment variables,
/// with defaults matching the pipeline's standard cadence (a fast value
/// every 250 ms, a slow token every 5 s).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tickpair",
    version,
    about = "An interactive capture pipeline: periodic producers, trigger-driven capture and lookup"
)]
pub struct CliArgs {
    /// Fast-producer tick period, in milliseconds.
    ///
    /// Environment variable: `FAST_PERIOD_MS`
    #[arg(long, env = "FAST_PERIOD_MS", default_value_t = 250)]
    pub fast_period_ms: u64,

    /// Slow-producer tick period, in milliseconds.
    ///
    /// Environment variable: `SLOW_PERIOD_MS`
    #[arg(long, env = "SLOW_PERIOD_MS", default_value_t = 5_000)]
    pub slow_period_ms: u64,

    /// Path of the durable record log. A fresh run truncates any stale
    /// file, since sequence numbers restart at zero.
    ///
    /// Environment variable: `LOG_PATH`
    #[arg(long, env = "LOG_PATH", default_value = "records.log")]
    pub log_path: PathBuf,

    /// Fixed seed for reproducible value/slot selection. Omit for the
    /// default thread-local RNG.
    ///
    /// Environment variable: `SEED`
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub log_path: PathBuf,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.fast_period_ms == 0 {
            bail!("FAST_PERIOD_MS must be greater than 0");
        }
        if args.slow_period_ms == 0 {
            bail!("SLOW_PERIOD_MS must be greater than 0");
        }
        if args.slow_period_ms < args.fast_period_ms {
            bail!(
                "SLOW_PERIOD_MS ({}) must not be shorter than FAST_PERIOD_MS ({})",
                args.slow_period_ms,
                args.fast_period_ms
            );
        }

        Ok(Self {
            pipeline: PipelineConfig {
                fast_period: Duration::from_millis(args.fast_period_ms),
                slow_period: Duration::from_millis(args.slow_period_ms),
                seed: args.seed,
            },
            log_path: args.log_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(fast: u64, slow: u64) -> CliArgs {
        CliArgs {
            fast_period_ms: fast,
            slow_period_ms: slow,
            log_path: PathBuf::from("records.log"),
            seed: None,
        }
    }

    #[test]
    fn defaults_validate() {
        let config = AppConfig::try_from(args(250, 5_000)).unwrap();
        assert_eq!(config.pipeline.fast_period, Duration::from_millis(250));
        assert_eq!(config.pipeline.slow_period, Duration::from_secs(5));
    }

    #[test]
    fn zero_periods_are_rejected() {
        assert!(AppConfig::try_from(args(0, 5_000)).is_err());
        assert!(AppConfig::try_from(args(250, 0)).is_err());
    }

    #[test]
    fn slow_period_must_not_undercut_fast() {
        assert!(AppConfig::try_from(args(250, 100)).is_err());
    }
}
