//! Process configuration from `--flag value` arguments and `REGISTRY_*` variables.
//!
//! Flags win over environment variables, which win over defaults.

use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:9001";
pub const DEFAULT_REFRESH_SECS: u64 = 600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const USAGE: &str = "Usage: twtxt-registry [--bind <addr:port>] [--seed <registry url>]... \
[--refresh <secs>] [--timeout <secs>] [--log-level <level>]";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: SocketAddr,
    /// Remote registry dumps crawled on every refresh pass.
    pub seed_registries: Vec<String>,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub log_level: tracing::Level,
}

impl Config {
    /// Reads the real process arguments and environment.
    pub fn load() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// `args` excludes the program name.
    pub fn from_sources<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut bind = env("REGISTRY_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let mut seeds: Vec<String> = env("REGISTRY_SEEDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let mut refresh = env("REGISTRY_REFRESH_SECS");
        let mut timeout = env("REGISTRY_TIMEOUT_SECS");
        let mut log_level = env("REGISTRY_LOG");

        let mut cli_seeds = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            let value = || {
                args.get(i + 1)
                    .cloned()
                    .with_context(|| format!("{} requires a value\n{}", flag, USAGE))
            };
            match flag {
                "--bind" => bind = value()?,
                "--seed" => cli_seeds.push(value()?),
                "--refresh" => refresh = Some(value()?),
                "--timeout" => timeout = Some(value()?),
                "--log-level" => log_level = Some(value()?),
                other => bail!("unknown argument {}\n{}", other, USAGE),
            }
            i += 2;
        }
        if !cli_seeds.is_empty() {
            seeds = cli_seeds;
        }

        let bind: SocketAddr = bind
            .parse()
            .with_context(|| format!("invalid bind address {:?}", bind))?;
        let refresh_interval = parse_secs(refresh.as_deref(), DEFAULT_REFRESH_SECS, "refresh")?;
        let fetch_timeout = parse_secs(timeout.as_deref(), DEFAULT_TIMEOUT_SECS, "timeout")?;
        let log_level = match log_level {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid log level {:?}", raw))?,
            None => tracing::Level::INFO,
        };

        Ok(Self {
            bind,
            seed_registries: seeds,
            refresh_interval,
            fetch_timeout,
            log_level,
        })
    }
}

fn parse_secs(raw: Option<&str>, default: u64, what: &str) -> Result<Duration> {
    let secs = match raw {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("invalid {} seconds {:?}", what, raw))?,
        None => default,
    };
    if secs == 0 {
        bail!("{} must be at least one second", what);
    }
    Ok(Duration::from_secs(secs))
}
