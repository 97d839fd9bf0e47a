// Copyright (c) 2026 rezky_nightky

//! File-backed tracing setup.
//!
//! The screen belongs to the animation, so logs never go to stdout or
//! stderr. Without `--log-file` no subscriber is installed and every
//! `tracing` macro is a no-op.

use std::fs::File;
use std::io::{Error, ErrorKind, Result};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SNOWFALL_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Picks the filter directive: the explicit flag, then the environment,
/// then `info`.
pub fn filter_directive(flag: Option<&str>, env: Option<&str>) -> String {
    flag.or(env)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVE)
        .to_string()
}

pub fn build_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("invalid log filter {:?}: {}", directive, e),
        )
    })
}

/// Installs the global subscriber when `path` is given. Returns whether
/// logging is active.
pub fn init(path: Option<&Path>, level: Option<&str>) -> Result<bool> {
    let Some(path) = path else {
        return Ok(false);
    };

    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(&filter_directive(level, env.as_deref()))?;
    let file = File::create(path)?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(false)
        .try_init()
        .is_ok();
    Ok(installed)
}
