// Copyright (c) 2026 rezky_nightky

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::fps::DEFAULT_RETENTION;
use crate::render::frame_period;
use crate::snow::Glyphs;
use crate::spawner::DEFAULT_SPAWN_PERIOD;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowfall",
    version,
    disable_version_flag = true,
    about = "Falling snow that piles into drifts in your terminal",
    after_help = "CONTROLS:\n  left click / drag   drop snow under the pointer\n  q, Esc, Ctrl-C      quit"
)]
pub struct Args {
    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed for spawn columns and drift direction (default: random)"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "ascii",
        help_heading = "GENERAL",
        help = "Draw settled snow as '#' instead of a block (default when LANG is not UTF-8)"
    )]
    pub ascii: bool,

    #[arg(
        long = "no-fps",
        help_heading = "GENERAL",
        help = "Hide the FPS overlay"
    )]
    pub no_fps: bool,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target render FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "spawn-ms",
        default_value_t = DEFAULT_SPAWN_PERIOD.as_millis() as u64,
        help_heading = "PERFORMANCE",
        help = "Milliseconds between spawned flakes (min 1 max 60000)"
    )]
    pub spawn_ms: u64,

    #[arg(
        long = "tick-ms",
        help_heading = "PERFORMANCE",
        help = "Milliseconds between physics ticks (min 1 max 60000; default: one render frame)"
    )]
    pub tick_ms: Option<u64>,

    #[arg(
        long = "fps-window",
        default_value_t = DEFAULT_RETENTION.as_secs(),
        help_heading = "PERFORMANCE",
        help = "Seconds of frame history kept for the FPS average (min 1 max 3600)"
    )]
    pub fps_window: u64,

    #[arg(
        long = "log-file",
        help_heading = "DIAGNOSTICS",
        help = "Write logs to this file (nothing is logged otherwise)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "log-level",
        help_heading = "DIAGNOSTICS",
        help = "Log filter, e.g. debug or snowfall=trace (default: $SNOWFALL_LOG or info)"
    )]
    pub log_level: Option<String>,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

/// Validated runtime settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub target_fps: f64,
    pub frame_period: Duration,
    pub tick_period: Duration,
    pub spawn_period: Duration,
    pub fps_window: Duration,
    pub show_fps: bool,
    pub glyphs: Glyphs,
    pub seed: Option<u64>,
    pub duration: Option<Duration>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> Result<f64, String> {
    if !v.is_finite() {
        return Err(format!(
            "failed to apply {} {} (must be a finite number)",
            name, v
        ));
    }
    if v < min || v > max {
        return Err(format!(
            "failed to apply {} {} (min {} max {})",
            name, v, min, max
        ));
    }
    Ok(v)
}

fn require_u64_range(name: &str, v: u64, min: u64, max: u64) -> Result<u64, String> {
    if v < min || v > max {
        return Err(format!(
            "failed to apply {} {} (min {} max {})",
            name, v, min, max
        ));
    }
    Ok(v)
}

/// True when the locale promises UTF-8 output.
pub fn locale_is_utf8() -> bool {
    let lang = std::env::var("LANG").unwrap_or_default();
    lang.to_ascii_uppercase().contains("UTF")
}

impl Settings {
    pub fn from_args(args: &Args, utf8_locale: bool) -> Result<Self, String> {
        let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0)?;
        let frame_period = frame_period(target_fps);

        let spawn_ms = require_u64_range("--spawn-ms", args.spawn_ms, 1, 60_000)?;
        let tick_period = match args.tick_ms {
            Some(ms) => Duration::from_millis(require_u64_range("--tick-ms", ms, 1, 60_000)?),
            None => frame_period,
        };
        let fps_window = require_u64_range("--fps-window", args.fps_window, 1, 3600)?;

        let duration = match args.duration {
            Some(s) if !s.is_finite() => {
                return Err(format!(
                    "failed to apply --duration {} (must be a finite number)",
                    s
                ))
            }
            Some(s) if s > 0.0 => Some(Duration::from_secs_f64(require_f64_range(
                "--duration",
                s,
                0.1,
                86400.0,
            )?)),
            _ => None,
        };

        Ok(Self {
            target_fps,
            frame_period,
            tick_period,
            spawn_period: Duration::from_millis(spawn_ms),
            fps_window: Duration::from_secs(fps_window),
            show_fps: !args.no_fps,
            glyphs: Glyphs::new(args.ascii || !utf8_locale),
            seed: args.seed,
            duration,
            log_file: args.log_file.clone(),
            log_level: args.log_level.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snow::{SETTLED_GLYPH, SETTLED_GLYPH_ASCII};

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("snowfall").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_the_classic_look() {
        let s = Settings::from_args(&parse(&[]), true).unwrap();
        assert_eq!(s.target_fps, 60.0);
        assert_eq!(s.spawn_period, Duration::from_millis(10));
        assert_eq!(s.tick_period, s.frame_period);
        assert_eq!(s.fps_window, Duration::from_secs(10));
        assert!(s.show_fps);
        assert_eq!(s.glyphs.settled, SETTLED_GLYPH);
        assert_eq!(s.duration, None);
        assert_eq!(s.seed, None);
    }

    #[test]
    fn non_utf_locale_falls_back_to_ascii() {
        let s = Settings::from_args(&parse(&[]), false).unwrap();
        assert_eq!(s.glyphs.settled, SETTLED_GLYPH_ASCII);

        let s = Settings::from_args(&parse(&["--ascii"]), true).unwrap();
        assert_eq!(s.glyphs.settled, SETTLED_GLYPH_ASCII);
    }

    #[test]
    fn explicit_periods_and_seed_are_kept() {
        let s = Settings::from_args(
            &parse(&["--tick-ms", "25", "--spawn-ms", "3", "--seed", "42", "--no-fps"]),
            true,
        )
        .unwrap();
        assert_eq!(s.tick_period, Duration::from_millis(25));
        assert_eq!(s.spawn_period, Duration::from_millis(3));
        assert_eq!(s.seed, Some(42));
        assert!(!s.show_fps);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = Settings::from_args(&parse(&["--fps", "500"]), true).unwrap_err();
        assert_eq!(err, "failed to apply --fps 500 (min 1 max 240)");

        assert!(Settings::from_args(&parse(&["--spawn-ms", "0"]), true).is_err());
        assert!(Settings::from_args(&parse(&["--tick-ms", "60001"]), true).is_err());
        assert!(Settings::from_args(&parse(&["--fps-window", "0"]), true).is_err());
        assert!(Settings::from_args(&parse(&["--duration", "0.05"]), true).is_err());
    }

    #[test]
    fn non_positive_duration_disables_the_timer() {
        let s = Settings::from_args(&parse(&["--duration", "0"]), true).unwrap();
        assert_eq!(s.duration, None);
        let s = Settings::from_args(&parse(&["--duration", "2.5"]), true).unwrap();
        assert_eq!(s.duration, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn unknown_flags_fail_to_parse() {
        assert!(Args::try_parse_from(["snowfall", "--color", "red"]).is_err());
    }
}
