// Copyright (c) 2026 rezky_nightky

mod cell;
mod config;
mod fps;
mod frame;
mod grid;
mod input;
mod logging;
mod physics;
mod render;
mod runtime;
mod screen;
mod snow;
mod spawner;
mod terminal;

use std::ops::ControlFlow;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{locale_is_utf8, Args, Settings};
use crate::fps::FpsCounter;
use crate::grid::GridSize;
use crate::input::{action_for, Action};
use crate::render::{RenderDriver, RenderRequest};
use crate::runtime::spawn_periodic;
use crate::screen::{Screen, TerminalScreen};
use crate::snow::Snow;
use crate::spawner::Spawner;
use crate::terminal::{restore_terminal_best_effort, Terminal};

/// Upper bound on how long the input loop blocks before checking that the
/// render thread is still alive.
const INPUT_POLL: Duration = Duration::from_millis(100);

fn build_info() -> &'static str {
    env!("SNOWFALL_BUILD")
}

fn git_sha() -> &'static str {
    env!("SNOWFALL_GIT_SHA")
}

/// Seeds one generator per thread from the base seed so a fixed `--seed`
/// reproduces spawn columns and drift choices independently.
fn rng_for(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s.wrapping_add(stream)),
        None => StdRng::from_os_rng(),
    }
}

fn install_exit_handlers() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    tracing::info!(signal = sig, "terminating on signal");
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        if !git_sha().is_empty() {
            println!("Commit: {}", git_sha());
        }
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let settings = match Settings::from_args(&args, locale_is_utf8()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(settings.log_file.as_deref(), settings.log_level.as_deref()) {
        eprintln!("failed to set up logging: {}", e);
        std::process::exit(1);
    }

    install_exit_handlers();

    let screen = match Terminal::new().and_then(TerminalScreen::new) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let (w, h) = screen.size();
    tracing::info!(
        width = w,
        height = h,
        fps = settings.target_fps,
        seed = ?settings.seed,
        "snowfall starting"
    );

    let size = Arc::new(GridSize::new(w, h));
    let snow = Arc::new(Snow::new(settings.glyphs));
    let fps = Arc::new(FpsCounter::new());

    let spawner = Spawner::new(Arc::clone(&snow), Arc::clone(&size));
    spawner
        .clone()
        .start(settings.spawn_period, rng_for(settings.seed, 0))?;

    {
        let snow = Arc::clone(&snow);
        let size = Arc::clone(&size);
        let mut rng = rng_for(settings.seed, 1);
        spawn_periodic("physics", settings.tick_period, move || {
            let (w, h) = size.get();
            snow.advance(w, h, &mut rng);
            ControlFlow::Continue(())
        })?;
    }

    {
        let fps = Arc::clone(&fps);
        let ttl = settings.fps_window;
        spawn_periodic("fps-cleanup", ttl, move || {
            let kept = fps.purge(ttl);
            tracing::debug!(seconds = kept, "fps log purged");
            ControlFlow::Continue(())
        })?;
    }

    let mut driver = RenderDriver::new(screen, Arc::clone(&size)).with_layer(snow.clone());
    if settings.show_fps {
        driver = driver.with_layer(fps.clone());
    }
    let (render_tx, render_rx) = mpsc::channel();
    let render_thread = driver.start(render_rx, settings.frame_period)?;

    let outcome = pump_events(settings.duration, &size, &spawner, &render_tx, &render_thread);

    tracing::info!(flakes = snow.len(), "snowfall stopping");
    // the screen comes back with the join result; dropping it restores the terminal
    let stopped = render::stop(&render_tx, render_thread).map(drop);
    if let Err(e) = &stopped {
        tracing::error!(error = %e, "render driver failed");
    }
    restore_terminal_best_effort();

    if let Err(e) = stopped.and(outcome) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Blocks on terminal input until a quit key, the optional deadline, an
/// input error, or the render thread going away.
fn pump_events<S>(
    duration: Option<Duration>,
    size: &GridSize,
    spawner: &Spawner,
    render_tx: &mpsc::Sender<RenderRequest>,
    render: &JoinHandle<S>,
) -> std::io::Result<()> {
    let end_time = duration.map(|d| Instant::now() + d);
    loop {
        if render.is_finished() {
            // the join in main reports how it ended
            return Ok(());
        }
        let wait = match end_time {
            Some(end) => {
                let now = Instant::now();
                if now >= end {
                    return Ok(());
                }
                (end - now).min(INPUT_POLL)
            }
            None => INPUT_POLL,
        };
        if !Terminal::poll_event(wait)? {
            continue;
        }
        let ev = Terminal::read_event()?;

        match action_for(&ev) {
            Action::Quit => return Ok(()),
            Action::Resize(w, h) => {
                size.set(w, h);
                tracing::debug!(width = w, height = h, "terminal resized");
                let _ = render_tx.send(RenderRequest::Resize);
            }
            Action::Spawn(pos) => spawner.spawn_at(pos),
            Action::Ignore => {}
        }
    }
}
