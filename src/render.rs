// Copyright (c) 2026 rezky_nightky

use std::io::{Error, Result};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::fps::FpsCounter;
use crate::grid::GridSize;
use crate::screen::Screen;
use crate::snow::Snow;

/// Something that paints itself onto every frame.
pub trait Layer: Send + Sync {
    fn draw(&self, screen: &mut dyn Screen);
}

impl Layer for Snow {
    fn draw(&self, screen: &mut dyn Screen) {
        self.paint(screen);
    }
}

impl Layer for FpsCounter {
    fn draw(&self, screen: &mut dyn Screen) {
        self.display(screen);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderRequest {
    /// The terminal changed size; repaint now instead of at the next tick.
    Resize,
    Shutdown,
}

pub fn frame_period(target_fps: f64) -> Duration {
    Duration::from_secs_f64(1.0 / target_fps.max(1.0))
}

/// Sole owner of the screen. Everything else only changes shared state that
/// the driver picks up on its next pass.
pub struct RenderDriver<S: Screen> {
    screen: S,
    size: Arc<GridSize>,
    layers: Vec<Arc<dyn Layer>>,
}

impl<S: Screen> RenderDriver<S> {
    pub fn new(screen: S, size: Arc<GridSize>) -> Self {
        Self {
            screen,
            size,
            layers: Vec::new(),
        }
    }

    /// Layers paint in the order they were added; later ones end up on top.
    pub fn with_layer(mut self, layer: Arc<dyn Layer>) -> Self {
        self.layers.push(layer);
        self
    }

    #[cfg(test)]
    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn render(&mut self) -> Result<()> {
        let (w, h) = self.screen.sync_size()?;
        if self.size.set(w, h) {
            tracing::debug!(width = w, height = h, "grid size changed");
        }
        self.screen.clear();
        for layer in &self.layers {
            layer.draw(&mut self.screen);
        }
        self.screen.flush()
    }

    fn render_logged(&mut self) {
        if let Err(e) = self.render() {
            tracing::warn!(error = %e, "frame dropped");
        }
    }

    /// Renders every `period` and whenever a resize request arrives, until
    /// asked to shut down or every sender is gone. Returns the screen so the
    /// caller decides when it is released.
    pub fn run(mut self, requests: Receiver<RenderRequest>, period: Duration) -> S {
        let mut next = Instant::now();
        loop {
            let timeout = next.saturating_duration_since(Instant::now());
            match requests.recv_timeout(timeout) {
                Ok(RenderRequest::Resize) => self.render_logged(),
                Ok(RenderRequest::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    self.render_logged();
                    next += period;
                    let now = Instant::now();
                    if now > next {
                        next = now;
                    }
                }
            }
        }
        tracing::debug!("render driver stopped");
        self.screen
    }
}

impl<S: Screen + Send + 'static> RenderDriver<S> {
    pub fn start(self, requests: Receiver<RenderRequest>, period: Duration) -> Result<JoinHandle<S>> {
        thread::Builder::new()
            .name("render".to_string())
            .spawn(move || self.run(requests, period))
    }
}

/// Asks the driver to stop and waits for it. A driver that panicked comes
/// back as an error instead of a screen.
pub fn stop<S>(requests: &Sender<RenderRequest>, handle: JoinHandle<S>) -> Result<S> {
    // a dead driver has dropped its receiver; the join below reports why
    let _ = requests.send(RenderRequest::Shutdown);
    handle
        .join()
        .map_err(|_| Error::other("render thread panicked"))
}
