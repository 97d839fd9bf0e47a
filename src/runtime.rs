// Copyright (c) 2026 rezky_nightky

use std::io::Result;
use std::ops::ControlFlow;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Runs `tick` on a named thread once per `period` until it breaks.
///
/// The first tick fires immediately. Deadlines advance by whole periods; a
/// tick that overruns pushes the schedule forward instead of bursting to
/// catch up.
pub fn spawn_periodic<F>(name: &str, period: Duration, mut tick: F) -> Result<JoinHandle<()>>
where
    F: FnMut() -> ControlFlow<()> + Send + 'static,
{
    let period = period.max(Duration::from_millis(1));
    let label = name.to_string();
    thread::Builder::new().name(label.clone()).spawn(move || {
        tracing::debug!(thread = %label, period_ms = period.as_millis() as u64, "periodic task started");
        let mut next = Instant::now();
        loop {
            if tick().is_break() {
                break;
            }
            next += period;
            let now = Instant::now();
            if now > next {
                next = now;
            } else {
                thread::sleep(next - now);
            }
        }
        tracing::debug!(thread = %label, "periodic task stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn stops_when_the_tick_breaks() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let handle = spawn_periodic("test-ticker", Duration::from_millis(1), move || {
            if c.fetch_add(1, Ordering::SeqCst) + 1 == 5 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
        handle.join().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn thread_carries_the_given_name() {
        let handle = spawn_periodic("named-ticker", Duration::from_millis(1), || {
            assert_eq!(thread::current().name(), Some("named-ticker"));
            ControlFlow::Break(())
        })
        .unwrap();
        handle.join().unwrap();
    }
}
