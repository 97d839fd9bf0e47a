// Copyright (c) 2026 rezky_nightky

use std::io::Result;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use rand::Rng;

use crate::grid::{GridSize, Pos};
use crate::runtime::spawn_periodic;
use crate::snow::Snow;

pub const DEFAULT_SPAWN_PERIOD: Duration = Duration::from_millis(10);

/// Feeds new flakes into the store, either on a timer along the top row or
/// wherever the user clicks.
#[derive(Clone, Debug)]
pub struct Spawner {
    snow: Arc<Snow>,
    size: Arc<GridSize>,
}

impl Spawner {
    pub fn new(snow: Arc<Snow>, size: Arc<GridSize>) -> Self {
        Self { snow, size }
    }

    /// Drops a flake at a random column of the top row. Does nothing while
    /// the grid has no columns.
    pub fn spawn_random<R: Rng>(&self, rng: &mut R) -> Option<Pos> {
        let (w, _) = self.size.get();
        if w == 0 {
            return None;
        }
        let pos = Pos::new(i32::from(rng.random_range(0..w)), 0);
        self.snow.add(pos);
        Some(pos)
    }

    pub fn spawn_at(&self, pos: Pos) {
        tracing::trace!(x = pos.x, y = pos.y, "flake spawned by pointer");
        self.snow.add(pos);
    }

    pub fn start<R>(self, period: Duration, mut rng: R) -> Result<JoinHandle<()>>
    where
        R: Rng + Send + 'static,
    {
        spawn_periodic("spawner", period, move || {
            self.spawn_random(&mut rng);
            ControlFlow::Continue(())
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn spawner(w: u16, h: u16) -> (Spawner, Arc<Snow>) {
        let snow = Arc::new(Snow::default());
        let size = Arc::new(GridSize::new(w, h));
        (Spawner::new(Arc::clone(&snow), size), snow)
    }

    #[test]
    fn random_spawns_land_on_the_top_row_within_width() {
        let (sp, snow) = spawner(7, 4);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let p = sp.spawn_random(&mut rng).unwrap();
            assert_eq!(p.y, 0);
            assert!((0..7).contains(&p.x));
        }
        assert!(snow.len() <= 7);
        let mut all_top = true;
        snow.snapshot(|p, _| all_top &= p.y == 0 && (0..7).contains(&p.x));
        assert!(all_top);
    }

    #[test]
    fn zero_width_grid_spawns_nothing() {
        let (sp, snow) = spawner(0, 4);
        assert_eq!(sp.spawn_random(&mut StdRng::seed_from_u64(1)), None);
        assert!(snow.is_empty());
    }

    #[test]
    fn pointer_spawns_overwrite_in_place() {
        let (sp, snow) = spawner(5, 5);
        sp.spawn_at(Pos::new(3, 2));
        sp.spawn_at(Pos::new(3, 2));
        sp.spawn_at(Pos::new(40, 40));
        assert_eq!(snow.len(), 2);

        snow.advance(5, 5, &mut StdRng::seed_from_u64(1));
        assert_eq!(snow.len(), 1);
    }
}
