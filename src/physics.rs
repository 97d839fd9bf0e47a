// Copyright (c) 2026 rezky_nightky

//! One tick of the snow automaton.
//!
//! Every flake looks at the three cells under it in the *pre-tick* map and
//! picks straight down first, then whichever diagonal is free, then a coin
//! flip when both diagonals are free. A flake that cannot fall straight
//! down is reported as settled for this tick. The result is written into a
//! fresh map, so the order in which flakes are visited never influences
//! another flake's decision.

use std::collections::HashMap;

use rand::Rng;

use crate::grid::Pos;
use crate::snow::Flake;

/// Computes where the flake at `p` goes next and what it looks like there.
pub fn fall<R: Rng>(
    flakes: &HashMap<Pos, Flake>,
    width: u16,
    height: u16,
    p: Pos,
    rng: &mut R,
) -> (Pos, Flake) {
    let w = i32::from(width);
    let h = i32::from(height);

    let below = p.below();
    let left = p.below_left();
    let right = p.below_right();

    let can_fall = !flakes.contains_key(&below) && below.y < h;
    let can_fall_left = !flakes.contains_key(&left) && left.y < h && left.x >= 0;
    let can_fall_right = !flakes.contains_key(&right) && right.y < h && right.x < w;

    let next = match (can_fall, can_fall_left, can_fall_right) {
        (true, _, _) => below,
        (false, true, false) => left,
        (false, false, true) => right,
        (false, true, true) => {
            if rng.random_bool(0.5) {
                left
            } else {
                right
            }
        }
        (false, false, false) => p,
    };

    let flake = if can_fall {
        Flake::Falling
    } else {
        Flake::Settled
    };
    (next, flake)
}

/// Builds the next-state map. Flakes outside `width x height` are dropped.
/// When two flakes land on the same cell the later one in row-major order
/// wins.
pub fn step<R: Rng>(
    flakes: &HashMap<Pos, Flake>,
    width: u16,
    height: u16,
    rng: &mut R,
) -> HashMap<Pos, Flake> {
    // Row-major order so a seeded rng hands the same coin flip to the same
    // flake on every run.
    let mut order: Vec<Pos> = flakes.keys().copied().collect();
    order.sort_unstable_by_key(|p| (p.y, p.x));

    let mut next = HashMap::with_capacity(flakes.len());
    for p in order {
        if !p.in_bounds(width, height) {
            continue;
        }
        let (to, flake) = fall(flakes, width, height, p, rng);
        if to.in_bounds(width, height) {
            next.insert(to, flake);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    fn map(cells: &[(i32, i32, Flake)]) -> HashMap<Pos, Flake> {
        cells
            .iter()
            .map(|&(x, y, f)| (Pos::new(x, y), f))
            .collect()
    }

    #[test]
    fn falls_straight_down_even_when_diagonals_are_free_or_blocked() {
        let blocked = map(&[
            (2, 1, Flake::Falling),
            (1, 2, Flake::Settled),
            (3, 2, Flake::Settled),
        ]);
        let (to, flake) = fall(&blocked, 5, 5, Pos::new(2, 1), &mut rng());
        assert_eq!(to, Pos::new(2, 2));
        assert_eq!(flake, Flake::Falling);

        let open = map(&[(2, 1, Flake::Falling)]);
        let (to, _) = fall(&open, 5, 5, Pos::new(2, 1), &mut rng());
        assert_eq!(to, Pos::new(2, 2));
    }

    #[test]
    fn slides_to_the_only_free_diagonal() {
        let only_left = map(&[
            (2, 1, Flake::Falling),
            (2, 2, Flake::Settled),
            (3, 2, Flake::Settled),
        ]);
        let only_right = map(&[
            (2, 1, Flake::Falling),
            (2, 2, Flake::Settled),
            (1, 2, Flake::Settled),
        ]);
        for seed in 0..32 {
            let mut r = StdRng::seed_from_u64(seed);
            assert_eq!(
                fall(&only_left, 5, 5, Pos::new(2, 1), &mut r),
                (Pos::new(1, 2), Flake::Settled)
            );
            assert_eq!(
                fall(&only_right, 5, 5, Pos::new(2, 1), &mut r),
                (Pos::new(3, 2), Flake::Settled)
            );
        }
    }

    #[test]
    fn grid_edges_count_as_blocked_diagonals() {
        // left wall: only the right diagonal exists
        let m = map(&[(0, 0, Flake::Falling), (0, 1, Flake::Settled)]);
        assert_eq!(fall(&m, 3, 3, Pos::new(0, 0), &mut rng()).0, Pos::new(1, 1));

        // right wall: only the left diagonal exists
        let m = map(&[(2, 0, Flake::Falling), (2, 1, Flake::Settled)]);
        assert_eq!(fall(&m, 3, 3, Pos::new(2, 0), &mut rng()).0, Pos::new(1, 1));
    }

    #[test]
    fn picks_either_diagonal_when_both_are_free() {
        let m = map(&[(2, 1, Flake::Falling), (2, 2, Flake::Settled)]);
        let mut r = rng();
        let mut saw_left = false;
        let mut saw_right = false;
        for _ in 0..64 {
            let (to, flake) = fall(&m, 5, 5, Pos::new(2, 1), &mut r);
            assert_eq!(flake, Flake::Settled);
            match to {
                p if p == Pos::new(1, 2) => saw_left = true,
                p if p == Pos::new(3, 2) => saw_right = true,
                other => panic!("unexpected target {other:?}"),
            }
        }
        assert!(saw_left && saw_right);
    }

    #[test]
    fn diagonal_choice_is_reproducible_for_a_fixed_seed() {
        let m = map(&[(2, 1, Flake::Falling), (2, 2, Flake::Settled)]);
        let run = |seed| {
            let mut r = StdRng::seed_from_u64(seed);
            (0..16)
                .map(|_| fall(&m, 5, 5, Pos::new(2, 1), &mut r).0)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn stays_put_when_boxed_in() {
        let m = map(&[
            (1, 0, Flake::Falling),
            (0, 1, Flake::Settled),
            (1, 1, Flake::Settled),
            (2, 1, Flake::Settled),
        ]);
        assert_eq!(
            fall(&m, 3, 3, Pos::new(1, 0), &mut rng()),
            (Pos::new(1, 0), Flake::Settled)
        );
    }

    #[test]
    fn single_flake_lands_on_the_floor_and_settles() {
        let mut m = map(&[(1, 0, Flake::Falling)]);
        let mut r = rng();

        m = step(&m, 3, 2, &mut r);
        assert_eq!(m, map(&[(1, 1, Flake::Falling)]));

        m = step(&m, 3, 2, &mut r);
        assert_eq!(m, map(&[(1, 1, Flake::Settled)]));
    }

    #[test]
    fn neighbours_fall_together_in_one_tick() {
        let m = map(&[(1, 0, Flake::Falling), (2, 0, Flake::Falling)]);
        let next = step(&m, 3, 2, &mut rng());
        assert_eq!(
            next,
            map(&[(1, 1, Flake::Falling), (2, 1, Flake::Falling)])
        );
    }

    #[test]
    fn settled_flake_is_stable_under_an_unchanged_neighbourhood() {
        let floor = [
            (0, 2, Flake::Settled),
            (1, 2, Flake::Settled),
            (2, 2, Flake::Settled),
        ];
        let mut cells = floor.to_vec();
        cells.push((1, 1, Flake::Falling));
        let m = map(&cells);

        let (p1, f1) = fall(&m, 3, 3, Pos::new(1, 1), &mut rng());
        assert_eq!((p1, f1), (Pos::new(1, 1), Flake::Settled));

        let mut cells = floor.to_vec();
        cells.push((p1.x, p1.y, f1));
        let m = map(&cells);
        assert_eq!(fall(&m, 3, 3, p1, &mut rng()), (p1, f1));
    }

    #[test]
    fn out_of_bounds_flakes_are_dropped() {
        let m = map(&[
            (-1, 0, Flake::Falling),
            (0, -1, Flake::Falling),
            (5, 0, Flake::Falling),
            (0, 9, Flake::Settled),
            (1, 0, Flake::Falling),
        ]);
        let next = step(&m, 3, 2, &mut rng());
        assert_eq!(next, map(&[(1, 1, Flake::Falling)]));
    }

    #[test]
    fn collisions_never_grow_the_map() {
        // (0,0) and (2,0) both slide towards (1,1) over a blocked floor
        let m = map(&[
            (0, 0, Flake::Falling),
            (2, 0, Flake::Falling),
            (0, 1, Flake::Settled),
            (2, 1, Flake::Settled),
        ]);
        let next = step(&m, 3, 2, &mut rng());
        assert!(next.len() <= m.len());
        assert_eq!(next.len(), 3);
        assert!(next.contains_key(&Pos::new(1, 1)));
    }

    #[test]
    fn every_flake_stays_in_bounds_over_many_ticks() {
        let mut r = rng();
        let mut m = HashMap::new();
        for tick in 0..200 {
            m.insert(Pos::new(r.random_range(-2..10), 0), Flake::Falling);
            if tick % 7 == 0 {
                m.insert(Pos::new(r.random_range(0..8), r.random_range(0..6)), Flake::Falling);
            }
            let before = m.len();
            m = step(&m, 8, 6, &mut r);
            assert!(m.len() <= before);
            assert!(m.keys().all(|p| p.in_bounds(8, 6)));
        }
    }
}
