use rand::Rng;

use crate::entity::Locatable;
use crate::Coords;

/// Off-grid x used before the first game spawns the apple.
pub const HIDDEN_X: i32 = -10;

/// Cells kept free along every edge when spawning.
const SPAWN_MARGIN: i32 = 1;

#[derive(Debug, Clone)]
pub struct Apple {
    location: Coords,
    spawn_range: Coords,
}

impl Apple {
    /// An apple hidden off-screen until `spawn` is called.
    pub fn new(spawn_range: Coords) -> Self {
        Apple { location: (HIDDEN_X, 0), spawn_range }
    }

    pub fn is_spawned(&self) -> bool {
        self.location.0 != HIDDEN_X
    }

    /// Place the apple on a random cell in `[1, bound)` on both axes.
    ///
    /// The snake is not consulted, so the apple may land on its body.
    pub fn spawn(&mut self) {
        self.spawn_with(&mut rand::thread_rng());
    }

    pub fn spawn_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (bound_x, bound_y) = self.spawn_range;
        self.location = (
            rng.gen_range(SPAWN_MARGIN..bound_x),
            rng.gen_range(SPAWN_MARGIN..bound_y),
        );
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, pos: Coords) {
        self.location = pos;
    }
}

impl Locatable for Apple {
    fn location(&self) -> Coords {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_starts_hidden() {
        let apple = Apple::new((40, 20));
        assert!(!apple.is_spawned());
        assert_eq!(apple.location().0, -10);
    }

    #[test]
    fn test_spawn_stays_inside_margin() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut apple = Apple::new((6, 4));
        for _ in 0..500 {
            apple.spawn_with(&mut rng);
            let (x, y) = apple.location();
            assert!((1..6).contains(&x), "x = {}", x);
            assert!((1..4).contains(&y), "y = {}", y);
        }
        assert!(apple.is_spawned());
    }

    #[test]
    fn test_spawn_reaches_far_edge() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut apple = Apple::new((3, 3));
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            apple.spawn_with(&mut rng);
            seen.insert(apple.location());
        }
        assert_eq!(seen.len(), 4);
        assert!(seen.contains(&(2, 2)));
    }

    #[test]
    fn test_spawn_with_thread_rng() {
        let mut apple = Apple::new((40, 20));
        apple.spawn();
        let (x, y) = apple.location();
        assert!(x >= 1 && x < 40);
        assert!(y >= 1 && y < 20);
    }
}
