use rand::Rng;
use tracing::debug;

use crate::snake::{Coordinates, Snake};

/// Picks a uniformly random cell that neither snake occupies.
///
/// Sampling is retried until a free cell comes up, so on a grid that is
/// entirely covered by snakes this never returns.
pub fn place_apple<R: Rng + ?Sized>(
    rng: &mut R,
    grid_width: i32,
    grid_height: i32,
    snakes: &[&Snake],
) -> Coordinates {
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        let candidate = Coordinates::new(
            rng.random_range(0..grid_width),
            rng.random_range(0..grid_height),
        );
        if snakes.iter().all(|snake| !snake.occupies(candidate)) {
            debug!(x = candidate.x, y = candidate.y, attempts, "apple placed");
            return candidate;
        }
    }
}
