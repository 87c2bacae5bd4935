use rand::Rng;

use crate::model::character::Stats;
use crate::model::story::StatChanges;

/// New stats after a choice: `clamp(current + delta + noise, 0, 100)`.
///
/// `variance` bounds the noise in points either way; 0 keeps the rule
/// deterministic and never touches the rng.
pub fn apply_stat_changes<R: Rng>(
    current: Stats,
    changes: StatChanges,
    variance: u8,
    rng: &mut R,
) -> Stats {
    let spread = i32::from(variance);
    let mut noise = || {
        if spread == 0 {
            0
        } else {
            rng.gen_range(-spread..=spread)
        }
    };

    let fear_noise = if changes.fear != 0 { noise() } else { 0 };
    let sanity_noise = if changes.sanity != 0 { noise() } else { 0 };

    Stats {
        fear: current.fear.saturating_add(changes.fear).saturating_add(fear_noise),
        sanity: current
            .sanity
            .saturating_add(changes.sanity)
            .saturating_add(sanity_noise),
    }
    .clamped()
}
