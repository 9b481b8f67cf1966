//! Exhaustive search for the fewest toggle presses that light a machine.
//!
//! Every non-empty subset of buttons is simulated, so the cost grows as
//! `2^buttons`. Puzzle machines carry around a dozen buttons, which keeps a
//! full sweep in the low thousands of subsets; a few dozen buttons is the
//! practical ceiling.

use std::cmp::Ordering;

use itertools::Itertools;
use rayon::prelude::*;

use crate::machine::{Lights, Machine};

/// The cheapest combination of buttons that reproduces a light pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleSolution {
    /// Number of buttons pressed, each exactly once.
    pub presses: usize,
    /// The pattern reached, always equal to the target.
    pub pattern: Lights,
    /// Indices of the pressed buttons, ascending.
    pub buttons: Vec<usize>,
}

/// Press every button of `combination` once against an all-off panel.
fn simulate(masks: &[Lights], combination: &[usize], len: usize) -> Lights {
    let mut state = Lights::repeat(false, len);
    for &idx in combination {
        state ^= &masks[idx];
    }
    state
}

/// Smaller combinations first, then lexicographic by button index.
fn enumeration_order(a: &[usize], b: &[usize]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Finds the smallest set of buttons whose toggles produce the machine's
/// target pattern.
///
/// Subsets of size `1..=buttons` are enumerated (size ascending,
/// lexicographic within a size) and evaluated in parallel on the current
/// rayon pool. Every subset is checked; the reduction keeps the earliest
/// match in enumeration order, so the answer does not depend on scheduling.
/// Returns `None` when no subset matches.
pub fn find_minimum_toggle_presses(machine: &Machine) -> Option<ToggleSolution> {
    let buttons = machine.buttons();
    let target = machine.target_lights();
    let len = machine.num_lights();
    let masks: Vec<Lights> = buttons.iter().map(|button| button.mask(len)).collect();

    let best = (1..=buttons.len())
        .flat_map(|size| (0..buttons.len()).combinations(size))
        .par_bridge()
        .filter(|combination| simulate(&masks, combination, len) == *target)
        .min_by(|a, b| enumeration_order(a, b))?;

    tracing::trace!(presses = best.len(), buttons = ?best, "toggle combination found");

    Some(ToggleSolution {
        presses: best.len(),
        pattern: target.clone(),
        buttons: best,
    })
}
