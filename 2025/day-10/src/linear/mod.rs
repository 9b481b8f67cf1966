//! Minimum press counts when every press adds weight instead of toggling.
//!
//! `C · x = w` with `C[light][button] ∈ {0, 1}`, `x >= 0` integral, minimizing
//! `Σx`. Solved with depth-first branch & bound over [`simplex`] relaxations.

pub mod simplex;

use nalgebra::{DMatrix, DVector};

use crate::error::ProgramError;
use crate::machine::Machine;
use simplex::{Outcome, StandardForm};

/// Tolerance for checking if a float represents an integer.
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Slack allowed on relaxation bounds before a branch is pruned.
const PRUNING_TOLERANCE: f64 = 1e-6;

/// How many times each button is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressCounts(Vec<u64>);

impl PressCounts {
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }
}

/// `C[light][button] = 1` when the button feeds that light.
pub fn coefficient_matrix(machine: &Machine) -> DMatrix<f64> {
    let buttons = machine.buttons();
    DMatrix::from_fn(machine.num_lights(), buttons.len(), |light, button| {
        if buttons[button].covers(light) {
            1.0
        } else {
            0.0
        }
    })
}

/// Exact integer check of `C · presses == weights`.
pub fn reproduces_weights(machine: &Machine, presses: &[u64]) -> bool {
    let mut totals = vec![0u64; machine.num_lights()];
    for (button, &count) in machine.buttons().iter().zip(presses) {
        for &light in button.lights() {
            totals[light] = totals[light].saturating_add(count);
        }
    }
    totals == machine.target_weights()
}

/// Per-variable bounds of one branch.
#[derive(Clone, Debug)]
struct Branch {
    lower: Vec<u64>,
    upper: Vec<u64>,
}

struct Program<'a> {
    machine: &'a Machine,
    coefficients: DMatrix<f64>,
}

impl Program<'_> {
    /// No button can be pressed more often than the smallest weight it feeds.
    fn root(&self) -> Branch {
        let weights = self.machine.target_weights();
        let upper = self
            .machine
            .buttons()
            .iter()
            .map(|button| {
                button
                    .lights()
                    .iter()
                    .map(|&light| weights[light])
                    .min()
                    .unwrap_or(0)
            })
            .collect();
        Branch {
            lower: vec![0; self.machine.buttons().len()],
            upper,
        }
    }

    /// Relaxation of `branch` over `y = x - lower`, with one slack row per
    /// variable for `y + s = upper - lower`.
    fn relaxation(&self, branch: &Branch) -> StandardForm {
        let lights = self.coefficients.nrows();
        let vars = self.coefficients.ncols();

        let mut a = DMatrix::zeros(lights + vars, 2 * vars);
        let mut b = DVector::zeros(lights + vars);
        let mut c = DVector::zeros(2 * vars);

        a.view_mut((0, 0), (lights, vars)).copy_from(&self.coefficients);
        let lower = DVector::from_iterator(vars, branch.lower.iter().map(|&lb| lb as f64));
        let shifted = &self.coefficients * &lower;
        for (r, &weight) in self.machine.target_weights().iter().enumerate() {
            b[r] = weight as f64 - shifted[r];
        }

        for j in 0..vars {
            a[(lights + j, j)] = 1.0;
            a[(lights + j, vars + j)] = 1.0;
            b[lights + j] = (branch.upper[j] - branch.lower[j]) as f64;
            c[j] = 1.0;
        }

        StandardForm { a, b, c }
    }

    fn solve(&self) -> Result<PressCounts, ProgramError> {
        let mut best: Option<(u64, Vec<u64>)> = None;
        let mut stack = vec![self.root()];
        let mut nodes = 0usize;

        while let Some(branch) = stack.pop() {
            if branch
                .lower
                .iter()
                .zip(&branch.upper)
                .any(|(lb, ub)| lb > ub)
            {
                continue;
            }
            nodes += 1;

            let relaxation = self.relaxation(&branch);
            let (y, cost) = match simplex::solve(&relaxation)
                .map_err(|_| ProgramError::IterationLimit)?
            {
                Outcome::Optimal { y, cost } => (y, cost),
                Outcome::Infeasible | Outcome::Unbounded => continue,
            };

            let bound = branch.lower.iter().sum::<u64>() as f64 + cost;
            if let Some((best_total, _)) = &best {
                if (bound - PRUNING_TOLERANCE).ceil() >= *best_total as f64 {
                    continue;
                }
            }

            let x: Vec<f64> = branch
                .lower
                .iter()
                .enumerate()
                .map(|(j, &lb)| lb as f64 + y[j])
                .collect();

            match x
                .iter()
                .position(|&v| (v - v.round()).abs() > INTEGRALITY_TOLERANCE)
            {
                Some(j) => {
                    let mut ceil = branch.clone();
                    ceil.lower[j] = x[j].ceil() as u64;
                    let mut floor = branch;
                    floor.upper[j] = x[j].floor().max(0.0) as u64;
                    stack.push(ceil);
                    stack.push(floor);
                }
                None => {
                    let presses: Vec<u64> =
                        x.iter().map(|&v| v.round().max(0.0) as u64).collect();
                    if !reproduces_weights(self.machine, &presses) {
                        return Err(ProgramError::Verification { presses });
                    }
                    let total = presses.iter().sum();
                    if best.as_ref().map_or(true, |(best_total, _)| total < *best_total) {
                        tracing::trace!(total, ?presses, "new incumbent");
                        best = Some((total, presses));
                    }
                }
            }
        }

        tracing::debug!(
            nodes,
            total = best.as_ref().map(|(total, _)| *total),
            "branch and bound finished"
        );
        best.map(|(_, presses)| PressCounts(presses))
            .ok_or(ProgramError::Infeasible)
    }
}

/// Finds the fewest total presses whose weight contributions equal the
/// machine's target weights exactly, one count per button.
///
/// Every integral relaxation optimum is rounded and re-checked with integer
/// arithmetic; a mismatch is a [`ProgramError::Verification`], never a
/// silently accepted answer.
pub fn solve_minimum_presses_linear(machine: &Machine) -> Result<PressCounts, ProgramError> {
    let program = Program {
        machine,
        coefficients: coefficient_matrix(machine),
    };
    program.solve()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::error::Defect;
    use crate::machine::{Button, Lights};

    /// `"(0,2) (1)"` style wiring.
    fn buttons(wiring: &str) -> Vec<Button> {
        wiring
            .split_whitespace()
            .map(|button| {
                let lights = button
                    .trim_matches(['(', ')'])
                    .split(',')
                    .map(|idx| idx.parse().expect("light index"))
                    .collect();
                Button::new(lights)
            })
            .collect()
    }

    /// A machine reaching `weights` through `wiring`; the light pattern is
    /// unused here.
    fn machine(wiring: &str, weights: &[u64]) -> Machine {
        Machine::new(
            Lights::repeat(false, weights.len()),
            buttons(wiring),
            weights.to_vec(),
        )
        .expect("valid machine")
    }

    /// Smallest total over every press vector up to the largest weight.
    fn brute_force(machine: &Machine) -> Option<u64> {
        let limit = machine.target_weights().iter().copied().max().unwrap_or(0);
        let mut presses = vec![0u64; machine.buttons().len()];
        let mut best: Option<u64> = None;

        loop {
            if reproduces_weights(machine, &presses) {
                let total: u64 = presses.iter().sum();
                best = Some(best.map_or(total, |b| b.min(total)));
            }
            // Odometer increment.
            let mut idx = 0;
            loop {
                if idx == presses.len() {
                    return best;
                }
                if presses[idx] < limit {
                    presses[idx] += 1;
                    break;
                }
                presses[idx] = 0;
                idx += 1;
            }
        }
    }

    #[test]
    fn two_light_scenario() -> Result<(), ProgramError> {
        let counts = solve_minimum_presses_linear(&machine("(0) (0,1)", &[2, 1]))?;
        assert_eq!(counts.as_slice(), &[1, 1]);
        assert_eq!(counts.total(), 2);
        Ok(())
    }

    #[rstest]
    #[case::first_sample("(3) (1,3) (2) (2,3) (0,2) (0,1)", vec![3, 5, 4, 7], 10)]
    #[case::second_sample("(0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4)", vec![7, 5, 12, 7, 2], 12)]
    #[case::third_sample("(0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2)", vec![10, 11, 11, 5, 10, 5], 11)]
    fn solves_sample_machines(
        #[case] wiring: &str,
        #[case] weights: Vec<u64>,
        #[case] expected: u64,
    ) -> Result<(), ProgramError> {
        let machine = machine(wiring, &weights);
        let counts = solve_minimum_presses_linear(&machine)?;
        assert!(reproduces_weights(&machine, counts.as_slice()));
        assert_eq!(counts.total(), expected);
        Ok(())
    }

    #[rstest]
    #[case::contradictory("(0,1)", vec![1, 2])]
    #[case::odd_cycle("(0,1) (1,2) (0,2)", vec![1, 1, 1])]
    #[case::uncovered_light("(0)", vec![3, 1])]
    fn rejects_infeasible_programs(#[case] wiring: &str, #[case] weights: Vec<u64>) {
        assert_eq!(
            solve_minimum_presses_linear(&machine(wiring, &weights)),
            Err(ProgramError::Infeasible)
        );
    }

    #[test]
    fn zero_weights_need_no_presses() -> Result<(), ProgramError> {
        let counts = solve_minimum_presses_linear(&machine("(0) (1)", &[0, 0]))?;
        assert_eq!(counts.as_slice(), &[0, 0]);
        Ok(())
    }

    #[rstest]
    #[case("(0,1) (1,2) (0,2) (1)", vec![2, 3, 3])]
    #[case("(0) (0,1,2) (2)", vec![4, 1, 3])]
    #[case("(0,1) (1,2) (0,2)", vec![2, 2, 2])]
    #[case("(0,1,2) (0) (1) (2) (0,1)", vec![5, 4, 3])]
    #[case("(1) (0,1) (0,2) (2)", vec![3, 4, 2])]
    #[case("(0,1) (1,2) (0,2)", vec![1, 2, 3])]
    fn matches_brute_force_on_small_systems(#[case] wiring: &str, #[case] weights: Vec<u64>) {
        let machine = machine(wiring, &weights);
        let found = match solve_minimum_presses_linear(&machine) {
            Ok(counts) => {
                assert!(reproduces_weights(&machine, counts.as_slice()));
                Some(counts.total())
            }
            Err(ProgramError::Infeasible) => None,
            Err(err) => panic!("unexpected solver failure: {err}"),
        };
        assert_eq!(found, brute_force(&machine));
    }

    #[test]
    fn verification_is_exact() {
        let machine = machine("(0) (0,1)", &[2, 1]);
        assert!(reproduces_weights(&machine, &[1, 1]));
        assert!(!reproduces_weights(&machine, &[2, 1]));
        assert!(!reproduces_weights(&machine, &[0, 1]));
    }

    #[test]
    fn integral_optimum_that_misses_the_weights_is_an_error() {
        // The relaxation sees button 1 feeding only light 1, so it settles on
        // [2, 1]; the real wiring also feeds light 0 from button 1.
        let machine = machine("(0) (0,1)", &[2, 1]);
        let program = Program {
            machine: &machine,
            coefficients: DMatrix::identity(2, 2),
        };
        assert_eq!(
            program.solve(),
            Err(ProgramError::Verification {
                presses: vec![2, 1]
            })
        );
    }

    #[test]
    fn out_of_range_wiring_never_reaches_the_solver() {
        assert_eq!(
            Machine::new(
                Lights::repeat(false, 2),
                vec![Button::new(vec![0, 2])],
                vec![1, 0]
            ),
            Err(Defect::LightOutOfRange {
                button: 0,
                light: 2,
                lights: 2
            })
        );
    }

    #[test]
    fn coefficient_columns_follow_buttons() {
        let c = coefficient_matrix(&machine("(0) (0,1)", &[2, 1]));
        assert_eq!(c, DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 1.0]));
    }
}
