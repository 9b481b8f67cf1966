//! Dense two-phase simplex for `min cᵀy  s.t.  A y = b, y >= 0`.

use nalgebra::{DMatrix, DVector};

/// Numerical epsilon for comparing tableau entries to zero.
const EPSILON: f64 = 1e-9;

/// Largest phase-one objective still accepted as feasible.
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Pivot budget per phase.
const MAX_PIVOTS: usize = 50_000;

/// A linear program in equality standard form.
#[derive(Clone, Debug)]
pub struct StandardForm {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub c: DVector<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Optimal { y: DVector<f64>, cost: f64 },
    Infeasible,
    Unbounded,
}

/// The pivot budget ran out before an optimum was proven.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stalled;

/// Constraint rows, then the objective row. Columns are the structural
/// variables, one artificial per row, then the right-hand side.
struct Tableau {
    t: DMatrix<f64>,
    basis: Vec<usize>,
    rows: usize,
    structural: usize,
}

impl Tableau {
    /// Sets up phase one with an artificial basis; rows with a negative
    /// right-hand side are negated first.
    fn phase_one(lp: &StandardForm) -> Self {
        let rows = lp.a.nrows();
        let structural = lp.a.ncols();
        let rhs = structural + rows;
        let mut t = DMatrix::zeros(rows + 1, rhs + 1);

        for r in 0..rows {
            let sign = if lp.b[r] < 0.0 { -1.0 } else { 1.0 };
            for c in 0..structural {
                t[(r, c)] = lp.a[(r, c)] * sign;
            }
            t[(r, structural + r)] = 1.0;
            t[(r, rhs)] = lp.b[r] * sign;
        }

        // Minimize the sum of artificials, already priced out of the basis.
        for c in (0..structural).chain(std::iter::once(rhs)) {
            let column_sum = t.view((0, c), (rows, 1)).sum();
            t[(rows, c)] = -column_sum;
        }

        Self {
            t,
            basis: (structural..structural + rows).collect(),
            rows,
            structural,
        }
    }

    fn rhs(&self) -> usize {
        self.t.ncols() - 1
    }

    /// Current objective value.
    fn objective(&self) -> f64 {
        -self.t[(self.rows, self.rhs())]
    }

    fn pivot(&mut self, pr: usize, pc: usize) {
        let inv = 1.0 / self.t[(pr, pc)];
        {
            let mut row = self.t.row_mut(pr);
            row *= inv;
        }
        let pivot_row = self.t.row(pr).clone_owned();

        for r in 0..=self.rows {
            if r == pr {
                continue;
            }
            let factor = self.t[(r, pc)];
            if factor.abs() > EPSILON {
                let mut row = self.t.row_mut(r);
                row -= &pivot_row * factor;
            }
        }
        self.basis[pr] = pc;
    }

    /// Bland's rule on both the entering column and the leaving row, with
    /// only the structural columns allowed to enter.
    ///
    /// Returns `Ok(false)` when the objective is unbounded.
    fn optimize(&mut self) -> Result<bool, Stalled> {
        let rhs = self.rhs();

        for _ in 0..MAX_PIVOTS {
            let Some(pc) = (0..self.structural).find(|&c| self.t[(self.rows, c)] < -EPSILON) else {
                return Ok(true);
            };

            let mut leaving: Option<(usize, f64)> = None;
            for r in 0..self.rows {
                let coeff = self.t[(r, pc)];
                if coeff <= EPSILON {
                    continue;
                }
                let ratio = self.t[(r, rhs)] / coeff;
                leaving = match leaving {
                    Some((best, best_ratio))
                        if ratio > best_ratio + EPSILON
                            || (ratio > best_ratio - EPSILON
                                && self.basis[r] > self.basis[best]) =>
                    {
                        Some((best, best_ratio))
                    }
                    _ => Some((r, ratio)),
                };
            }

            match leaving {
                Some((pr, _)) => self.pivot(pr, pc),
                None => return Ok(false),
            }
        }

        Err(Stalled)
    }

    /// Pivots artificials that are still basic (at zero) onto structural
    /// columns. Rows with no structural entry are redundant and keep their
    /// artificial, which can never change again.
    fn evict_artificials(&mut self) {
        for r in 0..self.rows {
            if self.basis[r] < self.structural {
                continue;
            }
            if let Some(c) = (0..self.structural).find(|&c| self.t[(r, c)].abs() > EPSILON) {
                self.pivot(r, c);
            }
        }
    }

    /// Replaces the objective row with `cost`, priced out against the
    /// current basis.
    fn load_objective(&mut self, cost: &DVector<f64>) {
        let obj = self.rows;
        self.t.row_mut(obj).fill(0.0);
        for c in 0..self.structural {
            self.t[(obj, c)] = cost[c];
        }

        for r in 0..self.rows {
            let basic = self.basis[r];
            let cb = if basic < self.structural { cost[basic] } else { 0.0 };
            if cb.abs() > EPSILON {
                let row = self.t.row(r).clone_owned();
                let mut target = self.t.row_mut(obj);
                target -= row * cb;
            }
        }
    }

    fn solution(&self) -> DVector<f64> {
        let rhs = self.rhs();
        let mut y = DVector::zeros(self.structural);
        for (r, &basic) in self.basis.iter().enumerate() {
            if basic < self.structural {
                y[basic] = self.t[(r, rhs)];
            }
        }
        y
    }
}

/// Solves `lp` to optimality.
pub fn solve(lp: &StandardForm) -> Result<Outcome, Stalled> {
    let mut tableau = Tableau::phase_one(lp);

    // Phase one is bounded below by zero.
    tableau.optimize()?;
    if tableau.objective() > FEASIBILITY_TOLERANCE {
        return Ok(Outcome::Infeasible);
    }

    tableau.evict_artificials();
    tableau.load_objective(&lp.c);
    if !tableau.optimize()? {
        return Ok(Outcome::Unbounded);
    }

    Ok(Outcome::Optimal {
        y: tableau.solution(),
        cost: tableau.objective(),
    })
}
