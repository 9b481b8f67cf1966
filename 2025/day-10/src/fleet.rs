use std::fmt;

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressIterator, ProgressStyle};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::FactoryError;
use crate::linear::solve_minimum_presses_linear;
use crate::machine::Machine;
use crate::toggle::find_minimum_toggle_presses;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Each button pressed at most once, flipping its lights.
    Toggle,
    /// Each button pressed any number of times, adding weight to its lights.
    Linear,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Toggle => f.write_str("toggle"),
            Strategy::Linear => f.write_str("linear"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FleetOptions {
    /// Worker threads shared by every tier of the fleet. `None` lets rayon
    /// pick one per core.
    pub workers: Option<usize>,
    /// Draw a progress bar over machines.
    pub progress: bool,
}

/// Every machine of one input, solved on a single bounded worker pool.
pub struct Fleet<'a> {
    machines: &'a [Machine],
    pool: ThreadPool,
    progress: bool,
}

impl<'a> Fleet<'a> {
    pub fn new(machines: &'a [Machine], options: &FleetOptions) -> Result<Self, FactoryError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|idx| format!("factory-{idx}"));
        if let Some(workers) = options.workers {
            builder = builder.num_threads(workers);
        }

        Ok(Self {
            machines,
            pool: builder.build()?,
            progress: options.progress,
        })
    }

    fn progress_bar(&self, strategy: Strategy) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(self.machines.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{msg:>8} [{bar:40}] {pos}/{len} ({eta})")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(strategy.to_string());
        bar
    }

    /// Sum of every machine's minimum press count under `strategy`.
    ///
    /// The first failing machine (by index) aborts the whole solve; no
    /// partial total is ever returned.
    #[tracing::instrument(skip(self), fields(machines = self.machines.len()))]
    pub fn solve(&self, strategy: Strategy) -> Result<u64, FactoryError> {
        let total = match strategy {
            Strategy::Toggle => self.solve_toggle(),
            Strategy::Linear => self.solve_linear(),
        }?;
        tracing::debug!(total, "fleet solved");
        Ok(total)
    }

    /// Machines fan out across the pool and each machine's subset search
    /// fans out again inside it. Both tiers share the pool's workers.
    fn solve_toggle(&self) -> Result<u64, FactoryError> {
        let bar = self.progress_bar(Strategy::Toggle);

        let mut results: Vec<(usize, Option<usize>)> = self.pool.install(|| {
            self.machines
                .par_iter()
                .enumerate()
                .progress_with(bar.clone())
                .map(|(machine, m)| {
                    let found = find_minimum_toggle_presses(m);
                    (machine, found.map(|solution| solution.presses))
                })
                .collect()
        });
        bar.finish_and_clear();
        results.sort_unstable_by_key(|&(machine, _)| machine);

        results
            .into_iter()
            .try_fold(0u64, |total, (machine, presses)| {
                let presses = presses.ok_or(FactoryError::UnsolvableMachine { machine })?;
                tracing::debug!(machine, presses, "toggle minimum");
                Ok(total + presses as u64)
            })
    }

    /// One machine at a time; the first solver failure aborts.
    fn solve_linear(&self) -> Result<u64, FactoryError> {
        let bar = self.progress_bar(Strategy::Linear);

        let mut total = 0u64;
        for (machine, m) in self.machines.iter().enumerate().progress_with(bar.clone()) {
            let counts = solve_minimum_presses_linear(m)
                .map_err(|err| FactoryError::from_program(machine, err))?;
            tracing::debug!(
                machine,
                presses = counts.total(),
                counts = ?counts.as_slice(),
                "linear minimum"
            );
            total += counts.total();
        }
        bar.finish_and_clear();

        Ok(total)
    }
}

/// Solves every machine with default options.
pub fn solve_fleet(machines: &[Machine], strategy: Strategy) -> Result<u64, FactoryError> {
    Fleet::new(machines, &FleetOptions::default())?.solve(strategy)
}
