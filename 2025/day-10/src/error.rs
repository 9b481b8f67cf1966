use std::path::PathBuf;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Reasons a machine description is rejected after it parsed syntactically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Defect {
    #[error("machine has no lights")]
    NoLights,

    #[error("machine has no buttons")]
    NoButtons,

    #[error("button {button} has no light indices")]
    EmptyButton { button: usize },

    #[error("button {button} references light {light} but the machine has {lights} lights")]
    LightOutOfRange {
        button: usize,
        light: usize,
        lights: usize,
    },

    #[error("button {button} lists light {light} more than once")]
    DuplicateLight { button: usize, light: usize },

    #[error("expected {expected} target weights, found {found}")]
    WeightCountMismatch { expected: usize, found: usize },
}

/// Failures of the integer program for a single machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("no non-negative integer press counts reach the target weights")]
    Infeasible,

    #[error("rounded press counts {presses:?} do not reproduce the target weights")]
    Verification { presses: Vec<u64> },

    #[error("simplex exceeded its pivot budget")]
    IterationLimit,
}

#[derive(Debug, Error, Diagnostic)]
pub enum FactoryError {
    #[error("machine {machine} (line {line}) is malformed: {reason}")]
    #[diagnostic(code(factory::malformed_machine))]
    MalformedMachine {
        machine: usize,
        line: usize,
        reason: String,
        #[source_code]
        source_line: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("machine {machine}: no combination of buttons produces the target light pattern")]
    #[diagnostic(
        code(factory::unsolvable_machine),
        help("every button toggles a fixed set of lights; check the pattern against the wiring")
    )]
    UnsolvableMachine { machine: usize },

    #[error("machine {machine}: the press-count program has no integer solution")]
    #[diagnostic(code(factory::infeasible_program))]
    InfeasibleProgram { machine: usize },

    #[error("machine {machine}: solver output {presses:?} failed exact verification")]
    #[diagnostic(code(factory::verification))]
    Verification { machine: usize, presses: Vec<u64> },

    #[error("machine {machine}: simplex did not converge")]
    #[diagnostic(code(factory::solver_stalled))]
    SolverStalled { machine: usize },

    #[error("failed to build the worker pool")]
    #[diagnostic(code(factory::worker_pool))]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to read {}", path.display())]
    #[diagnostic(code(factory::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FactoryError {
    /// Attaches a machine index to a solver-level failure.
    pub fn from_program(machine: usize, err: ProgramError) -> Self {
        match err {
            ProgramError::Infeasible => Self::InfeasibleProgram { machine },
            ProgramError::Verification { presses } => Self::Verification { machine, presses },
            ProgramError::IterationLimit => Self::SolverStalled { machine },
        }
    }

    /// Index of the machine this error is about, if any.
    pub fn machine(&self) -> Option<usize> {
        match self {
            Self::MalformedMachine { machine, .. }
            | Self::UnsolvableMachine { machine }
            | Self::InfeasibleProgram { machine }
            | Self::Verification { machine, .. }
            | Self::SolverStalled { machine } => Some(*machine),
            Self::WorkerPool(_) | Self::Io { .. } => None,
        }
    }
}
