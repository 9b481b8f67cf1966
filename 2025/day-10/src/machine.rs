use std::fmt::Display;
use std::str::FromStr;

use bitvec::prelude::*;
use chumsky::prelude::*;

use crate::error::{Defect, FactoryError};

/// A bit vector backed by `usize` words with Least Significant Bit first ordering.
/// Bit `i` is the state of light `i`.
pub type Lights = BitVec<usize, Lsb0>;

/// A button wired to a fixed set of lights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    lights: Vec<usize>,
}

impl Button {
    /// Indices are checked against a panel only once the button is part of
    /// a [`Machine`].
    pub fn new(lights: Vec<usize>) -> Self {
        Self { lights }
    }

    /// Light indices in the order they were listed.
    pub fn lights(&self) -> &[usize] {
        &self.lights
    }

    pub fn covers(&self, light: usize) -> bool {
        self.lights.contains(&light)
    }

    /// The lights this button inverts, as a row of `len` bits. Every index
    /// must be below `len`.
    pub(crate) fn mask(&self, len: usize) -> Lights {
        let mut row = Lights::repeat(false, len);
        for &light in &self.lights {
            row.set(light, true);
        }
        row
    }
}

/// A validated machine: at least one light and one button, every button wired
/// to distinct in-range lights, one weight per light. The solvers only accept
/// this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    target_lights: Lights,
    buttons: Vec<Button>,
    target_weights: Vec<u64>,
}

impl Machine {
    /// Validates the parts of a machine description.
    pub fn new(
        target_lights: Lights,
        buttons: Vec<Button>,
        target_weights: Vec<u64>,
    ) -> Result<Self, Defect> {
        let lights = target_lights.len();
        if lights == 0 {
            return Err(Defect::NoLights);
        }
        if buttons.is_empty() {
            return Err(Defect::NoButtons);
        }

        for (button, wiring) in buttons.iter().enumerate() {
            if wiring.lights.is_empty() {
                return Err(Defect::EmptyButton { button });
            }
            let mut seen = Lights::repeat(false, lights);
            for &light in &wiring.lights {
                if light >= lights {
                    return Err(Defect::LightOutOfRange {
                        button,
                        light,
                        lights,
                    });
                }
                if seen.replace(light, true) {
                    return Err(Defect::DuplicateLight { button, light });
                }
            }
        }

        if target_weights.len() != lights {
            return Err(Defect::WeightCountMismatch {
                expected: lights,
                found: target_weights.len(),
            });
        }

        Ok(Self {
            target_lights,
            buttons,
            target_weights,
        })
    }

    pub fn target_lights(&self) -> &Lights {
        &self.target_lights
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn target_weights(&self) -> &[u64] {
        &self.target_weights
    }

    pub fn num_lights(&self) -> usize {
        self.target_lights.len()
    }
}

type RawMachine = (Vec<bool>, Vec<Vec<usize>>, Vec<u64>);

fn number<'a, T>() -> impl Parser<'a, &'a str, T, extra::Err<Rich<'a, char>>> + Clone
where
    T: FromStr,
    T::Err: Display,
{
    text::int(10).try_map(|digits: &'a str, span| {
        digits
            .parse::<T>()
            .map_err(|err| Rich::custom(span, format!("{digits}: {err}")))
    })
}

fn parser<'a>() -> impl Parser<'a, &'a str, RawMachine, extra::Err<Rich<'a, char>>> {
    let hspace = one_of(" \t").repeated();

    let light = choice((just('.').to(false), just('#').to(true)));

    // [.##.]
    let diagram = light
        .repeated()
        .at_least(1)
        .collect::<Vec<bool>>()
        .delimited_by(just('['), just(']'));

    // (0,2,3)
    let button = number::<usize>()
        .separated_by(just(','))
        .at_least(1)
        .collect::<Vec<usize>>()
        .delimited_by(just('('), just(')'));

    // (0,2) (1,3) ...
    let buttons = button
        .padded_by(hspace)
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>();

    // {3,5,4}
    let weights = number::<u64>()
        .separated_by(just(','))
        .at_least(1)
        .collect::<Vec<u64>>()
        .delimited_by(just('{'), just('}'));

    diagram
        .then_ignore(hspace)
        .then(buttons)
        .then(weights)
        .map(|((lights, buttons), weights)| (lights, buttons, weights))
}

/// Parses one machine per non-blank line.
///
/// Machine indices count non-blank lines from zero; the first malformed
/// machine aborts the parse.
#[tracing::instrument(skip(input), fields(bytes = input.len()))]
pub fn parse_machines(input: &str) -> Result<Vec<Machine>, FactoryError> {
    let parser = parser();
    let mut machines = Vec::new();

    for (line_idx, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let index = machines.len();
        // `span` is `(offset, length)` within the trimmed line.
        let malformed = |reason: String, span: (usize, usize)| FactoryError::MalformedMachine {
            machine: index,
            line: line_idx + 1,
            reason,
            source_line: line.to_string(),
            span: span.into(),
        };

        let (lights, buttons, weights) = parser.parse(line).into_result().map_err(|errs| {
            match errs.into_iter().next() {
                Some(err) => {
                    let span = *err.span();
                    malformed(err.to_string(), (span.start, span.end - span.start))
                }
                None => malformed("unparseable machine".to_string(), (0, line.len())),
            }
        })?;

        let machine = Machine::new(
            lights.into_iter().collect(),
            buttons.into_iter().map(Button::new).collect(),
            weights,
        )
        .map_err(|defect| malformed(defect.to_string(), (0, line.len())))?;

        tracing::trace!(
            machine = index,
            lights = machine.num_lights(),
            buttons = machine.buttons().len(),
            "parsed machine"
        );
        machines.push(machine);
    }

    tracing::debug!(machines = machines.len(), "parsed input");
    Ok(machines)
}
