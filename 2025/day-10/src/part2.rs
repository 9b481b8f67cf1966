use miette::*;

use crate::fleet::{solve_fleet, Strategy};
use crate::machine::parse_machines;

/// Fewest weight-adding presses summed over every machine.
#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let machines = parse_machines(input)?;
    let total = solve_fleet(&machines, Strategy::Linear)?;
    Ok(total.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() -> Result<()> {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";
        assert_eq!("33", process(input)?);
        Ok(())
    }

    #[test]
    fn infeasible_machine_fails_the_total() {
        let input = "[#.] (0) (0,1) {2,1}\n[##] (0,1) {1,2}";
        let err = process(input).expect_err("second machine is infeasible");
        assert!(err.to_string().contains("machine 1"), "{err}");
    }
}
