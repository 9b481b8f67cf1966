use miette::*;

use crate::fleet::{solve_fleet, Strategy};
use crate::machine::parse_machines;

/// Fewest toggle presses summed over every machine.
#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let machines = parse_machines(input)?;
    let total_presses = solve_fleet(&machines, Strategy::Toggle)?;
    Ok(total_presses.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() -> Result<()> {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";
        assert_eq!("7", process(input)?);
        Ok(())
    }

    #[test]
    fn reports_malformed_input() {
        let input = "[.##.] (3) (1,3) {3,5,4,7}\n[..] (0,4) {1,1}";
        let err = process(input).expect_err("second machine is malformed");
        assert!(err.to_string().contains("machine 1"), "{err}");
    }
}
