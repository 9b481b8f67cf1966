pub mod error;
pub mod fleet;
pub mod linear;
pub mod machine;
pub mod part1;
pub mod part2;
pub mod toggle;

pub use error::FactoryError;
pub use fleet::{solve_fleet, Fleet, FleetOptions, Strategy};
pub use linear::{solve_minimum_presses_linear, PressCounts};
pub use machine::{parse_machines, Button, Lights, Machine};
pub use toggle::{find_minimum_toggle_presses, ToggleSolution};
