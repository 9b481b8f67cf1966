use aoc2025_factory::{part1, part2};

// The puzzle inputs are not checked in, so benchmark on the worked example.
const INPUT: &str = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";

fn main() {
    divan::main();
}

#[divan::bench]
fn bench_part1() {
    part1::process(divan::black_box(INPUT)).unwrap();
}

#[divan::bench]
fn bench_part2() {
    part2::process(divan::black_box(INPUT)).unwrap();
}
