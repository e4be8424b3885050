//! Scaling table for the grid build: horizon, array size and wall time per
//! k_max, serial against parallel, for both pair-space bounds.

use std::time::{Duration, Instant};

use delta_grid::columns::ColumnGrid;
use delta_grid::grid::{DifferenceOfSquares, GridBounds, MaxDeltaArray};
use delta_grid::horizon::horizon_for;

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

fn main() {
    println!("================================================================");
    println!("  SCALING: max-delta grid build vs k_max");
    println!("================================================================\n");
    println!("  rayon threads: {}\n", rayon::current_num_threads());

    let k_maxes = [10usize, 20, 40, 80, 120];

    for bounds in [GridBounds::Compact, GridBounds::Full] {
        println!("  bounds = {bounds}");
        println!(
            "  {:>6} {:>8} {:>12} {:>12} {:>12} {:>8}",
            "k_max", "n_end", "slots", "serial_ms", "parallel_ms", "columns"
        );
        println!("  {}", "-".repeat(64));

        for &k_max in &k_maxes {
            let Ok(horizon) = horizon_for(k_max) else {
                continue;
            };
            // Full bounds grow as n_end², keep them to the smaller sizes.
            if bounds == GridBounds::Full && k_max > 40 {
                continue;
            }
            let (serial, serial_time) =
                timed(|| MaxDeltaArray::build(horizon, bounds, &DifferenceOfSquares));
            let (parallel, parallel_time) =
                timed(|| MaxDeltaArray::build_parallel(horizon, bounds, &DifferenceOfSquares));
            let status = if serial == parallel { "" } else { "  MISMATCH" };
            let columns = ColumnGrid::from_max_delta(&serial).depth();

            println!(
                "  {:>6} {:>8} {:>12} {:>12.2} {:>12.2} {:>8}{}",
                k_max,
                horizon,
                serial.len(),
                serial_time.as_secs_f64() * 1e3,
                parallel_time.as_secs_f64() * 1e3,
                columns,
                status
            );
        }
        println!();
    }
}
