//! Seeded synthetic routing instances.
//!
//! Real instances come from an external loader. These generators produce
//! structurally valid data of any size for benchmarks and tests: every leg
//! is covered by at least one string, maintenance matrices use `+1`/`-1`
//! flow entries, robust cover coefficients are `-1` on a random half of the
//! covering strings, and every string and ground arc counts as one aircraft.

use super::matrix::Matrix;
use super::problem::{ProblemData, ProblemSize};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for [`generate`].
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub strings: usize,
    pub ground_arcs: usize,
    pub flight_legs: usize,
    pub maint_locations: usize,
    pub available_aircraft: i64,
    /// Probability that a string covers a given leg, in `[0, 1]`.
    pub cover_density: f64,
    /// Upper bound (exclusive) of the propagation delay per string.
    pub max_delay: f64,
    /// Random seed.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            strings: 50,
            ground_arcs: 10,
            flight_legs: 20,
            maint_locations: 3,
            available_aircraft: 10,
            cover_density: 0.1,
            max_delay: 60.0,
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    pub fn with_strings(mut self, n: usize) -> Self {
        self.strings = n;
        self
    }

    pub fn with_ground_arcs(mut self, n: usize) -> Self {
        self.ground_arcs = n;
        self
    }

    pub fn with_flight_legs(mut self, n: usize) -> Self {
        self.flight_legs = n;
        self
    }

    pub fn with_maint_locations(mut self, n: usize) -> Self {
        self.maint_locations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Generates a synthetic instance carrying both `prop_delay` and
/// `robust_cover`, so it validates for either formulation.
pub fn generate(config: &SyntheticConfig) -> ProblemData {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let (s, g, f, m) = (
        config.strings,
        config.ground_arcs,
        config.flight_legs,
        config.maint_locations,
    );
    let density = config.cover_density.clamp(0.0, 1.0);

    let mut cover = vec![0.0; f * s];
    let mut robust = vec![0.0; f * s];
    for leg in 0..f {
        let row = &mut cover[leg * s..(leg + 1) * s];
        for v in row.iter_mut() {
            if rng.random_bool(density) {
                *v = 1.0;
            }
        }
        if s > 0 && row.iter().all(|&v| v == 0.0) {
            row[rng.random_range(0..s)] = 1.0;
        }
        for j in 0..s {
            if row[j] != 0.0 && rng.random_bool(0.5) {
                robust[leg * s + j] = -1.0;
            }
        }
    }

    let mut flow = |cols: usize| -> Matrix {
        let values = (0..m * cols)
            .map(|_| match rng.random_range(0..4) {
                0 => 1.0,
                1 => -1.0,
                _ => 0.0,
            })
            .collect();
        matrix_or_zeros(m, cols, values)
    };
    let strings_in = flow(s);
    let ground_in = flow(g);
    let strings_out = flow(s);
    let ground_out = flow(g);

    let max_delay = config.max_delay.max(0.0);
    let delay = (0..s)
        .map(|_| {
            if max_delay > 0.0 {
                rng.random_range(0.0..max_delay).round()
            } else {
                0.0
            }
        })
        .collect();

    let size = ProblemSize {
        strings: s as i64,
        ground_arcs: g as i64,
        flight_legs: f as i64,
        maint_locations: m as i64,
        available_aircraft: config.available_aircraft,
    };

    ProblemData::new(size)
        .with_cover(matrix_or_zeros(f, s, cover))
        .with_maint_in(strings_in, ground_in)
        .with_maint_out(strings_out, ground_out)
        .with_count(
            Matrix::row_vector(vec![1.0; s]),
            Matrix::row_vector(vec![1.0; g]),
        )
        .with_prop_delay(Matrix::row_vector(delay))
        .with_robust_cover(matrix_or_zeros(f, s, robust))
}

// Buffer length always matches by construction.
fn matrix_or_zeros(rows: usize, cols: usize, values: Vec<f64>) -> Matrix {
    Matrix::new(rows, cols, values).unwrap_or_else(|_| Matrix::zeros(rows, cols))
}
