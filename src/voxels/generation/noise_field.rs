//! # Noise Field Module
//!
//! A seeded 2D gradient noise in the Perlin style. The field is a pure function
//! of its seed and the sample coordinates: two fields built from the same seed
//! return identical values everywhere.

use noise::NoiseFn;

/// Gradient vectors selected by the low two bits of a corner hash.
const GRADIENTS: [(f64, f64); 4] = [(0.0, 1.0), (0.0, -1.0), (1.0, 0.0), (-1.0, 0.0)];

/// Just under the largest magnitude the blended axis-gradient dot products
/// reach (about 0.53528, near the cell offset `(0.5, 0.65)`). Samples are
/// divided by it and clamped, so the field covers `[-1, 1]` and its tallest
/// peaks saturate at exactly 1.
const AMPLITUDE_BOUND: f64 = 0.534;

/// Size of the permutation table before duplication.
const PERMUTATION_SIZE: usize = 256;

/// Seeded 2D gradient noise producing values in `[-1, 1]`.
#[derive(Clone)]
pub struct NoiseField {
    seed: u64,
    /// A shuffled `0..256` table stored twice, so `p[p[x] + y + 1]` never wraps.
    permutation: [u8; PERMUTATION_SIZE * 2],
}

impl NoiseField {
    /// Builds the permutation table for `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut table: Vec<u8> = (0..PERMUTATION_SIZE).map(|i| i as u8).collect();
        rng.shuffle(&mut table);

        let mut permutation = [0u8; PERMUTATION_SIZE * 2];
        permutation[..PERMUTATION_SIZE].copy_from_slice(&table);
        permutation[PERMUTATION_SIZE..].copy_from_slice(&table);

        NoiseField { seed, permutation }
    }

    /// The seed this field was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Samples the field at a continuous coordinate.
    ///
    /// # Returns
    /// A value in `[-1, 1]`. The value is 0 at every integer lattice point.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x_floor = x.floor();
        let y_floor = y.floor();
        let xi = (x_floor as i64).rem_euclid(PERMUTATION_SIZE as i64) as usize;
        let yi = (y_floor as i64).rem_euclid(PERMUTATION_SIZE as i64) as usize;

        let xf = x - x_floor;
        let yf = y - y_floor;
        let u = fade(xf);
        let v = fade(yf);

        let p = &self.permutation;
        let hash = |cx: usize, cy: usize| p[p[cx] as usize + cy];

        let n00 = gradient(hash(xi, yi), xf, yf);
        let n01 = gradient(hash(xi, yi + 1), xf, yf - 1.0);
        let n11 = gradient(hash(xi + 1, yi + 1), xf - 1.0, yf - 1.0);
        let n10 = gradient(hash(xi + 1, yi), xf - 1.0, yf);

        let bottom = lerp(n00, n10, u);
        let top = lerp(n01, n11, u);
        (lerp(bottom, top, v) / AMPLITUDE_BOUND).clamp(-1.0, 1.0)
    }
}

impl NoiseFn<f64, 2> for NoiseField {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

/// Quintic smoothstep `6t⁵ − 15t⁴ + 10t³`.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of the hashed corner gradient with the offset `(x, y)`.
fn gradient(hash: u8, x: f64, y: f64) -> f64 {
    let (gx, gy) = GRADIENTS[(hash % 4) as usize];
    gx * x + gy * y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_identical_fields() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);
        for i in 0..200 {
            let x = i as f64 * 0.173 - 7.0;
            let y = i as f64 * 0.311 + 3.0;
            assert_eq!(a.sample(x, y), b.sample(x, y));
        }
    }

    #[test]
    fn different_seeds_differ_somewhere() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        let differs = (0..100).any(|i| {
            let x = i as f64 * 0.37 + 0.5;
            a.sample(x, 0.5) != b.sample(x, 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn samples_stay_in_range_and_vanish_on_the_lattice() {
        let field = NoiseField::new(7);
        for i in 0..50 {
            for j in 0..50 {
                let value = field.sample(i as f64 * 0.13, j as f64 * 0.17);
                assert!((-1.0..=1.0).contains(&value));
            }
        }
        assert_eq!(field.sample(3.0, 4.0), 0.0);
        assert_eq!(field.sample(-2.0, 0.0), 0.0);
    }

    #[test]
    fn samples_reach_both_ends_of_the_range() {
        let field = NoiseField::new(7);
        let (mut low, mut high) = (0.0f64, 0.0f64);
        for i in 0..200 {
            for j in 0..200 {
                let value = field.sample(i as f64 * 0.05, j as f64 * 0.05);
                low = low.min(value);
                high = high.max(value);
            }
        }
        assert!(high > 0.85, "highest sample {high}");
        assert!(low < -0.85, "lowest sample {low}");
    }

    #[test]
    fn field_is_continuous_across_cell_edges() {
        let field = NoiseField::new(9);
        let eps = 1e-7;
        for x in [1.0, 2.0, -1.0, 255.0, 256.0] {
            let left = field.sample(x - eps, 0.4);
            let right = field.sample(x + eps, 0.4);
            assert!((left - right).abs() < 1e-5, "jump at x = {x}");
        }
    }

    #[test]
    fn noise_fn_matches_sample() {
        let field = NoiseField::new(3);
        assert_eq!(field.get([0.25, 1.75]), field.sample(0.25, 1.75));
    }
}
