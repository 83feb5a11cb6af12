//! Random helpers shared by the particle system and the burst effects.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Small, fast RNG with geometric helpers.
///
/// Seed it with [`RandomSource::with_seed`] for reproducible runs (tests,
/// benchmarks); otherwise it is seeded from the OS.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: SmallRng,
}

impl RandomSource {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random unit vector, uniform on the sphere.
    pub fn random_direction(&mut self) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let cos_phi: f32 = self.rng.gen_range(-1.0..1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();

        Vec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
    }

    /// Random point inside a ball of the given radius, uniform by volume.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        // Cube root for uniform volume distribution
        let r = radius * self.random().cbrt();
        self.random_direction() * r
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_sources_agree() {
        let mut a = RandomSource::with_seed(7);
        let mut b = RandomSource::with_seed(7);
        for _ in 0..10 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_direction_is_unit() {
        let mut rng = RandomSource::with_seed(1);
        for _ in 0..100 {
            assert!((rng.random_direction().length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_in_sphere_stays_inside() {
        let mut rng = RandomSource::with_seed(2);
        for _ in 0..100 {
            assert!(rng.random_in_sphere(15.0).length() <= 15.0 + 1e-3);
        }
        assert_eq!(rng.random_in_sphere(0.0), Vec3::ZERO);
    }

    #[test]
    fn test_empty_range_returns_min() {
        let mut rng = RandomSource::with_seed(3);
        assert_eq!(rng.random_range(4.0, 4.0), 4.0);
        let v = rng.random_range(0.8, 1.2);
        assert!((0.8..1.2).contains(&v));
    }
}
