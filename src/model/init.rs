//! Seeded parameter initialisation

use crate::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic source of initial parameter values
///
/// Every learned tensor of a detector is drawn from one generator, in
/// construction order, so a seed reproduces the whole parameter set.
#[derive(Debug, Clone)]
pub struct ParamInit {
    rng: StdRng,
}

impl ParamInit {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Uniform draw in `(-bound, bound)` as a trainable tensor
    pub fn uniform(&mut self, len: usize, bound: f32) -> Tensor {
        let data = (0..len)
            .map(|_| if bound > 0.0 { self.rng.random_range(-bound..bound) } else { 0.0 })
            .collect();
        Tensor::from_vec(data, true)
    }

    /// Kaiming-uniform draw for a leaky-ReLU gain with the given negative slope
    pub fn kaiming_uniform(&mut self, len: usize, fan_in: usize, negative_slope: f32) -> Tensor {
        self.uniform(len, kaiming_bound(fan_in, negative_slope))
    }
}

/// `gain * sqrt(3 / fan_in)` with `gain = sqrt(2 / (1 + a²))`
pub fn kaiming_bound(fan_in: usize, negative_slope: f32) -> f32 {
    let gain = (2.0 / (1.0 + negative_slope * negative_slope)).sqrt();
    gain * (3.0 / fan_in.max(1) as f32).sqrt()
}
