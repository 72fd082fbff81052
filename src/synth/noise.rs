//! Latent noise for stage outputs.

use rand::Rng;
use rand_distr::StandardNormal;

/// Standard-normal noise vector
#[derive(Debug, Clone, PartialEq)]
pub struct LatentNoise {
    /// The noise vector
    pub vector: Vec<f32>,
}

impl LatentNoise {
    /// Draw `dim` independent standard-normal entries
    pub fn sample<R: Rng>(rng: &mut R, dim: usize) -> Self {
        let vector = (0..dim).map(|_| rng.sample::<f32, _>(StandardNormal)).collect();
        Self { vector }
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.vector.len()
    }
}
