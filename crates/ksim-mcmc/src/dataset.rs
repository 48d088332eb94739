use rand::Rng;
use rand_distr::StandardNormal;

/// Draws `count` samples from the unit normal distribution.
///
/// Such data are distributed exactly as the likelihood with `a = e`, so a
/// chain run on them should concentrate near Euler's number.
pub fn generate_dataset<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<f64> {
    (0..count).map(|_| rng.sample(StandardNormal)).collect()
}
