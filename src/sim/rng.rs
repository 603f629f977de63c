//! Injectable randomness
//!
//! The simulation only ever asks for "a float in [0, 1)". Any `rand` generator
//! qualifies; tests can script exact sequences with [`SequenceRandom`].

/// Source of uniform floats in `[0, 1)`
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;

    /// Uniform in `[lo, hi)`
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Bernoulli draw with success probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform index in `0..len` (`len` must be non-zero)
    fn index(&mut self, len: usize) -> usize {
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }
}

impl<R: rand::RngCore> RandomSource for R {
    fn next_f32(&mut self) -> f32 {
        rand::Rng::random::<f32>(self)
    }
}

/// Replays a fixed list of values forever
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRandom {
    /// Values are clamped into `[0, 1)`; an empty list behaves like `[0.0]`
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let mut values: Vec<f32> = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 0.999_999))
            .collect();
        if values.is_empty() {
            values.push(0.0);
        }
        Self { values, cursor: 0 }
    }

    /// Always returns `value`
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandom {
    fn next_f32(&mut self) -> f32 {
        let v = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        v
    }
}
