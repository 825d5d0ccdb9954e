/// Exponential smoother. The first sample passes through unchanged so a
/// fresh filter never drags a signal toward zero.
#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    rate: f32,
    prev: Option<f32>,
}

impl Smoother {
    pub fn new(rate: f32) -> Self {
        Self { rate, prev: None }
    }

    pub fn apply(&mut self, raw: f32) -> f32 {
        let smoothed = match self.prev {
            Some(prev) => prev + (raw - prev) * self.rate,
            None => raw,
        };
        self.prev = Some(smoothed);
        smoothed
    }

    /// Re-seed the filter, e.g. after a forced idle.
    pub fn reset(&mut self, value: f32) {
        self.prev = Some(value);
    }

    pub fn value(&self) -> f32 {
        self.prev.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_passes_through() {
        let mut s = Smoother::new(0.2);
        assert_eq!(s.apply(5.0), 5.0);
    }

    #[test]
    fn test_converges_toward_signal() {
        let mut s = Smoother::new(0.5);
        s.apply(0.0);
        let mut last = 0.0;
        for _ in 0..20 {
            last = s.apply(10.0);
        }
        assert!((last - 10.0).abs() < 0.01, "expected ~10, got {last}");
    }

    #[test]
    fn test_intermediate_values_lag_signal() {
        let mut s = Smoother::new(0.3);
        s.apply(0.0);
        let v = s.apply(1.0);
        assert!(v > 0.0 && v < 1.0, "expected lag, got {v}");
    }

    #[test]
    fn test_reset_reseeds() {
        let mut s = Smoother::new(0.3);
        s.apply(8.0);
        s.reset(0.0);
        assert_eq!(s.value(), 0.0);
        let v = s.apply(1.0);
        assert!((v - 0.3).abs() < 1e-6);
    }
}
