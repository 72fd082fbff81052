//! Running mean / variance (Welford).

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Moments {
    n: f64,
    mean: f64,
    m2: f64,
}

impl Moments {
    pub(crate) fn push(&mut self, x: f64) {
        self.n += 1.0;
        let delta = x - self.mean;
        self.mean += delta / self.n;
        self.m2 += delta * (x - self.mean);
    }

    pub(crate) fn count(&self) -> f64 {
        self.n
    }

    pub(crate) fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation
    pub(crate) fn std(&self) -> f64 {
        if self.n < 2.0 {
            0.0
        } else {
            (self.m2 / self.n).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_moments_match_direct_formula() {
        let xs = [1.0, 2.0, 4.0, 7.0];
        let mut m = Moments::default();
        xs.iter().for_each(|&x| m.push(x));

        let mean = xs.iter().sum::<f64>() / 4.0;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 4.0;
        assert_abs_diff_eq!(m.mean(), mean, epsilon = 1e-12);
        assert_abs_diff_eq!(m.std(), var.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(m.count(), 4.0);
    }

    #[test]
    fn test_single_sample_has_zero_std() {
        let mut m = Moments::default();
        m.push(3.0);
        assert_eq!(m.std(), 0.0);
    }
}
