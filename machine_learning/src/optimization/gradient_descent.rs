use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update_params`.
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    /// Updates the parameters according to the algorithm's learning rule, that is, making a step in
    /// the opposite direction of the gradient, with a length of `learning_rate`.
    fn update_params(&mut self, params: &mut [f64], grad: &[f64]) -> Result<()> {
        check_sizes(params, grad)?;

        let lr = self.learning_rate;

        for (w, g) in params.iter_mut().zip(grad) {
            *w -= lr * g;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let mut params = [1.0, -2.0];
        GradientDescent::new(0.5)
            .update_params(&mut params, &[2.0, -1.0])
            .unwrap();

        assert_eq!(params, [0.0, -1.5]);
    }

    #[test]
    fn size_mismatch() {
        let mut params = [1.0, -2.0];
        let res = GradientDescent::new(0.5).update_params(&mut params, &[2.0]);

        assert!(res.is_err());
        assert_eq!(params, [1.0, -2.0]);
    }
}
