use ndarray::{Array1, ArrayView1};

/// A loss over a single timestep's output.
pub trait LossFn {
    fn loss(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64;

    /// The derivative of the loss with respect to every output, these are the coefficients
    /// handed to the weighted parameter derivative.
    fn loss_prime(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64>;
}
